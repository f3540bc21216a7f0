// Linux-specific readers: /proc, /etc/os-release, /sys/class/net, utmp.
// Parsers take file contents so they can be tested on any platform.

use crate::error::{CollectError, Source};
use crate::models::{IoStats, UserInfo};

/// Contents of /proc/cpuinfo (Linux), empty elsewhere or if unreadable.
pub(super) fn read_cpuinfo() -> String {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo").unwrap_or_default()
    }
    #[cfg(not(target_os = "linux"))]
    String::new()
}

/// Value of the first `key : value` line in cpuinfo.
fn cpuinfo_field<'a>(cpuinfo: &'a str, key: &str) -> Option<&'a str> {
    cpuinfo
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, v)| v.trim())
}

/// First "model name". Prefer over sysinfo when it returns "cpu0" etc.
pub(super) fn parse_cpu_model(cpuinfo: &str) -> Option<String> {
    cpuinfo_field(cpuinfo, "model name")
        .filter(|s| !s.is_empty() && *s != "cpu0")
        .map(str::to_string)
}

/// "cache size : 512 KB" -> 512
pub(super) fn parse_cpu_cache_kb(cpuinfo: &str) -> Option<u32> {
    cpuinfo_field(cpuinfo, "cache size")?
        .split_whitespace()
        .next()?
        .parse()
        .ok()
}

const CPU_MAX_FREQ_PATH: &str = "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq";

/// Nominal (maximum) frequency of cpu0 in MHz from cpufreq (Linux).
pub(super) fn read_cpu_max_mhz() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string(CPU_MAX_FREQ_PATH).ok()?;
        return parse_cpu_max_freq(&content);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

/// cpuinfo_max_freq is in kHz.
pub(super) fn parse_cpu_max_freq(content: &str) -> Option<f64> {
    content
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|&khz| khz > 0)
        .map(|khz| khz as f64 / 1000.0)
}

/// PRETTY_NAME (or NAME) from /etc/os-release, used when sysinfo cannot name the OS.
pub(super) fn read_os_pretty_name() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        return parse_os_release(&content);
    }
    #[cfg(not(target_os = "linux"))]
    None
}

pub(super) fn parse_os_release(content: &str) -> Option<String> {
    let value = |key: &str| {
        content
            .lines()
            .find_map(|line| line.strip_prefix(key))
            .map(|v| v.trim().trim_matches('"').to_string())
            .filter(|v| !v.is_empty())
    };
    value("PRETTY_NAME=").or_else(|| value("NAME="))
}

/// Memory breakdown sysinfo does not expose, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(super) struct MemBreakdown {
    pub cached: u64,
    pub buffers: u64,
    pub shared: u64,
    pub active: u64,
    pub inactive: u64,
}

pub(super) fn read_meminfo() -> Option<MemBreakdown> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/proc/meminfo").ok()?;
        return Some(parse_meminfo(&content));
    }
    #[cfg(not(target_os = "linux"))]
    None
}

pub(super) fn parse_meminfo(content: &str) -> MemBreakdown {
    let mut out = MemBreakdown::default();
    for line in content.lines() {
        let Some((key, rest)) = line.split_once(':') else {
            continue;
        };
        let Some(kib) = rest
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };
        let bytes = kib.saturating_mul(1024);
        match key.trim() {
            "Cached" => out.cached = bytes,
            "Buffers" => out.buffers = bytes,
            "Shmem" => out.shared = bytes,
            "Active" => out.active = bytes,
            "Inactive" => out.inactive = bytes,
            _ => {}
        }
    }
    out
}

// net_device_flags from include/uapi/linux/if.h, named the way gopsutil reports them.
const IFF_FLAGS: &[(u32, &str)] = &[
    (0x1, "up"),
    (0x2, "broadcast"),
    (0x8, "loopback"),
    (0x10, "pointtopoint"),
    (0x40, "running"),
    (0x1000, "multicast"),
];

pub(super) fn decode_interface_flags(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    let Ok(bits) = u32::from_str_radix(raw.trim_start_matches("0x"), 16) else {
        return Vec::new();
    };
    IFF_FLAGS
        .iter()
        .filter(|(bit, _)| bits & bit != 0)
        .map(|(_, name)| (*name).to_string())
        .collect()
}

/// Interface flags from /sys/class/net/<interface>/flags (Linux). Empty if unavailable.
pub(super) fn interface_flags(interface_name: &str) -> Vec<String> {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/sys/class/net/{}/flags", interface_name);
        std::fs::read_to_string(&path)
            .map(|content| decode_interface_flags(&content))
            .unwrap_or_default()
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        Vec::new()
    }
}

/// (rx_dropped, tx_dropped) from /sys/class/net/<interface>/statistics (Linux), 0 if unavailable.
pub(super) fn interface_drops(interface_name: &str) -> (u64, u64) {
    #[cfg(target_os = "linux")]
    {
        let read = |counter: &str| {
            let path = format!("/sys/class/net/{}/statistics/{}", interface_name, counter);
            std::fs::read_to_string(&path)
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(0)
        };
        return (read("rx_dropped"), read("tx_dropped"));
    }
    #[cfg(not(target_os = "linux"))]
    {
        let _ = interface_name;
        (0, 0)
    }
}

const DISKSTATS_PATH: &str = "/proc/diskstats";
const SECTOR_SIZE: u64 = 512;

pub(super) fn read_diskstats() -> Result<IoStats, CollectError> {
    if !cfg!(target_os = "linux") {
        return Err(CollectError::Unsupported(Source::IoStats));
    }
    let content = std::fs::read_to_string(DISKSTATS_PATH)
        .map_err(|e| CollectError::io(Source::IoStats, DISKSTATS_PATH, e))?;
    Ok(parse_diskstats(&content))
}

/// Sum every device line of /proc/diskstats.
pub(super) fn parse_diskstats(content: &str) -> IoStats {
    let mut io = IoStats::default();
    for line in content.lines() {
        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(3)
            .take(8)
            .map_while(|f| f.parse().ok())
            .collect();
        let &[reads, _, sectors_read, ms_reading, writes, _, sectors_written, ms_writing] =
            fields.as_slice()
        else {
            continue;
        };
        io.disk_read_count += reads;
        io.disk_read_bytes += sectors_read * SECTOR_SIZE;
        io.disk_read_time += ms_reading;
        io.disk_write_count += writes;
        io.disk_write_bytes += sectors_written * SECTOR_SIZE;
        io.disk_write_time += ms_writing;
    }
    io
}

const UTMP_PATHS: &[&str] = &["/var/run/utmp", "/run/utmp"];
// glibc `struct utmp` on 64-bit Linux.
const UTMP_RECORD_LEN: usize = 384;
const UTMP_USER_PROCESS: i16 = 7;

pub(super) fn read_logged_in_users() -> Result<Vec<UserInfo>, CollectError> {
    if !cfg!(target_os = "linux") {
        return Err(CollectError::Unsupported(Source::Users));
    }
    let mut last_err = None;
    for path in UTMP_PATHS {
        match std::fs::read(path) {
            Ok(bytes) => return Ok(parse_utmp(&bytes)),
            Err(e) => last_err = Some(CollectError::io(Source::Users, *path, e)),
        }
    }
    Err(last_err.unwrap_or_else(|| CollectError::unavailable(Source::Users, "no utmp file")))
}

pub(super) fn parse_utmp(bytes: &[u8]) -> Vec<UserInfo> {
    bytes
        .chunks_exact(UTMP_RECORD_LEN)
        .filter(|rec| i16::from_ne_bytes([rec[0], rec[1]]) == UTMP_USER_PROCESS)
        .map(|rec| UserInfo {
            user: c_field(&rec[44..76]),
            terminal: c_field(&rec[8..40]),
            host: c_field(&rec[76..332]),
            started: i32::from_ne_bytes([rec[340], rec[341], rec[342], rec[343]]) as i64,
        })
        .filter(|u| !u.user.is_empty())
        .collect()
}

fn c_field(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_model_skips_placeholder_names() {
        let content = "processor\t: 0\nmodel name\t: AMD Ryzen 7 5800X 8-Core Processor\n";
        assert_eq!(
            parse_cpu_model(content).as_deref(),
            Some("AMD Ryzen 7 5800X 8-Core Processor")
        );
        assert_eq!(parse_cpu_model("model name\t: cpu0\n"), None);
        assert_eq!(parse_cpu_model("processor\t: 0\n"), None);
    }

    #[test]
    fn cpu_cache_size_in_kib() {
        let content = "processor\t: 0\nmodel name\t: Intel(R) Xeon(R)\ncache size\t: 36608 KB\n";
        assert_eq!(parse_cpu_cache_kb(content), Some(36608));
        assert_eq!(parse_cpu_cache_kb("cache size\t: \n"), None);
        assert_eq!(parse_cpu_cache_kb("processor\t: 0\n"), None);
    }

    #[test]
    fn cpu_max_freq_khz_to_mhz() {
        assert_eq!(parse_cpu_max_freq("3700000\n"), Some(3700.0));
        assert_eq!(parse_cpu_max_freq("0\n"), None);
        assert_eq!(parse_cpu_max_freq("<unknown>"), None);
    }

    #[test]
    fn missing_interface_has_no_flags() {
        assert!(interface_flags("no-such-iface0").is_empty());
        assert_eq!(interface_drops("no-such-iface0"), (0, 0));
    }

    #[test]
    fn os_release_prefers_pretty_name() {
        let content = "NAME=\"Ubuntu\"\nPRETTY_NAME=\"Ubuntu 24.04.1 LTS\"\n";
        assert_eq!(
            parse_os_release(content).as_deref(),
            Some("Ubuntu 24.04.1 LTS")
        );
        assert_eq!(
            parse_os_release("NAME=Alpine Linux\n").as_deref(),
            Some("Alpine Linux")
        );
        assert_eq!(parse_os_release("PRETTY_NAME=\"\"\n"), None);
    }

    #[test]
    fn meminfo_converts_kib_to_bytes() {
        let content = "MemTotal:       16318420 kB\n\
                       Buffers:          204800 kB\n\
                       Cached:          4096000 kB\n\
                       SwapCached:           12 kB\n\
                       Active:          6000000 kB\n\
                       Inactive:        3000000 kB\n\
                       Shmem:             51200 kB\n";
        let m = parse_meminfo(content);
        assert_eq!(m.buffers, 204800 * 1024);
        assert_eq!(m.cached, 4096000 * 1024);
        assert_eq!(m.active, 6000000 * 1024);
        assert_eq!(m.inactive, 3000000 * 1024);
        assert_eq!(m.shared, 51200 * 1024);
    }

    #[test]
    fn interface_flags_decode() {
        assert_eq!(
            decode_interface_flags("0x1003\n"),
            vec!["up", "broadcast", "multicast"]
        );
        assert_eq!(decode_interface_flags("0x49"), vec!["up", "loopback", "running"]);
        assert!(decode_interface_flags("garbage").is_empty());
    }

    #[test]
    fn diskstats_sums_devices_and_skips_short_lines() {
        let content = "   8       0 sda 100 5 2000 300 50 2 1000 150 0 400 450\n\
                          8       1 sda1 10 0 200 30 5 0 100 15 0 40 45\n\
                          7       0 loop0 oops\n";
        let io = parse_diskstats(content);
        assert_eq!(io.disk_read_count, 110);
        assert_eq!(io.disk_read_bytes, 2200 * 512);
        assert_eq!(io.disk_read_time, 330);
        assert_eq!(io.disk_write_count, 55);
        assert_eq!(io.disk_write_bytes, 1100 * 512);
        assert_eq!(io.disk_write_time, 165);
    }

    fn utmp_record(kind: i16, user: &str, line: &str, host: &str, tv_sec: i32) -> Vec<u8> {
        let mut rec = vec![0u8; UTMP_RECORD_LEN];
        rec[0..2].copy_from_slice(&kind.to_ne_bytes());
        rec[8..8 + line.len()].copy_from_slice(line.as_bytes());
        rec[44..44 + user.len()].copy_from_slice(user.as_bytes());
        rec[76..76 + host.len()].copy_from_slice(host.as_bytes());
        rec[340..344].copy_from_slice(&tv_sec.to_ne_bytes());
        rec
    }

    #[test]
    fn utmp_keeps_only_user_processes() {
        let mut bytes = utmp_record(2, "reboot", "~", "6.8.0", 1_700_000_000);
        bytes.extend(utmp_record(7, "alice", "pts/0", "10.0.0.5", 1_700_000_100));
        bytes.extend(utmp_record(8, "bob", "pts/1", "", 1_700_000_200));
        // Trailing partial record is ignored.
        bytes.extend([0u8; 17]);

        let users = parse_utmp(&bytes);
        assert_eq!(
            users,
            vec![UserInfo {
                user: "alice".into(),
                terminal: "pts/0".into(),
                host: "10.0.0.5".into(),
                started: 1_700_000_100,
            }]
        );
    }
}
