// Socket tables from /proc/net and socket-inode ownership from /proc/<pid>/fd (Linux)

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::{CollectError, Source};

pub(super) const TCP_TABLES: &[&str] = &["/proc/net/tcp", "/proc/net/tcp6"];
pub(super) const UDP_TABLES: &[&str] = &["/proc/net/udp", "/proc/net/udp6"];

/// One parsed row of /proc/net/{tcp,udp}[6].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RawSocket {
    pub local_addr: IpAddr,
    pub port: u16,
    pub state: u8,
    pub inode: u64,
}

/// Read and merge the given tables. Fails only if none of them could be read,
/// so a host without IPv6 still reports its IPv4 sockets.
pub(super) fn read_tables(paths: &[&str], source: Source) -> Result<Vec<RawSocket>, CollectError> {
    if !cfg!(target_os = "linux") {
        return Err(CollectError::Unsupported(source));
    }
    let mut sockets = Vec::new();
    let mut first_err = None;
    let mut any_read = false;
    for path in paths {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                any_read = true;
                sockets.extend(parse_table(&content));
            }
            Err(e) => {
                tracing::debug!(path, error = %e, "socket table unreadable");
                first_err.get_or_insert(CollectError::io(source, *path, e));
            }
        }
    }
    match first_err {
        Some(err) if !any_read => Err(err),
        _ => Ok(sockets),
    }
}

pub(super) fn parse_table(content: &str) -> Vec<RawSocket> {
    content.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<RawSocket> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 10 || !fields[0].ends_with(':') {
        return None;
    }
    let (addr_hex, port_hex) = fields[1].split_once(':')?;
    Some(RawSocket {
        local_addr: parse_addr(addr_hex)?,
        port: u16::from_str_radix(port_hex, 16).ok()?,
        state: u8::from_str_radix(fields[3], 16).ok()?,
        inode: fields[9].parse().ok()?,
    })
}

/// The kernel prints each 32-bit word of the address in host byte order.
fn parse_addr(hex: &str) -> Option<IpAddr> {
    match hex.len() {
        8 => {
            let word = u32::from_str_radix(hex, 16).ok()?;
            Some(IpAddr::V4(Ipv4Addr::from(word.to_ne_bytes())))
        }
        32 => {
            let mut octets = [0u8; 16];
            for (i, chunk) in octets.chunks_exact_mut(4).enumerate() {
                let word = u32::from_str_radix(hex.get(i * 8..i * 8 + 8)?, 16).ok()?;
                chunk.copy_from_slice(&word.to_ne_bytes());
            }
            Some(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => None,
    }
}

/// Map socket inode -> owning PID by walking /proc/<pid>/fd. Processes whose fd
/// directory cannot be read (other users, already exited) are skipped.
pub(super) fn socket_owners() -> HashMap<u64, u32> {
    let mut owners = HashMap::new();
    let Ok(entries) = std::fs::read_dir("/proc") else {
        return owners;
    };
    let mut pids: Vec<u32> = entries
        .filter_map(|e| e.ok()?.file_name().to_str()?.parse().ok())
        .collect();
    pids.sort_unstable();

    for pid in pids {
        let Ok(fds) = std::fs::read_dir(format!("/proc/{}/fd", pid)) else {
            continue;
        };
        for fd in fds.flatten() {
            let Ok(target) = std::fs::read_link(fd.path()) else {
                continue;
            };
            if let Some(inode) = target.to_str().and_then(socket_inode) {
                owners.entry(inode).or_insert(pid);
            }
        }
    }
    owners
}

/// "socket:[12345]" -> 12345
fn socket_inode(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}
