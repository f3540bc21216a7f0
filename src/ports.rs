// Listening TCP / bound UDP sockets, correlated with their owning process

use tracing::warn;

use crate::collector::SocketTable;
use crate::models::{PortInfo, Protocol, SocketEntry, TcpState};

/// Status reported for every UDP socket; UDP has no connection state.
pub const UDP_STATUS: &str = "ACTIVE";
/// Process name when the owner is PID 0 or cannot be looked up.
pub const UNKNOWN_PROCESS: &str = "unknown";

/// Listening TCP sockets and every bound UDP socket, sorted by port number.
///
/// A protocol whose table cannot be read is skipped; the result is whatever the other
/// one produced, possibly nothing.
pub fn open_ports(table: &dyn SocketTable) -> Vec<PortInfo> {
    let mut ports = Vec::new();

    match table.tcp_sockets() {
        Ok(sockets) => ports.extend(
            sockets
                .into_iter()
                .filter(|s| s.state == Some(TcpState::Listen))
                .map(|s| to_port_info(table, s, Protocol::Tcp, TcpState::Listen.as_str())),
        ),
        Err(e) => warn!(error = %e, "TCP socket table unavailable"),
    }

    match table.udp_sockets() {
        Ok(sockets) => ports.extend(
            sockets
                .into_iter()
                .map(|s| to_port_info(table, s, Protocol::Udp, UDP_STATUS)),
        ),
        Err(e) => warn!(error = %e, "UDP socket table unavailable"),
    }

    // Stable: equal ports keep TCP before UDP and table order within a protocol.
    ports.sort_by_key(|p| p.port);
    ports
}

fn to_port_info(
    table: &dyn SocketTable,
    socket: SocketEntry,
    protocol: Protocol,
    status: &str,
) -> PortInfo {
    let process = if socket.pid == 0 {
        None
    } else {
        table.process_name(socket.pid)
    };
    if process.is_none() && socket.pid != 0 {
        tracing::debug!(pid = socket.pid, "socket owner exited or is not visible");
    }
    PortInfo {
        port: socket.port,
        protocol,
        status: status.to_string(),
        process: process.unwrap_or_else(|| UNKNOWN_PROCESS.to_string()),
        pid: socket.pid,
        address: socket.local_addr.to_string(),
    }
}
