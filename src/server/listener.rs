// Listener module
// Creates TCP listeners through socket2 so the backlog and reuse flags are explicit

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Pending-connection queue length
const LISTEN_BACKLOG: i32 = 1024;

/// Create a `TcpListener` with `SO_REUSEADDR` enabled.
///
/// Rebinding right after a restart succeeds even while the previous socket
/// is still in `TIME_WAIT`.
pub fn create_listener(addr: std::net::SocketAddr) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}
