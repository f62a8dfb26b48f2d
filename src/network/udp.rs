//! UDP socket setup

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};

use crate::constants::RECV_BUFFER_SIZE;

/// Create a blocking UDP socket bound to `addr`.
///
/// Reads time out after `recv_timeout` so the receive loop can poll its
/// stop flag. Address reuse is left off: a rebind must not overlap the
/// previous socket.
pub fn create_socket(addr: SocketAddr, recv_timeout: Duration) -> io::Result<UdpSocket> {
    let socket = Socket::new(Domain::for_address(addr), Type::DGRAM, Some(Protocol::UDP))?;

    if let Err(e) = socket.set_recv_buffer_size(RECV_BUFFER_SIZE) {
        tracing::warn!("Failed to set receive buffer size: {}", e);
    }
    socket.set_read_timeout(Some(recv_timeout))?;
    socket.bind(&addr.into())?;

    Ok(socket.into())
}

/// Address to send to when reaching a socket bound to `addr` from the
/// same host. Wildcard binds are reached through loopback.
pub fn local_target(addr: SocketAddr) -> SocketAddr {
    let ip = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, addr.port())
}

/// Send an empty datagram to wake a receiver blocked on `addr`.
pub fn nudge(addr: SocketAddr) -> io::Result<()> {
    let target = local_target(addr);
    let bind: SocketAddr = match target {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(bind)?;
    socket.send_to(&[], target)?;
    Ok(())
}
