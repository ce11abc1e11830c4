//! Startup banner

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// LAN IPv4 address of this host, or `127.0.0.1`.
///
/// Prefers the address the OS would route outbound traffic from, then
/// falls back to the first non-loopback IPv4 interface address.
pub fn lan_ipv4() -> Ipv4Addr {
    routed_ipv4()
        .or_else(interface_ipv4)
        .unwrap_or(Ipv4Addr::LOCALHOST)
}

/// The socket is never written to; connecting only selects a source address.
fn routed_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(192, 0, 2, 1), 9)).ok()?;
    match socket.local_addr().ok()? {
        SocketAddr::V4(addr) if !addr.ip().is_loopback() && !addr.ip().is_unspecified() => {
            Some(*addr.ip())
        }
        _ => None,
    }
}

fn interface_ipv4() -> Option<Ipv4Addr> {
    match if_addrs::get_if_addrs() {
        Ok(interfaces) => first_lan_ipv4(interfaces.iter().map(|iface| iface.ip())),
        Err(e) => {
            tracing::debug!("Failed to list network interfaces: {}", e);
            None
        }
    }
}

fn first_lan_ipv4(addrs: impl IntoIterator<Item = IpAddr>) -> Option<Ipv4Addr> {
    addrs.into_iter().find_map(|addr| match addr {
        IpAddr::V4(ip) if !ip.is_loopback() && !ip.is_unspecified() => Some(ip),
        _ => None,
    })
}

/// Banner lines for a scheme, port and LAN address
pub fn lines(scheme: &str, port: u16, lan: Ipv4Addr) -> Vec<String> {
    vec![
        format!("{}://localhost:{}", scheme, port),
        format!("{}://{}:{}", scheme, lan, port),
        "Ctrl-C to exit".to_string(),
    ]
}

/// Print the banner to stdout
pub fn print(scheme: &str, port: u16) {
    for line in lines(scheme, port, lan_ipv4()) {
        println!("{}", line);
    }
}
