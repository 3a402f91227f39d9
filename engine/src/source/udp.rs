//! Live input from UDP datagrams, one CoT document per datagram.
//!
//! Receive is blocking without timeout, the only way out is to terminate the process.
//!

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

use tracing::{debug, info, trace};

use crate::{Origin, Raw, Source, SourceError};

/// Largest payload of a UDP datagram over IPv4.
pub const MAX_DATAGRAM: usize = 65507;

/// Bound socket and its receive buffer.
///
#[derive(Debug)]
pub struct UdpSource {
    socket: UdpSocket,
    buf: Vec<u8>,
}

impl UdpSource {
    /// Plain unicast/broadcast listener on `bind:port`.
    ///
    #[tracing::instrument]
    pub fn bind(bind: IpAddr, port: u16) -> Result<Self, SourceError> {
        let addr = SocketAddr::new(bind, port);
        let socket = UdpSocket::bind(addr).map_err(|e| SourceError::Bind(addr.to_string(), e))?;
        info!("listening on {addr}");

        Ok(UdpSource {
            socket,
            buf: vec![0u8; MAX_DATAGRAM],
        })
    }

    /// Join `group` on the interface owning `bind`, the socket itself listens on all addresses.
    ///
    #[tracing::instrument]
    pub fn multicast(group: IpAddr, bind: IpAddr, port: u16) -> Result<Self, SourceError> {
        let group = match group {
            IpAddr::V4(g) if g.is_multicast() => g,
            _ => return Err(SourceError::NotIpv4Multicast(group.to_string())),
        };
        let iface = match bind {
            IpAddr::V4(a) => a,
            IpAddr::V6(_) => return Err(SourceError::NotIpv4Multicast(bind.to_string())),
        };

        let src = Self::bind(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port)?;
        src.socket
            .join_multicast_v4(&group, &iface)
            .map_err(|e| SourceError::Multicast(group.to_string(), e))?;
        info!("joined {group} on {iface}");
        Ok(src)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }
}

impl Source for UdpSource {
    /// Never returns `None`, errors are all fatal.
    ///
    fn next_document(&mut self) -> Option<Result<Raw, SourceError>> {
        let res = match self.socket.recv_from(&mut self.buf) {
            Ok((len, from)) => {
                trace!("{len} bytes from {from}");
                let data = String::from_utf8_lossy(&self.buf[..len]).to_string();
                debug!("data={data}");
                Ok(Raw {
                    origin: Origin::Datagram(from),
                    data,
                })
            }
            Err(e) => Err(SourceError::Receive(e)),
        };
        Some(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

    #[test]
    fn test_udp_receive() {
        let mut src = UdpSource::bind(LOCALHOST, 0).unwrap();
        let to = src.local_addr().unwrap();

        let tx = UdpSocket::bind((LOCALHOST, 0)).unwrap();
        tx.send_to(b"<event/>", to).unwrap();

        let raw = src.next_document().unwrap().unwrap();
        assert_eq!("<event/>", raw.data);
        assert_eq!(Origin::Datagram(tx.local_addr().unwrap()), raw.origin);
        assert!(raw.origin.file_name().is_none());
    }

    #[test]
    fn test_udp_bind_in_use() {
        let src = UdpSource::bind(LOCALHOST, 0).unwrap();
        let port = src.local_addr().unwrap().port();

        let res = UdpSource::bind(LOCALHOST, port);
        assert!(matches!(res, Err(SourceError::Bind(..))));
        assert!(res.unwrap_err().is_fatal());
    }

    #[test]
    fn test_udp_multicast_bad_group() {
        let res = UdpSource::multicast(LOCALHOST, IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0);
        assert!(matches!(res, Err(SourceError::NotIpv4Multicast(_))));

        let res = UdpSource::multicast(
            IpAddr::V6(Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            0,
        );
        assert!(matches!(res, Err(SourceError::NotIpv4Multicast(_))));
    }
}
