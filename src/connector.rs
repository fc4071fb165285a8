use futures::future::BoxFuture;
use std::{
    io,
    net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr},
};
use tokio::net::{TcpStream, UdpSocket};

/// Establishes a transport connection to a single address.
///
/// The race engine is generic over this so that it never needs to know what a
/// connection actually is. Dropping a connection must close it.
pub trait Connector: Send + Sync + 'static {
    type Conn: Send + 'static;

    fn connect<'a>(&'a self, network: &'a str, address: &'a str)
        -> BoxFuture<'a, io::Result<Self::Conn>>;
}

/// The transport families understood by [`NetConnector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Network {
    Tcp,
    Tcp4,
    Tcp6,
    Udp,
    Udp4,
    Udp6,
}

impl Network {
    pub fn parse(network: &str) -> Option<Self> {
        match network {
            "tcp" => Some(Network::Tcp),
            "tcp4" => Some(Network::Tcp4),
            "tcp6" => Some(Network::Tcp6),
            "udp" => Some(Network::Udp),
            "udp4" => Some(Network::Udp4),
            "udp6" => Some(Network::Udp6),
            _ => None,
        }
    }

    fn accepts(self, socket: &SocketAddr) -> bool {
        match self {
            Network::Tcp | Network::Udp => true,
            Network::Tcp4 | Network::Udp4 => socket.is_ipv4(),
            Network::Tcp6 | Network::Udp6 => socket.is_ipv6(),
        }
    }
}

/// An open transport connection.
#[derive(Debug)]
pub enum Connection {
    Tcp(TcpStream),
    Udp(UdpSocket),
}

impl Connection {
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        match self {
            Connection::Tcp(stream) => stream.peer_addr(),
            Connection::Udp(socket) => socket.peer_addr(),
        }
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        match self {
            Connection::Tcp(stream) => stream.local_addr(),
            Connection::Udp(socket) => socket.local_addr(),
        }
    }

    pub fn network(&self) -> &'static str {
        match self {
            Connection::Tcp(_) => "tcp",
            Connection::Udp(_) => "udp",
        }
    }

    pub fn into_tcp(self) -> Option<TcpStream> {
        match self {
            Connection::Tcp(stream) => Some(stream),
            Connection::Udp(_) => None,
        }
    }
}

/// Connects over the operating system's TCP and UDP sockets.
///
/// Addresses must already be resolved `ip:port` pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetConnector;

impl NetConnector {
    async fn open(network: &str, address: &str) -> io::Result<Connection> {
        let network = Network::parse(network).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                format!("unsupported network {network:?}"),
            )
        })?;
        let socket: SocketAddr = address.parse().map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{address:?} is not an ip:port pair"),
            )
        })?;
        if !network.accepts(&socket) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{socket} does not belong to {network:?}"),
            ));
        }

        match network {
            Network::Tcp | Network::Tcp4 | Network::Tcp6 => {
                TcpStream::connect(socket).await.map(Connection::Tcp)
            }
            Network::Udp | Network::Udp4 | Network::Udp6 => {
                let local = match socket.ip() {
                    IpAddr::V4(_) => SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), 0),
                    IpAddr::V6(_) => SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), 0),
                };
                let udp = UdpSocket::bind(local).await?;
                udp.connect(socket).await?;
                Ok(Connection::Udp(udp))
            }
        }
    }
}

impl Connector for NetConnector {
    type Conn = Connection;

    fn connect<'a>(
        &'a self,
        network: &'a str,
        address: &'a str,
    ) -> BoxFuture<'a, io::Result<Connection>> {
        Box::pin(Self::open(network, address))
    }
}
