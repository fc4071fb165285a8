use itertools::{iproduct, Product};
use std::net::{IpAddr, SocketAddr};

/// An iterator that produces an `ip:port` address for every combination of the given
/// IP addresses and ports, IP-major.
pub struct Targets<'a> {
    product: Product<std::slice::Iter<'a, IpAddr>, std::slice::Iter<'a, u16>>,
}

impl<'a> Targets<'a> {
    pub fn new(ip_addresses: &'a [IpAddr], port_numbers: &'a [u16]) -> Self {
        Self {
            product: iproduct!(ip_addresses.iter(), port_numbers.iter()),
        }
    }
}

impl Iterator for Targets<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        self.product
            .next()
            .map(|(ip, port)| SocketAddr::new(*ip, *port).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Targets;
    use std::{net::IpAddr, str::FromStr};

    #[test]
    fn empty_ips() {
        let ip_addresses = vec![];
        let port_numbers = vec![22, 80, 443];

        assert_eq!(Targets::new(&ip_addresses, &port_numbers).next(), None);
    }

    #[test]
    fn empty_ports() {
        let ip_addresses = vec![IpAddr::from_str("127.0.0.1").unwrap()];
        let port_numbers = vec![];

        assert_eq!(Targets::new(&ip_addresses, &port_numbers).next(), None);
    }

    #[test]
    fn ip_major_order() {
        let ip_addresses = vec![
            IpAddr::from_str("127.0.0.1").unwrap(),
            IpAddr::from_str("::1").unwrap(),
        ];
        let port_numbers = vec![80, 443];

        let targets: Vec<String> = Targets::new(&ip_addresses, &port_numbers).collect();

        // IPv6 addresses come out bracketed so they can be dialed as-is.
        assert_eq!(
            targets,
            vec!["127.0.0.1:80", "127.0.0.1:443", "[::1]:80", "[::1]:443"]
        );
    }
}
