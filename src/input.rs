use crate::{
    connector::Network,
    dialer::engine::{Dialer, DEFAULT_MAX_PARALLEL_DIALS},
    errors::ConfigError,
    targets::Targets,
};
use anyhow::Result;
use serde::Deserialize;
use std::{fs, net::IpAddr, path::Path, time::Duration};

/// What to dial and how. Every field may be left out of the file.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DialerConfig {
    pub network: String,
    /// Per-attempt timeout in milliseconds.
    pub timeout: u64,
    pub max_parallel_dials: usize,
    /// Explicit `ip:port` addresses, dialed first.
    pub addresses: Vec<String>,
    /// Combined with `port_numbers` into one address per pair.
    pub ip_addresses: Vec<String>,
    pub port_numbers: Vec<String>,
}

impl Default for DialerConfig {
    fn default() -> Self {
        Self {
            network: "tcp".to_string(),
            timeout: 5000,
            max_parallel_dials: DEFAULT_MAX_PARALLEL_DIALS,
            addresses: Vec::new(),
            ip_addresses: Vec::new(),
            port_numbers: Vec::new(),
        }
    }
}

impl DialerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if Network::parse(&self.network).is_none() {
            return Err(ConfigError::UnsupportedNetwork(self.network.clone()));
        }
        let has_products = !self.ip_addresses.is_empty() && !self.port_numbers.is_empty();
        if self.addresses.is_empty() && !has_products {
            return Err(ConfigError::NoTargets);
        }
        Ok(())
    }

    pub fn per_attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }

    /// The full address list: explicit addresses, then every IP/port pair.
    pub fn targets(&self) -> Result<Vec<String>> {
        let ip_addresses = parse_ip_addresses(&self.ip_addresses)?;
        let port_numbers = parse_port_numbers(&self.port_numbers)?;

        let mut targets = self.addresses.clone();
        targets.extend(Targets::new(&ip_addresses, &port_numbers));
        Ok(targets)
    }

    pub fn dialer(&self) -> Dialer {
        Dialer::new().max_parallel_dials(self.max_parallel_dials)
    }
}

pub fn load_config(path: impl AsRef<Path>) -> Result<DialerConfig> {
    let data = fs::read(path)?;
    let text = String::from_utf8(data)?;
    let config: DialerConfig = toml::from_str(&text)?;
    Ok(config)
}

/// Parses ports given either singly (`"80"`) or as inclusive ranges (`"8000-8010"`).
pub fn parse_port_numbers(ports: &[String]) -> Result<Vec<u16>> {
    let mut port_numbers = Vec::new();
    for port in ports {
        if let Some((start, end)) = port.split_once('-') {
            let start = start.trim().parse::<u16>()?;
            let end = end.trim().parse::<u16>()?;
            if start > end {
                return Err(ConfigError::InvalidPortRange(port.clone()).into());
            }
            port_numbers.extend(start..=end);
        } else {
            port_numbers.push(port.trim().parse::<u16>()?);
        }
    }
    Ok(port_numbers)
}

pub fn parse_ip_addresses(ips: &[String]) -> Result<Vec<IpAddr>> {
    let mut ip_addresses = Vec::new();
    for ip in ips {
        ip_addresses.push(ip.trim().parse::<IpAddr>()?);
    }
    Ok(ip_addresses)
}
