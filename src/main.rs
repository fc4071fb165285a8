use anyhow::{Context, Result};
use clap::Parser;
use env_logger::{Builder, WriteStyle};
use log::{info, LevelFilter};
use racedial::{load_config, CancelToken, DialerConfig};
use std::path::PathBuf;

/// Connects to whichever of the given addresses answers first.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// TOML file with the dialer settings and targets.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Transport to dial over: tcp, tcp4, tcp6, udp, udp4 or udp6.
    #[arg(short, long)]
    network: Option<String>,

    /// Per-attempt timeout in milliseconds.
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Maximum number of attempts in flight at once.
    #[arg(short, long)]
    parallel: Option<usize>,

    /// Addresses to race, as ip:port.
    addresses: Vec<String>,
}

impl Cli {
    fn into_config(self) -> Result<DialerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("Cannot load config from {}", path.display()))?,
            None => DialerConfig::default(),
        };

        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(parallel) = self.parallel {
            config.max_parallel_dials = parallel;
        }
        config.addresses.extend(self.addresses);

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    Builder::new()
        .write_style(WriteStyle::Always)
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Cli::parse().into_config()?;
    let addresses = config.targets()?;

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupted, giving up.");
                cancel.cancel();
            }
        });
    }

    let conn = config
        .dialer()
        .dial(
            &cancel,
            &config.network,
            &addresses,
            config.per_attempt_timeout(),
        )
        .await?;

    println!(
        "Connected to {} over {} from {}.",
        conn.peer_addr()?,
        conn.network(),
        conn.local_addr()?
    );

    Ok(())
}
