//! Races connection attempts against many addresses at once and hands back the
//! first connection that succeeds. Every other connection that gets established
//! along the way is closed in the background.
//!
//! ```no_run
//! use racedial::{dial, CancelToken};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), racedial::DialError> {
//! let addresses = vec!["192.0.2.10:443".to_string(), "198.51.100.7:443".to_string()];
//! let conn = dial(&CancelToken::new(), "tcp", &addresses, Duration::from_secs(3)).await?;
//! println!("connected to {:?}", conn.peer_addr());
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod connector;
pub mod dialer;
pub mod errors;
pub mod input;
pub mod targets;

pub use cancel::CancelToken;
pub use connector::{Connection, Connector, NetConnector, Network};
pub use dialer::engine::{dial, Dialer, DEFAULT_MAX_PARALLEL_DIALS};
pub use errors::{AttemptError, ConfigError, DialError, FailureKind};
pub use input::{load_config, DialerConfig};
