use super::worker::{dispatch, Outcome, Worker};
use crate::{
    cancel::CancelToken,
    connector::{Connection, Connector, NetConnector},
    errors::{AttemptError, DialError, FailureKind},
};
use log::{debug, info, trace, warn};
use std::{sync::Arc, time::Duration};
use tokio::{sync::mpsc, task::JoinHandle};

/// How many connection attempts may be in flight at once unless configured otherwise.
pub const DEFAULT_MAX_PARALLEL_DIALS: usize = 100;

/// Races connection attempts against a list of addresses.
pub struct Dialer<C = NetConnector> {
    connector: Arc<C>,
    max_parallel_dials: usize,
}

impl Default for Dialer<NetConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialer<NetConnector> {
    pub fn new() -> Self {
        Self::with_connector(NetConnector)
    }
}

impl<C> Clone for Dialer<C> {
    fn clone(&self) -> Self {
        Self {
            connector: Arc::clone(&self.connector),
            max_parallel_dials: self.max_parallel_dials,
        }
    }
}

/// The coordinator's view of a finished race.
pub(crate) struct Race<T> {
    pub result: Result<T, DialError>,
    /// Results the coordinator read before returning.
    pub consumed: usize,
    /// Closes stragglers; resolves to the number of results it read.
    pub drain: Option<JoinHandle<usize>>,
}

impl<C: Connector> Dialer<C> {
    pub fn with_connector(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
            max_parallel_dials: DEFAULT_MAX_PARALLEL_DIALS,
        }
    }

    /// Caps the number of concurrent attempts. Must be at least one.
    pub fn max_parallel_dials(mut self, max_parallel_dials: usize) -> Self {
        self.max_parallel_dials = max_parallel_dials;
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Dials every address concurrently and returns the first connection made.
    ///
    /// Each attempt is limited by `timeout`; the race as a whole only ends when an
    /// attempt succeeds, every address has failed, or `cancel` fires. Connections
    /// that complete after the winner are closed in the background.
    pub async fn dial(
        &self,
        cancel: &CancelToken,
        network: &str,
        addresses: &[String],
        timeout: Duration,
    ) -> Result<C::Conn, DialError> {
        self.race(cancel, network, addresses, timeout).await.result
    }

    pub(crate) async fn race(
        &self,
        cancel: &CancelToken,
        network: &str,
        addresses: &[String],
        timeout: Duration,
    ) -> Race<C::Conn> {
        let rejected = |err| Race {
            result: Err(err),
            consumed: 0,
            drain: None,
        };
        if addresses.is_empty() {
            return rejected(DialError::NoAddresses);
        }
        if timeout.is_zero() {
            return rejected(DialError::InvalidTimeout);
        }
        if self.max_parallel_dials == 0 {
            return rejected(DialError::InvalidParallelism);
        }

        let total = addresses.len();
        let parallel = self.max_parallel_dials.min(total);
        let race_cancel = cancel.child();
        let feed = dispatch(addresses);
        let network: Arc<str> = Arc::from(network);
        let (sender, mut results) = mpsc::unbounded_channel();

        debug!(
            "Racing {} addresses over {} with {} workers.",
            total, network, parallel
        );

        for id in 0..parallel {
            let worker = Worker {
                id,
                connector: Arc::clone(&self.connector),
                network: Arc::clone(&network),
                timeout,
                cancel: race_cancel.clone(),
                feed: Arc::clone(&feed),
                results: sender.clone(),
            };
            tokio::spawn(worker.run());
        }
        drop(sender);

        let mut last_failure: Option<AttemptError> = None;
        let mut consumed = 0;

        while consumed < total {
            let Some(outcome) = results.recv().await else {
                break;
            };
            consumed += 1;

            match outcome {
                Outcome::Connected { address, conn } => {
                    race_cancel.cancel();
                    info!(
                        "Connected to {} after {} of {} results.",
                        address, consumed, total
                    );
                    let stragglers = total - consumed;
                    let drain = (stragglers > 0)
                        .then(|| tokio::spawn(close_stragglers(results, stragglers)));
                    return Race {
                        result: Ok(conn),
                        consumed,
                        drain,
                    };
                }
                // A cancellation says the race is over, not that the address is bad.
                Outcome::Failed(err) if err.kind == FailureKind::Cancelled => {
                    trace!("{}", err);
                }
                Outcome::Failed(err) => last_failure = Some(err),
                Outcome::Skipped(address) => trace!("{} was skipped.", address),
            }
        }

        race_cancel.cancel();

        let addresses = addresses.to_vec();
        let result = if cancel.is_cancelled() {
            Err(DialError::Cancelled {
                addresses,
                last: last_failure,
            })
        } else {
            let last = last_failure.unwrap_or_else(|| {
                AttemptError::new(addresses[total - 1].clone(), FailureKind::Other)
            });
            Err(DialError::Exhausted { addresses, last })
        };
        if let Err(err) = &result {
            warn!("{}", err);
        }

        Race {
            result,
            consumed,
            drain: None,
        }
    }
}

/// Reads the results still owed after the winner was picked and closes any
/// connection among them. Ends after `remaining` results or when every worker is gone.
async fn close_stragglers<T>(
    mut results: mpsc::UnboundedReceiver<Outcome<T>>,
    remaining: usize,
) -> usize {
    let mut drained = 0;
    while drained < remaining {
        let Some(outcome) = results.recv().await else {
            break;
        };
        drained += 1;
        if let Outcome::Connected { address, conn } = outcome {
            debug!("Closing the connection to {}, it lost the race.", address);
            drop(conn);
        }
    }
    trace!("Drained {} results.", drained);
    drained
}

/// Races `addresses` over `network` with the default connector and parallelism.
pub async fn dial(
    cancel: &CancelToken,
    network: &str,
    addresses: &[String],
    timeout: Duration,
) -> Result<Connection, DialError> {
    Dialer::new().dial(cancel, network, addresses, timeout).await
}
