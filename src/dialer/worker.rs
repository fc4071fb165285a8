use crate::{
    cancel::CancelToken,
    connector::Connector,
    errors::{AttemptError, FailureKind},
};
use log::{debug, trace};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{mpsc, Mutex},
    time::timeout,
};

/// What a worker reports for each address it pulled from the feed.
#[derive(Debug)]
pub enum Outcome<T> {
    Connected { address: String, conn: T },
    Failed(AttemptError),
    /// Pulled after the worker stopped dialing; never attempted.
    Skipped(String),
}

/// The shared address feed. Every address is handed out to exactly one worker.
pub type Feed = Arc<Mutex<mpsc::UnboundedReceiver<String>>>;

/// Loads every address into a closed feed, in the order given.
pub fn dispatch(addresses: &[String]) -> Feed {
    let (sender, receiver) = mpsc::unbounded_channel();
    for address in addresses {
        // The receiver is alive right here, so this cannot fail.
        let _ = sender.send(address.clone());
    }
    Arc::new(Mutex::new(receiver))
}

pub struct Worker<C: Connector> {
    pub id: usize,
    pub connector: Arc<C>,
    pub network: Arc<str>,
    pub timeout: Duration,
    pub cancel: CancelToken,
    pub feed: Feed,
    pub results: mpsc::UnboundedSender<Outcome<C::Conn>>,
}

impl<C: Connector> Worker<C> {
    /// Dials addresses until the feed runs dry, a connection is made, or the race
    /// is cancelled. Whatever is left in the feed afterwards is reported as skipped.
    ///
    /// Returns how many results this worker produced.
    pub async fn run(self) -> usize {
        let mut produced = 0;

        while let Some(address) = self.next_address().await {
            let outcome = self.attempt(address).await;
            let keep_going = match &outcome {
                Outcome::Connected { .. } => false,
                Outcome::Failed(err) => err.kind.keeps_worker_going(),
                Outcome::Skipped(_) => true,
            };
            self.report(outcome);
            produced += 1;
            if !keep_going {
                break;
            }
        }

        while let Some(address) = self.next_address().await {
            trace!("Worker {} skips {}.", self.id, address);
            self.report(Outcome::Skipped(address));
            produced += 1;
        }

        produced
    }

    async fn next_address(&self) -> Option<String> {
        self.feed.lock().await.recv().await
    }

    fn report(&self, outcome: Outcome<C::Conn>) {
        // Nobody listens once the race and its drain are over; a connection
        // that comes back with the error is dropped, which closes it.
        let _ = self.results.send(outcome);
    }

    /// A single connect, bounded by the per-attempt timeout and the race cancellation.
    async fn attempt(&self, address: String) -> Outcome<C::Conn> {
        if self.cancel.is_cancelled() {
            return Outcome::Failed(AttemptError::new(address, FailureKind::Cancelled));
        }

        debug!("Worker {} dials {} {}.", self.id, self.network, address);

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = timeout(self.timeout, self.connector.connect(&self.network, &address)) => Some(result),
        };

        match result {
            Some(Ok(Ok(conn))) => Outcome::Connected { address, conn },
            Some(Ok(Err(err))) => {
                debug!("Worker {} failed to dial {}: {}.", self.id, address, err);
                Outcome::Failed(AttemptError::io(address, err))
            }
            Some(Err(_)) => {
                debug!("Worker {} timed out dialing {}.", self.id, address);
                Outcome::Failed(AttemptError::new(address, FailureKind::Timeout))
            }
            None => Outcome::Failed(AttemptError::new(address, FailureKind::Cancelled)),
        }
    }
}
