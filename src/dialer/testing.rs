//! A scripted connector for exercising the race without touching the network.

use crate::connector::Connector;
use futures::future::BoxFuture;
use std::{
    collections::HashMap,
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    /// Connects after the given delay.
    Accept(Duration),
    Refuse,
    /// Never completes.
    Hang,
}

/// Counts connections as they are opened and closed.
#[derive(Debug, Default)]
pub struct Tally {
    pub opened: AtomicUsize,
    pub closed: AtomicUsize,
}

#[derive(Debug)]
pub struct MockConn {
    pub address: String,
    tally: Arc<Tally>,
}

impl Drop for MockConn {
    fn drop(&mut self) {
        self.tally.closed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Unknown addresses refuse.
#[derive(Debug, Default)]
pub struct MockConnector {
    behaviors: HashMap<String, Behavior>,
    attempted: Mutex<Vec<String>>,
    pub tally: Arc<Tally>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(address.to_string(), behavior);
        self
    }

    /// Addresses in the order their attempts started.
    pub fn attempted(&self) -> Vec<String> {
        self.attempted.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        self.tally.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.tally.closed.load(Ordering::SeqCst)
    }
}

impl Connector for MockConnector {
    type Conn = MockConn;

    fn connect<'a>(&'a self, _network: &'a str, address: &'a str) -> BoxFuture<'a, io::Result<MockConn>> {
        self.attempted.lock().unwrap().push(address.to_string());
        let behavior = self
            .behaviors
            .get(address)
            .copied()
            .unwrap_or(Behavior::Refuse);

        Box::pin(async move {
            match behavior {
                Behavior::Accept(delay) => {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    self.tally.opened.fetch_add(1, Ordering::SeqCst);
                    Ok(MockConn {
                        address: address.to_string(),
                        tally: Arc::clone(&self.tally),
                    })
                }
                Behavior::Refuse => Err(io::Error::from(io::ErrorKind::ConnectionRefused)),
                Behavior::Hang => std::future::pending().await,
            }
        })
    }
}
