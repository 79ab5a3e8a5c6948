use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

use super::result::{ObservedResults, Observation};
use crate::error::ProbeError;

/// Single task that receives observations from in-flight requests.
/// Requests complete in any order; the collected results are put back
/// into issuance order when the collector is finished.
pub struct ResultCollector {
    tx: UnboundedSender<Observation>,
    handle: JoinHandle<Vec<Observation>>,
}

impl ResultCollector {
    pub fn spawn() -> Self {
        let (tx, mut rx) = unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut received = Vec::new();
            while let Some(observation) = rx.recv().await {
                received.push(observation);
            }
            received
        });
        Self { tx, handle }
    }

    pub fn sender(&self) -> UnboundedSender<Observation> {
        self.tx.clone()
    }

    /// Wait until every sender handed out by [`ResultCollector::sender`] is dropped.
    pub async fn finish(self) -> Result<ObservedResults, ProbeError> {
        drop(self.tx);
        let received = self.handle.await?;
        Ok(ObservedResults::from_unordered(received))
    }
}
