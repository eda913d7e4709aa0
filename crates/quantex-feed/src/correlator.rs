/*
[INPUT]:  Subscribe/unsubscribe batches and inbound acknowledgement frames
[OUTPUT]: Correlated request outcomes and the active-subscription set
[POS]:    Control plane - request/ack correlation over one shared connection
[UPDATE]: When batching rules or acknowledgement semantics change
*/

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{QuantexError, Result};
use crate::topic;
use crate::types::Subscription;
use crate::wire::{ControlAck, ControlMethod, ControlRequest};

/// Result of one subscribe/unsubscribe batch. Every subscription of the
/// batch lands in exactly one of the two sets.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub successful: Vec<Subscription>,
    pub failed: Vec<Subscription>,
}

/// Correlates asynchronous control requests with their acknowledgements.
///
/// Pending entries are inserted by control-plane callers and resolved by
/// the ingestion loop; waits are bounded so a lost acknowledgement
/// degrades to a failed subscription instead of hanging the caller.
pub struct SubscriptionCorrelator {
    next_id: AtomicU64,
    pending: Mutex<HashMap<u64, oneshot::Sender<ControlAck>>>,
    active: Mutex<HashSet<Subscription>>,
    outbound: Mutex<Option<mpsc::Sender<String>>>,
    ack_timeout: Duration,
    cancel: CancellationToken,
}

impl SubscriptionCorrelator {
    pub fn new(ack_timeout: Duration, cancel: CancellationToken) -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: Mutex::new(HashMap::new()),
            active: Mutex::new(HashSet::new()),
            outbound: Mutex::new(None),
            ack_timeout,
            cancel,
        }
    }

    /// Fresh process-unique correlation id
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Wire the control-plane sender for the current connection
    pub fn attach(&self, sender: mpsc::Sender<String>) -> Result<()> {
        let mut outbound = self.outbound.lock();
        if outbound.is_some() {
            return Err(QuantexError::AlreadyConnected);
        }
        *outbound = Some(sender);
        Ok(())
    }

    /// Drop the control-plane sender when the connection ends
    pub fn detach(&self) {
        *self.outbound.lock() = None;
    }

    pub fn is_attached(&self) -> bool {
        self.outbound.lock().is_some()
    }

    pub async fn subscribe(&self, subs: Vec<Subscription>) -> Result<BatchOutcome> {
        self.send_batch(ControlMethod::Subscription, subs).await
    }

    pub async fn unsubscribe(&self, subs: Vec<Subscription>) -> Result<BatchOutcome> {
        self.send_batch(ControlMethod::Unsubscription, subs).await
    }

    /// Currently-active subscriptions
    pub fn active(&self) -> Vec<Subscription> {
        self.active.lock().iter().cloned().collect()
    }

    /// Resolve a matching acknowledgement arriving on the ingestion path.
    /// Returns false when no request is pending under that id.
    pub fn resolve_ack(&self, ack: ControlAck) -> bool {
        let entry = self.pending.lock().remove(&ack.id);
        match entry {
            Some(waiter) => {
                if waiter.send(ack).is_err() {
                    // waiter already gave up (timeout raced the ack)
                    debug!("ack arrived after its waiter left");
                }
                true
            }
            None => false,
        }
    }

    /// Hard reset on reconnect: discard all pending correlations (waking
    /// their waiters with failure) and hand back the previously-active
    /// subscriptions for re-issue from scratch.
    pub fn reset(&self) -> Vec<Subscription> {
        self.detach();
        self.pending.lock().clear();
        self.active.lock().drain().collect()
    }

    /// One request per logical group: a public subscription batches all of
    /// its instruments' topics into a single request; a private one sends
    /// a single request with its lone topic.
    async fn send_batch(
        &self,
        method: ControlMethod,
        subs: Vec<Subscription>,
    ) -> Result<BatchOutcome> {
        // Topic formatting validates every group before any frame is sent.
        let groups = subs
            .into_iter()
            .map(|sub| {
                let topics = topics_for(&sub)?;
                Ok((sub, topics))
            })
            .collect::<Result<Vec<_>>>()?;

        let sender = self
            .outbound
            .lock()
            .clone()
            .ok_or(QuantexError::NotConnected)?;

        let mut outcome = BatchOutcome::default();
        for (sub, topics) in groups {
            match self.request_group(&sender, method, topics).await {
                Ok(()) => outcome.successful.push(sub),
                Err(err) if err.is_subscription_failure() => {
                    warn!(error = %err, channel = ?sub.channel, "subscription group failed");
                    outcome.failed.push(sub);
                }
                Err(err) => {
                    // Hard error: record what already resolved, drop the rest.
                    outcome.failed.push(sub);
                    self.apply_outcome(method, &outcome);
                    return Err(err);
                }
            }
        }

        self.apply_outcome(method, &outcome);
        Ok(outcome)
    }

    async fn request_group(
        &self,
        sender: &mpsc::Sender<String>,
        method: ControlMethod,
        topics: Vec<String>,
    ) -> Result<()> {
        let id = self.next_id();
        let (ack_tx, ack_rx) = oneshot::channel();
        self.pending.lock().insert(id, ack_tx);

        let request = ControlRequest::new(id, method, topics);
        let json = match request.to_json() {
            Ok(json) => json,
            Err(err) => {
                self.pending.lock().remove(&id);
                return Err(err);
            }
        };
        if sender.send(json).await.is_err() {
            self.pending.lock().remove(&id);
            return Err(QuantexError::Transport(
                "control channel closed".to_string(),
            ));
        }

        tokio::select! {
            ack = ack_rx => match ack {
                Ok(ack) if ack.is_success() => Ok(()),
                Ok(ack) => Err(QuantexError::AckRejected { id, code: ack.code }),
                // pending table was discarded underneath us (reconnect)
                Err(_) => Err(QuantexError::AckTimeout { id }),
            },
            _ = tokio::time::sleep(self.ack_timeout) => {
                self.pending.lock().remove(&id);
                Err(QuantexError::AckTimeout { id })
            }
            _ = self.cancel.cancelled() => {
                self.pending.lock().remove(&id);
                Err(QuantexError::Cancelled)
            }
        }
    }

    /// Two disjoint batch operations under one lock acquisition, so a
    /// concurrent reader never observes a half-applied outcome.
    fn apply_outcome(&self, method: ControlMethod, outcome: &BatchOutcome) {
        let mut active = self.active.lock();
        match method {
            ControlMethod::Subscription => {
                for sub in &outcome.failed {
                    active.remove(sub);
                }
                for sub in &outcome.successful {
                    active.insert(sub.clone());
                }
            }
            ControlMethod::Unsubscription => {
                for sub in &outcome.successful {
                    active.remove(sub);
                }
            }
            ControlMethod::Ping => {}
        }
    }
}

fn topics_for(sub: &Subscription) -> Result<Vec<String>> {
    if sub.is_private() {
        return Ok(vec![topic::format(sub, None)?]);
    }
    if sub.instruments.is_empty() {
        return Err(QuantexError::InvalidSubscription {
            channel: sub.channel,
            reason: "public channel requires at least one instrument",
        });
    }
    sub.instruments
        .iter()
        .map(|instrument| topic::format(sub, Some(instrument)))
        .collect()
}
