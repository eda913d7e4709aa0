/*
[INPUT]:  Stream URL, optional session token, order-book store
[OUTPUT]: Live normalized feed events via a channel, managed subscriptions
[POS]:    Connection layer - dial, ingestion loop, keepalive, reset
[UPDATE]: When connection handling or the ingestion loop changes
*/

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::correlator::{BatchOutcome, SubscriptionCorrelator};
use crate::dispatch::{unhandled_event, Dispatcher};
use crate::error::{QuantexError, Result};
use crate::sync::{BookStore, BookSynchronizer};
use crate::types::{FeedEvent, Subscription};
use crate::wire::{classify, route_control, ControlMethod, ControlRequest, ControlRoute, RawFrame};

const STREAM_URL: &str = "wss://stream.quantex.io/ws/v1";
const DECODE_FAIL_LOG_LIMIT: usize = 5;
const RAW_LOG_MAX_BYTES: usize = 1024;

static DECODE_FAIL_LOG_COUNT: AtomicUsize = AtomicUsize::new(0);

/// Feed client configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub url: String,
    pub keepalive: Duration,
    pub ack_timeout: Duration,
    pub event_buffer: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: STREAM_URL.to_string(),
            keepalive: Duration::from_secs(20),
            ack_timeout: Duration::from_secs(5),
            event_buffer: 256,
        }
    }
}

/// Streaming feed client for the Quantex venue.
///
/// One connection, one ingestion loop. Subscription management may run
/// concurrently with ingestion; reconnect supervision lives outside and
/// drives `reset_for_reconnect` + `connect` + `subscribe`.
pub struct FeedClient {
    config: FeedConfig,
    correlator: Arc<SubscriptionCorrelator>,
    books: Arc<BookSynchronizer>,
    dispatcher: Dispatcher,
    event_tx: mpsc::Sender<FeedEvent>,
    event_rx: Option<mpsc::Receiver<FeedEvent>>,
    cancel: CancellationToken,
}

impl FeedClient {
    pub fn new(config: FeedConfig, store: Arc<dyn BookStore>) -> Self {
        let cancel = CancellationToken::new();
        let correlator = Arc::new(SubscriptionCorrelator::new(
            config.ack_timeout,
            cancel.clone(),
        ));
        let books = Arc::new(BookSynchronizer::new(store));
        let dispatcher = Dispatcher::new(Arc::clone(&books));
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);
        Self {
            config,
            correlator,
            books,
            dispatcher,
            event_tx,
            event_rx: Some(event_rx),
            cancel,
        }
    }

    /// Get the normalized event receiver (once)
    pub fn take_receiver(&mut self) -> Option<mpsc::Receiver<FeedEvent>> {
        self.event_rx.take()
    }

    pub fn is_connected(&self) -> bool {
        self.correlator.is_attached()
    }

    /// Dial the stream and spawn the ingestion loop.
    ///
    /// A session token (private channels) is appended to the URL before
    /// the dial; public-only consumers pass `None`.
    pub async fn connect(&self, session_token: Option<&str>) -> Result<()> {
        let mut url = Url::parse(&self.config.url)?;
        if let Some(token) = session_token {
            url.query_pairs_mut().append_pair("token", token);
        }

        info!(url = %self.config.url, "connecting to feed stream");
        let (ws_stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|err| QuantexError::Transport(err.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(64);
        self.correlator.attach(outbound_tx)?;

        let correlator = Arc::clone(&self.correlator);
        let dispatcher = self.dispatcher.clone();
        let event_tx = self.event_tx.clone();
        let cancel = self.cancel.clone();
        let keepalive = self.config.keepalive;

        tokio::spawn(async move {
            let mut keepalive = tokio::time::interval(keepalive);
            keepalive.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        let _ = write.send(WsMessage::Close(None)).await;
                        break;
                    }
                    _ = keepalive.tick() => {
                        let ping = ControlRequest::new(
                            correlator.next_id(),
                            ControlMethod::Ping,
                            vec![],
                        );
                        let Ok(json) = ping.to_json() else { continue };
                        if write.send(WsMessage::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    outbound = outbound_rx.recv() => match outbound {
                        Some(text) => {
                            if write.send(WsMessage::Text(text.into())).await.is_err() {
                                break;
                            }
                        }
                        None => {
                            let _ = write.send(WsMessage::Close(None)).await;
                            break;
                        }
                    },
                    incoming = read.next() => match incoming {
                        Some(Ok(WsMessage::Text(text))) => {
                            handle_frame(&dispatcher, &correlator, &event_tx, text.as_bytes())
                                .await;
                        }
                        Some(Ok(WsMessage::Binary(bytes))) => {
                            handle_frame(&dispatcher, &correlator, &event_tx, &bytes).await;
                        }
                        Some(Ok(WsMessage::Ping(payload))) => {
                            let _ = write.send(WsMessage::Pong(payload)).await;
                        }
                        Some(Ok(WsMessage::Pong(_))) => {}
                        Some(Ok(WsMessage::Close(_))) => {
                            info!("feed stream closed by venue");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(err)) => {
                            error!(error = %err, "feed stream read failed");
                            break;
                        }
                        None => break,
                    }
                }
            }

            correlator.detach();
        });

        Ok(())
    }

    pub async fn subscribe(&self, subs: Vec<Subscription>) -> Result<BatchOutcome> {
        self.correlator.subscribe(subs).await
    }

    pub async fn unsubscribe(&self, subs: Vec<Subscription>) -> Result<BatchOutcome> {
        self.correlator.unsubscribe(subs).await
    }

    /// Currently-active subscriptions
    pub fn active_subscriptions(&self) -> Vec<Subscription> {
        self.correlator.active()
    }

    /// Hard reset before a reconnect: every instrument drops back to
    /// Unsynced, all pending correlations fail, and the previously-active
    /// subscriptions are returned for re-issue from scratch.
    pub fn reset_for_reconnect(&self) -> Vec<Subscription> {
        self.books.reset();
        self.correlator.reset()
    }

    /// Stop the ingestion loop and abort in-flight subscription waits
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

async fn handle_frame(
    dispatcher: &Dispatcher,
    correlator: &SubscriptionCorrelator,
    event_tx: &mpsc::Sender<FeedEvent>,
    raw: &[u8],
) {
    match classify(raw) {
        RawFrame::Control(bytes) => match route_control(bytes) {
            Ok(ControlRoute::Ack(ack)) => {
                let id = ack.id;
                if !correlator.resolve_ack(ack) {
                    debug!(id, "acknowledgement without a pending request");
                }
            }
            Ok(ControlRoute::Unrouted) => {
                let _ = event_tx.send(unhandled_event("", bytes)).await;
            }
            Err(err) => log_decode_fail_once(&err, bytes),
        },
        RawFrame::Push(bytes) => match dispatcher.dispatch_frame(bytes) {
            Ok(events) => {
                for event in events {
                    if event_tx.send(event).await.is_err() {
                        return;
                    }
                }
            }
            Err(err) => log_decode_fail_once(&err, bytes),
        },
    }
}

fn log_decode_fail_once(err: &QuantexError, raw: &[u8]) {
    let count = DECODE_FAIL_LOG_COUNT.fetch_add(1, Ordering::Relaxed);
    if count < DECODE_FAIL_LOG_LIMIT {
        warn!(
            sample_index = count + 1,
            sample_limit = DECODE_FAIL_LOG_LIMIT,
            error = %err,
            bytes = raw.len(),
            "frame decode failed"
        );
        debug!(
            sample_index = count + 1,
            sample_limit = DECODE_FAIL_LOG_LIMIT,
            preview = %preview_for_log(raw, RAW_LOG_MAX_BYTES),
            "frame decode failed"
        );
    }
}

fn preview_for_log(raw: &[u8], max_len: usize) -> String {
    let text = String::from_utf8_lossy(&raw[..raw.len().min(max_len)]);
    if raw.len() > max_len {
        format!("{text}...")
    } else {
        text.into_owned()
    }
}
