/*
[INPUT]:  Test scenarios needing a book store and wire frames
[OUTPUT]: Shared fixtures: recording store, envelope builders
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

use parking_lot::Mutex;
use prost::Message;
use quantex_feed::types::{AssetClass, InstrumentKey, Level};
use quantex_feed::wire::push::{
    push_envelope::Body, PushEnvelope, WireBookTicker, WireDepthBatch, WireDepthUpdate, WireLevel,
};
use quantex_feed::{BookStore, Result};

/// One call the synchronizer issued against the store, in order
#[derive(Debug, Clone, PartialEq)]
pub enum BookCall {
    Snapshot {
        instrument: InstrumentKey,
        bids: Vec<Level>,
        asks: Vec<Level>,
    },
    Update {
        instrument: InstrumentKey,
        bids: Vec<Level>,
        asks: Vec<Level>,
    },
}

/// Book store that records every call for sequence assertions
#[derive(Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<BookCall>>,
}

impl RecordingStore {
    pub fn calls(&self) -> Vec<BookCall> {
        self.calls.lock().clone()
    }
}

impl BookStore for RecordingStore {
    fn load_snapshot(
        &self,
        instrument: &InstrumentKey,
        _asset: AssetClass,
        bids: &[Level],
        asks: &[Level],
    ) -> Result<()> {
        self.calls.lock().push(BookCall::Snapshot {
            instrument: instrument.clone(),
            bids: bids.to_vec(),
            asks: asks.to_vec(),
        });
        Ok(())
    }

    fn update(
        &self,
        instrument: &InstrumentKey,
        _asset: AssetClass,
        bids: &[Level],
        asks: &[Level],
    ) -> Result<()> {
        self.calls.lock().push(BookCall::Update {
            instrument: instrument.clone(),
            bids: bids.to_vec(),
            asks: asks.to_vec(),
        });
        Ok(())
    }
}

pub fn wire_levels(levels: &[(&str, &str)]) -> Vec<WireLevel> {
    levels
        .iter()
        .map(|(price, qty)| WireLevel {
            price: price.to_string(),
            qty: qty.to_string(),
        })
        .collect()
}

/// Encoded depth frame carrying one or more book updates
pub fn depth_frame(instrument: &str, updates: &[(&[(&str, &str)], &[(&str, &str)])]) -> Vec<u8> {
    let items = updates
        .iter()
        .map(|(bids, asks)| WireDepthUpdate {
            bids: wire_levels(bids),
            asks: wire_levels(asks),
            version: String::new(),
        })
        .collect();
    PushEnvelope {
        topic: format!("spot@depth@100ms@{instrument}"),
        instrument: instrument.to_string(),
        send_time_ms: 1_700_000_000_000,
        body: Some(Body::Depth(WireDepthBatch { items })),
    }
    .encode_to_vec()
}

/// Encoded best-bid/ask frame
pub fn book_ticker_frame(instrument: &str, bid: (&str, &str), ask: (&str, &str)) -> Vec<u8> {
    PushEnvelope {
        topic: format!("spot@bookticker@100ms@{instrument}"),
        instrument: instrument.to_string(),
        send_time_ms: 1_700_000_000_000,
        body: Some(Body::BookTicker(WireBookTicker {
            bid_price: bid.0.to_string(),
            bid_qty: bid.1.to_string(),
            ask_price: ask.0.to_string(),
            ask_qty: ask.1.to_string(),
        })),
    }
    .encode_to_vec()
}
