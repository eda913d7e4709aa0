/*
[INPUT]:  Interleaved depth frames across instruments and channels
[OUTPUT]: Test results for snapshot-before-delta enforcement
[POS]:    Integration tests - order-book synchronization
[UPDATE]: When sync or dispatch semantics change
*/

mod common;

use std::sync::Arc;

use common::{book_ticker_frame, depth_frame, BookCall, RecordingStore};
use quantex_feed::dispatch::Dispatcher;
use quantex_feed::types::{FeedEventKind, InstrumentKey, Level};
use quantex_feed::{BookSynchronizer, QuantexError};
use rust_decimal_macros::dec;

fn setup() -> (Arc<RecordingStore>, Arc<BookSynchronizer>, Dispatcher) {
    let store = Arc::new(RecordingStore::default());
    let books = Arc::new(BookSynchronizer::new(store.clone()));
    let dispatcher = Dispatcher::new(books.clone());
    (store, books, dispatcher)
}

#[test]
fn test_first_frame_installs_snapshot_then_deltas() {
    let (store, _books, dispatcher) = setup();

    let first = depth_frame("BTC_USDT", &[(&[("100", "1")], &[("101", "2")])]);
    let events = dispatcher.dispatch_frame(&first).unwrap();
    match &events[0].kind {
        FeedEventKind::BookDelta(delta) => assert!(delta.is_snapshot),
        other => panic!("expected book delta, got {other:?}"),
    }

    let second = depth_frame("BTC_USDT", &[(&[("100", "0.5")], &[])]);
    let events = dispatcher.dispatch_frame(&second).unwrap();
    match &events[0].kind {
        FeedEventKind::BookDelta(delta) => assert!(!delta.is_snapshot),
        other => panic!("expected book delta, got {other:?}"),
    }

    let btc = InstrumentKey::new("BTC_USDT");
    assert_eq!(
        store.calls(),
        vec![
            BookCall::Snapshot {
                instrument: btc.clone(),
                bids: vec![Level::new(dec!(100), dec!(1))],
                asks: vec![Level::new(dec!(101), dec!(2))],
            },
            BookCall::Update {
                instrument: btc,
                bids: vec![Level::new(dec!(100), dec!(0.5))],
                asks: vec![],
            },
        ]
    );
}

#[test]
fn test_interleaved_instruments_sync_independently() {
    let (store, _books, dispatcher) = setup();

    for instrument in ["BTC_USDT", "ETH_USDT", "BTC_USDT", "ETH_USDT", "BTC_USDT"] {
        let frame = depth_frame(instrument, &[(&[("1", "1")], &[])]);
        dispatcher.dispatch_frame(&frame).unwrap();
    }

    let kinds: Vec<(bool, String)> = store
        .calls()
        .into_iter()
        .map(|call| match call {
            BookCall::Snapshot { instrument, .. } => (true, instrument.as_str().to_string()),
            BookCall::Update { instrument, .. } => (false, instrument.as_str().to_string()),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            (true, "BTC_USDT".to_string()),
            (true, "ETH_USDT".to_string()),
            (false, "BTC_USDT".to_string()),
            (false, "ETH_USDT".to_string()),
            (false, "BTC_USDT".to_string()),
        ]
    );
}

#[test]
fn test_book_ticker_and_depth_do_not_share_sync_state() {
    let (store, _books, dispatcher) = setup();

    let depth = depth_frame("BTC_USDT", &[(&[("100", "1")], &[("101", "2")])]);
    dispatcher.dispatch_frame(&depth).unwrap();

    // same instrument, different channel kind: still a snapshot
    let ticker = book_ticker_frame("BTC_USDT", ("100", "1"), ("101", "2"));
    dispatcher.dispatch_frame(&ticker).unwrap();

    let snapshots = store
        .calls()
        .iter()
        .filter(|call| matches!(call, BookCall::Snapshot { .. }))
        .count();
    assert_eq!(snapshots, 2);
}

#[test]
fn test_batched_updates_in_one_frame() {
    let (store, _books, dispatcher) = setup();

    let frame = depth_frame(
        "BTC_USDT",
        &[
            (&[("100", "1")], &[("101", "2")]),
            (&[("99", "4")], &[]),
        ],
    );
    let events = dispatcher.dispatch_frame(&frame).unwrap();
    assert_eq!(events.len(), 2);
    match (&events[0].kind, &events[1].kind) {
        (FeedEventKind::BookDelta(first), FeedEventKind::BookDelta(second)) => {
            assert!(first.is_snapshot);
            assert!(!second.is_snapshot);
        }
        other => panic!("expected two book deltas, got {other:?}"),
    }
    assert!(matches!(store.calls()[0], BookCall::Snapshot { .. }));
    assert!(matches!(store.calls()[1], BookCall::Update { .. }));
}

#[test]
fn test_malformed_frame_leaves_sync_state_unchanged() {
    let (store, _books, dispatcher) = setup();

    // bad numeric level: decode of the frame fails before any store call
    let bad = depth_frame("BTC_USDT", &[(&[("not-a-number", "1")], &[])]);
    assert!(matches!(
        dispatcher.dispatch_frame(&bad),
        Err(QuantexError::NumericField { .. })
    ));
    assert!(store.calls().is_empty());

    // instrument is still unsynced: the next good frame is the snapshot
    let good = depth_frame("BTC_USDT", &[(&[("100", "1")], &[])]);
    dispatcher.dispatch_frame(&good).unwrap();
    assert!(matches!(store.calls()[0], BookCall::Snapshot { .. }));
}

#[test]
fn test_truncated_frame_is_an_error_without_store_calls() {
    let (store, _books, dispatcher) = setup();

    let frame = depth_frame("BTC_USDT", &[(&[("100", "1")], &[])]);
    let result = dispatcher.dispatch_frame(&frame[..frame.len() - 2]);
    assert!(result.is_err());
    assert!(store.calls().is_empty());
}

#[test]
fn test_reset_returns_every_instrument_to_unsynced() {
    let (store, books, dispatcher) = setup();

    let frame = depth_frame("BTC_USDT", &[(&[("100", "1")], &[])]);
    dispatcher.dispatch_frame(&frame).unwrap();
    dispatcher.dispatch_frame(&frame).unwrap();

    books.reset();

    dispatcher.dispatch_frame(&frame).unwrap();
    let kinds: Vec<bool> = store
        .calls()
        .iter()
        .map(|call| matches!(call, BookCall::Snapshot { .. }))
        .collect();
    assert_eq!(kinds, vec![true, false, true]);
}
