/*
[INPUT]:  Normalized channel payloads from the dispatcher
[OUTPUT]: Canonical typed feed events for downstream consumers
[POS]:    Data layer - output event model
[UPDATE]: When adding channels or changing event payloads
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use super::enums::{AssetClass, OrderStatus, OrderType, Side};
use super::subscription::{Interval, InstrumentKey};

/// Venue name carried on every event
pub const VENUE: &str = "quantex";

/// One normalized event from the live stream
#[derive(Debug, Clone, Serialize)]
pub struct FeedEvent {
    pub venue: &'static str,
    pub asset: AssetClass,
    pub instrument: InstrumentKey,
    pub exchange_time: DateTime<Utc>,
    pub kind: FeedEventKind,
}

/// Tagged union over the channel-specific payloads
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedEventKind {
    Ticker(Ticker),
    Trades(Vec<Trade>),
    Kline(Kline),
    BookDelta(BookDelta),
    Order(OrderUpdate),
    Balance(BalanceUpdate),
    /// Accepted but unrecognized frame, forwarded instead of dropped
    Unhandled(UnhandledFrame),
}

/// Best bid/ask snapshot with last traded price
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticker {
    pub last_price: Decimal,
    pub bid_price: Decimal,
    pub bid_size: Decimal,
    pub ask_price: Decimal,
    pub ask_size: Decimal,
    pub volume: Decimal,
}

/// One executed trade (public aggregate or private fill)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub price: Decimal,
    pub amount: Decimal,
    pub side: Side,
    pub time: DateTime<Utc>,
}

/// One candle for a tagged interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kline {
    pub interval: Interval,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub start_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
}

/// One price level as (price, size)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Level {
    pub price: Decimal,
    pub size: Decimal,
}

impl Level {
    pub fn new(price: Decimal, size: Decimal) -> Self {
        Self { price, size }
    }
}

/// Order book change already applied to the external store.
///
/// `is_snapshot` is true only for the first frame observed for the
/// `(channel, instrument)` key since the last reconnect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookDelta {
    pub bids: Vec<Level>,
    pub asks: Vec<Level>,
    pub is_snapshot: bool,
}

/// Private order state change
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderUpdate {
    pub order_id: String,
    pub client_order_id: Option<String>,
    pub side: Side,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub price: Decimal,
    pub quantity: Decimal,
    pub filled_quantity: Decimal,
}

/// Private balance change. `free` is always derived as `total - hold`,
/// never read from the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceUpdate {
    pub currency: String,
    pub total: Decimal,
    pub hold: Decimal,
    pub free: Decimal,
}

/// Raw frame the dispatcher could not route
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnhandledFrame {
    pub topic: String,
    pub raw: Vec<u8>,
}
