/*
[INPUT]:  Binary push frames from the market stream
[OUTPUT]: Decoded self-describing envelopes with one payload variant
[POS]:    Wire layer - binary push-data codec
[UPDATE]: When the venue adds payload variants or renumbers fields
*/

/// Self-describing envelope for every binary push frame. The topic string
/// sits in field 1 so routing can peek at it before the full decode.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PushEnvelope {
    #[prost(string, tag = "1")]
    pub topic: String,
    #[prost(string, tag = "2")]
    pub instrument: String,
    /// Venue send time, epoch milliseconds
    #[prost(int64, tag = "3")]
    pub send_time_ms: i64,
    #[prost(
        oneof = "push_envelope::Body",
        tags = "10, 11, 12, 13, 14, 15, 16, 17, 18"
    )]
    pub body: Option<push_envelope::Body>,
}

pub mod push_envelope {
    /// Exactly one populated payload variant, selected by channel kind
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Body {
        #[prost(message, tag = "10")]
        Ticker(super::WireTicker),
        #[prost(message, tag = "11")]
        BookTicker(super::WireBookTicker),
        #[prost(message, tag = "12")]
        Depth(super::WireDepthBatch),
        #[prost(message, tag = "13")]
        LimitDepth(super::WireLimitDepth),
        #[prost(message, tag = "14")]
        Deals(super::WireDeals),
        #[prost(message, tag = "15")]
        Kline(super::WireKline),
        #[prost(message, tag = "16")]
        Order(super::WireOrder),
        #[prost(message, tag = "17")]
        Balance(super::WireBalance),
        #[prost(message, tag = "18")]
        PrivateDeal(super::WirePrivateDeal),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireTicker {
    #[prost(string, tag = "1")]
    pub last_price: String,
    #[prost(string, tag = "2")]
    pub bid_price: String,
    #[prost(string, tag = "3")]
    pub bid_qty: String,
    #[prost(string, tag = "4")]
    pub ask_price: String,
    #[prost(string, tag = "5")]
    pub ask_qty: String,
    #[prost(string, tag = "6")]
    pub volume: String,
}

/// Single best level per side
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireBookTicker {
    #[prost(string, tag = "1")]
    pub bid_price: String,
    #[prost(string, tag = "2")]
    pub bid_qty: String,
    #[prost(string, tag = "3")]
    pub ask_price: String,
    #[prost(string, tag = "4")]
    pub ask_qty: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireLevel {
    #[prost(string, tag = "1")]
    pub price: String,
    #[prost(string, tag = "2")]
    pub qty: String,
}

/// One incremental (or initial) book change
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireDepthUpdate {
    #[prost(message, repeated, tag = "1")]
    pub bids: Vec<WireLevel>,
    #[prost(message, repeated, tag = "2")]
    pub asks: Vec<WireLevel>,
    #[prost(string, tag = "3")]
    pub version: String,
}

/// Aggregated depth frames may batch several book updates
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireDepthBatch {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<WireDepthUpdate>,
}

/// Fixed-level depth view (top N per side)
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireLimitDepth {
    #[prost(message, repeated, tag = "1")]
    pub bids: Vec<WireLevel>,
    #[prost(message, repeated, tag = "2")]
    pub asks: Vec<WireLevel>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireDeal {
    #[prost(string, tag = "1")]
    pub price: String,
    #[prost(string, tag = "2")]
    pub qty: String,
    /// 1 = buy, 2 = sell
    #[prost(int32, tag = "3")]
    pub trade_type: i32,
    #[prost(int64, tag = "4")]
    pub time_ms: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireDeals {
    #[prost(message, repeated, tag = "1")]
    pub deals: Vec<WireDeal>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireKline {
    #[prost(string, tag = "1")]
    pub interval: String,
    #[prost(string, tag = "2")]
    pub open: String,
    #[prost(string, tag = "3")]
    pub high: String,
    #[prost(string, tag = "4")]
    pub low: String,
    #[prost(string, tag = "5")]
    pub close: String,
    #[prost(string, tag = "6")]
    pub volume: String,
    /// Window bounds, epoch seconds
    #[prost(int64, tag = "7")]
    pub window_start: i64,
    #[prost(int64, tag = "8")]
    pub window_end: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireOrder {
    #[prost(string, tag = "1")]
    pub order_id: String,
    #[prost(string, tag = "2")]
    pub client_order_id: String,
    #[prost(string, tag = "3")]
    pub price: String,
    #[prost(string, tag = "4")]
    pub qty: String,
    #[prost(string, tag = "5")]
    pub filled_qty: String,
    #[prost(int32, tag = "6")]
    pub side: i32,
    #[prost(int32, tag = "7")]
    pub order_type: i32,
    #[prost(int32, tag = "8")]
    pub status: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WireBalance {
    #[prost(string, tag = "1")]
    pub currency: String,
    #[prost(string, tag = "2")]
    pub balance: String,
    #[prost(string, tag = "3")]
    pub frozen: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WirePrivateDeal {
    #[prost(string, tag = "1")]
    pub price: String,
    #[prost(string, tag = "2")]
    pub qty: String,
    /// 1 = buy, 2 = sell
    #[prost(int32, tag = "3")]
    pub side: i32,
    #[prost(int64, tag = "4")]
    pub time_ms: i64,
    #[prost(string, tag = "5")]
    pub order_id: String,
}
