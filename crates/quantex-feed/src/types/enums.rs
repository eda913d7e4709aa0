/*
[INPUT]:  Venue schema definitions and numeric wire code tables
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - channel, asset and order code definitions
[UPDATE]: When the venue adds channels or changes code tables
*/

use serde::{Deserialize, Serialize};

/// Asset class served by a stream endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Spot,
    Futures,
}

impl AssetClass {
    pub fn as_wire(&self) -> &'static str {
        match self {
            AssetClass::Spot => "spot",
            AssetClass::Futures => "futures",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "spot" => Some(AssetClass::Spot),
            "futures" => Some(AssetClass::Futures),
            _ => None,
        }
    }
}

/// Logical stream type multiplexed over one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Ticker,
    BookTicker,
    Depth,
    Trades,
    Kline,
    LimitDepth,
    PrivateOrders,
    PrivateDeals,
    PrivateBalances,
}

impl ChannelKind {
    /// Private channels are subscribed once per asset class, not per instrument
    pub fn is_private(&self) -> bool {
        matches!(
            self,
            ChannelKind::PrivateOrders
                | ChannelKind::PrivateDeals
                | ChannelKind::PrivateBalances
        )
    }
}

/// Trade / order side.
///
/// Wire codes: 1 = buy, 2 = sell. Anything else is surfaced as
/// `Unknown(code)` so a bad code never masquerades as a real side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
    Unknown(i32),
}

impl Side {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Side::Buy,
            2 => Side::Sell,
            other => Side::Unknown(other),
        }
    }
}

/// Order type.
///
/// Wire codes: 1 = limit, 2 = post-only, 3 = immediate-or-cancel,
/// 4 = fill-or-kill, 5 = market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Limit,
    PostOnly,
    ImmediateOrCancel,
    FillOrKill,
    Market,
    Unknown(i32),
}

impl OrderType {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => OrderType::Limit,
            2 => OrderType::PostOnly,
            3 => OrderType::ImmediateOrCancel,
            4 => OrderType::FillOrKill,
            5 => OrderType::Market,
            other => OrderType::Unknown(other),
        }
    }
}

/// Order status.
///
/// Wire codes: 1 = new, 2 = filled, 3 = partially filled, 4 = canceled,
/// 5 = partially canceled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    New,
    Filled,
    PartiallyFilled,
    Canceled,
    PartiallyCanceled,
    Unknown(i32),
}

impl OrderStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => OrderStatus::New,
            2 => OrderStatus::Filled,
            3 => OrderStatus::PartiallyFilled,
            4 => OrderStatus::Canceled,
            5 => OrderStatus::PartiallyCanceled,
            other => OrderStatus::Unknown(other),
        }
    }
}
