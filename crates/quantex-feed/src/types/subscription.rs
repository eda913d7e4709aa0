/*
[INPUT]:  Channel, asset and instrument selections from the caller
[OUTPUT]: Immutable subscription descriptors and instrument identifiers
[POS]:    Data layer - subscription model
[UPDATE]: When channel modifiers or instrument formatting change
*/

use std::fmt;

use serde::{Deserialize, Serialize};

use super::enums::{AssetClass, ChannelKind};
use crate::error::{QuantexError, Result};

/// Canonical identifier for a tradable pair, e.g. `BTC_USDT`.
///
/// The venue uses the same encoding on the wire; the `from_wire`/`to_wire`
/// pair is the seam where a real instrument directory would translate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstrumentKey(String);

impl InstrumentKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn from_wire(wire: &str) -> Self {
        Self(wire.to_string())
    }

    pub fn to_wire(&self) -> &str {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Update cadence / candle window modifier, e.g. `100ms` or `Min15`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Interval(String);

impl Interval {
    /// The `@` byte delimits topic fields and cannot appear in a modifier
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() || value.contains('@') {
            return Err(QuantexError::InvalidInterval(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One logical subscription: a channel kind on an asset class, covering a
/// set of instruments (empty for private channels).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subscription {
    pub channel: ChannelKind,
    pub asset: AssetClass,
    pub instruments: Vec<InstrumentKey>,
    pub interval: Option<Interval>,
    pub depth_levels: Option<u32>,
}

impl Subscription {
    pub fn new(channel: ChannelKind, asset: AssetClass, instruments: Vec<InstrumentKey>) -> Self {
        Self {
            channel,
            asset,
            instruments,
            interval: None,
            depth_levels: None,
        }
    }

    pub fn with_interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn with_depth_levels(mut self, levels: u32) -> Self {
        self.depth_levels = Some(levels);
        self
    }

    /// Private channels carry no instrument component and are subscribed
    /// once per asset class
    pub fn is_private(&self) -> bool {
        self.channel.is_private()
    }
}
