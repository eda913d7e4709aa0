/*
[INPUT]:  Subscription descriptors and inbound topic strings
[OUTPUT]: Wire topic strings and parsed (channel, instrument) pairs
[POS]:    Wire layer - topic string mapping, table-driven both ways
[UPDATE]: When the venue adds channels or reorders topic fields
*/

use crate::error::{QuantexError, Result};
use crate::types::{AssetClass, ChannelKind, InstrumentKey, Subscription};

/// Default update cadence when a subscription does not pick one
pub const DEFAULT_INTERVAL: &str = "100ms";
/// Default level count for the fixed-depth channel
pub const DEFAULT_DEPTH_LEVELS: u32 = 5;

/// Field order after the `{asset}@{channel}` prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TopicLayout {
    /// `{asset}@{channel}@{modifier}@{instrument}`
    ModifierThenInstrument,
    /// `{asset}@{channel}@{instrument}@{modifier}`
    InstrumentThenModifier,
    /// `{asset}@{channel}` - private channels carry no instrument
    ChannelOnly,
}

struct TopicShape {
    channel: ChannelKind,
    wire_name: &'static str,
    layout: TopicLayout,
}

/// One row per channel kind; format and parse both walk this table so the
/// two directions cannot drift apart. Row order mirrors `shape_for`.
const SHAPES: [TopicShape; 9] = [
    TopicShape {
        channel: ChannelKind::Ticker,
        wire_name: "ticker",
        layout: TopicLayout::ModifierThenInstrument,
    },
    TopicShape {
        channel: ChannelKind::BookTicker,
        wire_name: "bookticker",
        layout: TopicLayout::ModifierThenInstrument,
    },
    TopicShape {
        channel: ChannelKind::Depth,
        wire_name: "depth",
        layout: TopicLayout::ModifierThenInstrument,
    },
    TopicShape {
        channel: ChannelKind::Trades,
        wire_name: "deals",
        layout: TopicLayout::ModifierThenInstrument,
    },
    TopicShape {
        channel: ChannelKind::Kline,
        wire_name: "kline",
        layout: TopicLayout::InstrumentThenModifier,
    },
    TopicShape {
        channel: ChannelKind::LimitDepth,
        wire_name: "depth.limit",
        layout: TopicLayout::InstrumentThenModifier,
    },
    TopicShape {
        channel: ChannelKind::PrivateOrders,
        wire_name: "private.orders",
        layout: TopicLayout::ChannelOnly,
    },
    TopicShape {
        channel: ChannelKind::PrivateDeals,
        wire_name: "private.deals",
        layout: TopicLayout::ChannelOnly,
    },
    TopicShape {
        channel: ChannelKind::PrivateBalances,
        wire_name: "private.balance",
        layout: TopicLayout::ChannelOnly,
    },
];

fn shape_for(channel: ChannelKind) -> &'static TopicShape {
    match channel {
        ChannelKind::Ticker => &SHAPES[0],
        ChannelKind::BookTicker => &SHAPES[1],
        ChannelKind::Depth => &SHAPES[2],
        ChannelKind::Trades => &SHAPES[3],
        ChannelKind::Kline => &SHAPES[4],
        ChannelKind::LimitDepth => &SHAPES[5],
        ChannelKind::PrivateOrders => &SHAPES[6],
        ChannelKind::PrivateDeals => &SHAPES[7],
        ChannelKind::PrivateBalances => &SHAPES[8],
    }
}

fn shape_by_wire_name(name: &str) -> Option<&'static TopicShape> {
    SHAPES.iter().find(|shape| shape.wire_name == name)
}

/// Inbound topic, decomposed
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTopic {
    pub asset: AssetClass,
    pub channel: ChannelKind,
    pub instrument: Option<InstrumentKey>,
    pub modifier: Option<String>,
}

/// Encode one topic string for a subscription fragment covering exactly
/// one instrument (`None` for private channels).
///
/// Fails before anything is sent when the asset class is not served on
/// this stream.
pub fn format(sub: &Subscription, instrument: Option<&InstrumentKey>) -> Result<String> {
    if sub.asset != AssetClass::Spot {
        return Err(QuantexError::UnsupportedAsset {
            asset: sub.asset,
            channel: sub.channel,
        });
    }
    let shape = shape_for(sub.channel);
    let prefix = sub.asset.as_wire();
    match shape.layout {
        TopicLayout::ChannelOnly => Ok(format!("{prefix}@{}", shape.wire_name)),
        layout => {
            let instrument = instrument.ok_or(QuantexError::InvalidSubscription {
                channel: sub.channel,
                reason: "channel requires an instrument",
            })?;
            let modifier = modifier_for(sub)?;
            match layout {
                TopicLayout::ModifierThenInstrument => Ok(format!(
                    "{prefix}@{}@{modifier}@{instrument}",
                    shape.wire_name
                )),
                TopicLayout::InstrumentThenModifier => Ok(format!(
                    "{prefix}@{}@{instrument}@{modifier}",
                    shape.wire_name
                )),
                TopicLayout::ChannelOnly => unreachable!(),
            }
        }
    }
}

fn modifier_for(sub: &Subscription) -> Result<String> {
    match sub.channel {
        ChannelKind::LimitDepth => Ok(sub
            .depth_levels
            .unwrap_or(DEFAULT_DEPTH_LEVELS)
            .to_string()),
        ChannelKind::Kline => sub
            .interval
            .as_ref()
            .map(|interval| interval.as_str().to_string())
            .ok_or(QuantexError::InvalidSubscription {
                channel: sub.channel,
                reason: "kline requires an interval",
            }),
        _ => Ok(sub
            .interval
            .as_ref()
            .map(|interval| interval.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_INTERVAL.to_string())),
    }
}

/// Decode an inbound topic back to `(channel kind, instrument)`
pub fn parse(topic: &str) -> Result<ParsedTopic> {
    let parts: Vec<&str> = topic.split('@').collect();
    if parts.len() < 2 {
        return Err(QuantexError::UnknownTopic(topic.to_string()));
    }
    let asset = AssetClass::from_wire(parts[0])
        .ok_or_else(|| QuantexError::UnknownTopic(topic.to_string()))?;
    let shape = shape_by_wire_name(parts[1])
        .ok_or_else(|| QuantexError::UnknownTopic(topic.to_string()))?;

    let (instrument, modifier) = match shape.layout {
        TopicLayout::ChannelOnly => {
            if parts.len() != 2 {
                return Err(QuantexError::UnknownTopic(topic.to_string()));
            }
            (None, None)
        }
        TopicLayout::ModifierThenInstrument => {
            if parts.len() != 4 {
                return Err(QuantexError::UnknownTopic(topic.to_string()));
            }
            (
                Some(InstrumentKey::from_wire(parts[3])),
                Some(parts[2].to_string()),
            )
        }
        TopicLayout::InstrumentThenModifier => {
            if parts.len() != 4 {
                return Err(QuantexError::UnknownTopic(topic.to_string()));
            }
            (
                Some(InstrumentKey::from_wire(parts[2])),
                Some(parts[3].to_string()),
            )
        }
    };

    Ok(ParsedTopic {
        asset,
        channel: shape.channel,
        instrument,
        modifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Interval;
    use rstest::rstest;

    fn btc() -> InstrumentKey {
        InstrumentKey::new("BTC_USDT")
    }

    #[rstest]
    #[case(ChannelKind::Ticker, "spot@ticker@100ms@BTC_USDT")]
    #[case(ChannelKind::BookTicker, "spot@bookticker@100ms@BTC_USDT")]
    #[case(ChannelKind::Depth, "spot@depth@100ms@BTC_USDT")]
    #[case(ChannelKind::Trades, "spot@deals@100ms@BTC_USDT")]
    fn test_modifier_first_channels(#[case] channel: ChannelKind, #[case] expected: &str) {
        let sub = Subscription::new(channel, AssetClass::Spot, vec![btc()]);
        assert_eq!(format(&sub, Some(&btc())).unwrap(), expected);
    }

    #[test]
    fn test_kline_places_instrument_before_interval() {
        let sub = Subscription::new(ChannelKind::Kline, AssetClass::Spot, vec![btc()])
            .with_interval(Interval::new("Min15").unwrap());
        assert_eq!(
            format(&sub, Some(&btc())).unwrap(),
            "spot@kline@BTC_USDT@Min15"
        );
    }

    #[test]
    fn test_limit_depth_places_level_count_last() {
        let sub = Subscription::new(ChannelKind::LimitDepth, AssetClass::Spot, vec![btc()])
            .with_depth_levels(20);
        assert_eq!(
            format(&sub, Some(&btc())).unwrap(),
            "spot@depth.limit@BTC_USDT@20"
        );
    }

    #[test]
    fn test_private_channels_have_no_instrument() {
        let sub = Subscription::new(ChannelKind::PrivateOrders, AssetClass::Spot, vec![]);
        assert_eq!(format(&sub, None).unwrap(), "spot@private.orders");
    }

    #[test]
    fn test_unsupported_asset_fails_fast() {
        let sub = Subscription::new(ChannelKind::Ticker, AssetClass::Futures, vec![btc()]);
        assert!(matches!(
            format(&sub, Some(&btc())),
            Err(QuantexError::UnsupportedAsset { .. })
        ));
    }

    #[rstest]
    #[case(ChannelKind::Ticker)]
    #[case(ChannelKind::BookTicker)]
    #[case(ChannelKind::Depth)]
    #[case(ChannelKind::Trades)]
    #[case(ChannelKind::Kline)]
    #[case(ChannelKind::LimitDepth)]
    fn test_format_parse_round_trip(#[case] channel: ChannelKind) {
        let sub = Subscription::new(channel, AssetClass::Spot, vec![btc()])
            .with_interval(Interval::new("Min1").unwrap())
            .with_depth_levels(10);
        let topic = format(&sub, Some(&btc())).unwrap();
        let parsed = parse(&topic).unwrap();
        assert_eq!(parsed.channel, channel);
        assert_eq!(parsed.instrument, Some(btc()));
        assert_eq!(parsed.asset, AssetClass::Spot);
    }

    #[rstest]
    #[case(ChannelKind::PrivateOrders)]
    #[case(ChannelKind::PrivateDeals)]
    #[case(ChannelKind::PrivateBalances)]
    fn test_private_round_trip(#[case] channel: ChannelKind) {
        let sub = Subscription::new(channel, AssetClass::Spot, vec![]);
        let topic = format(&sub, None).unwrap();
        let parsed = parse(&topic).unwrap();
        assert_eq!(parsed.channel, channel);
        assert_eq!(parsed.instrument, None);
    }

    #[test]
    fn test_shape_lookup_matches_table_rows() {
        for shape in &SHAPES {
            assert_eq!(shape_for(shape.channel).channel, shape.channel);
        }
    }

    #[rstest]
    #[case("")]
    #[case("spot")]
    #[case("margin@ticker@100ms@BTC_USDT")]
    #[case("spot@unknown@100ms@BTC_USDT")]
    #[case("spot@ticker@100ms")]
    #[case("spot@private.orders@BTC_USDT")]
    fn test_parse_rejects_malformed_topics(#[case] topic: &str) {
        assert!(matches!(
            parse(topic),
            Err(QuantexError::UnknownTopic(_))
        ));
    }
}
