/*
[INPUT]:  Classified push frames with their recovered topic
[OUTPUT]: Canonical typed feed events (book frames applied to the store)
[POS]:    Ingestion layer - channel routing and payload normalization
[UPDATE]: When adding channels or changing normalization rules
*/

use std::sync::Arc;

use chrono::{DateTime, Utc};
use prost::Message;
use rust_decimal::Decimal;

use crate::error::{QuantexError, Result};
use crate::sync::BookSynchronizer;
use crate::topic::{self, ParsedTopic};
use crate::types::{
    AssetClass, BalanceUpdate, BookDelta, ChannelKind, FeedEvent, FeedEventKind, InstrumentKey,
    Interval, Kline, Level, OrderStatus, OrderType, OrderUpdate, Side, Ticker, Trade,
    UnhandledFrame, VENUE,
};
use crate::wire::frame::peek_topic;
use crate::wire::push::{push_envelope::Body, PushEnvelope, WireLevel};

/// Routes decoded push frames to the matching normalizer.
///
/// Normalizers are pure; the only shared state touched on this path is the
/// sync registry inside the book synchronizer.
#[derive(Clone)]
pub struct Dispatcher {
    books: Arc<BookSynchronizer>,
}

impl Dispatcher {
    pub fn new(books: Arc<BookSynchronizer>) -> Self {
        Self { books }
    }

    /// Decode and dispatch one raw push frame.
    ///
    /// The topic is peeked from the envelope head first, so frames for
    /// unrecognized channels are forwarded as unhandled warnings without
    /// paying for the structured decode. Decode errors are scoped to this
    /// frame and leave sync state untouched.
    pub fn dispatch_frame(&self, raw: &[u8]) -> Result<Vec<FeedEvent>> {
        let Some(topic_str) = peek_topic(raw) else {
            return Err(QuantexError::PushDecode(prost::DecodeError::new(
                "push frame missing leading topic field",
            )));
        };
        match topic::parse(topic_str) {
            Ok(parsed) => {
                let envelope = PushEnvelope::decode(raw)?;
                self.dispatch(&parsed, &envelope)
            }
            Err(QuantexError::UnknownTopic(unknown)) => {
                Ok(vec![unhandled_event(&unknown, raw)])
            }
            Err(err) => Err(err),
        }
    }

    /// Route one decoded envelope by channel kind
    pub fn dispatch(&self, parsed: &ParsedTopic, envelope: &PushEnvelope) -> Result<Vec<FeedEvent>> {
        let time = exchange_time(envelope.send_time_ms)?;
        let instrument = parsed
            .instrument
            .clone()
            .unwrap_or_else(|| InstrumentKey::from_wire(&envelope.instrument));
        let meta = EventMeta {
            asset: parsed.asset,
            instrument,
            time,
        };

        match (parsed.channel, envelope.body.as_ref()) {
            (ChannelKind::Ticker, Some(Body::Ticker(ticker))) => {
                Ok(vec![meta.event(FeedEventKind::Ticker(normalize_ticker(ticker)?))])
            }
            (ChannelKind::BookTicker, Some(Body::BookTicker(book))) => {
                let bids = vec![level("bid_price", &book.bid_price, "bid_qty", &book.bid_qty)?];
                let asks = vec![level("ask_price", &book.ask_price, "ask_qty", &book.ask_qty)?];
                let is_snapshot = self.books.apply(
                    ChannelKind::BookTicker,
                    &meta.instrument,
                    meta.asset,
                    &bids,
                    &asks,
                )?;
                Ok(vec![meta.event(FeedEventKind::BookDelta(BookDelta {
                    bids,
                    asks,
                    is_snapshot,
                }))])
            }
            (ChannelKind::Depth, Some(Body::Depth(batch))) => {
                // Decode every entry before the first store call, so a bad
                // entry cannot leave a half-applied frame behind.
                let mut updates = Vec::with_capacity(batch.items.len());
                for item in &batch.items {
                    updates.push((levels(&item.bids)?, levels(&item.asks)?));
                }
                let mut events = Vec::with_capacity(updates.len());
                for (bids, asks) in updates {
                    let is_snapshot = self.books.apply(
                        ChannelKind::Depth,
                        &meta.instrument,
                        meta.asset,
                        &bids,
                        &asks,
                    )?;
                    events.push(meta.event(FeedEventKind::BookDelta(BookDelta {
                        bids,
                        asks,
                        is_snapshot,
                    })));
                }
                Ok(events)
            }
            (ChannelKind::LimitDepth, Some(Body::LimitDepth(depth))) => {
                let bids = levels(&depth.bids)?;
                let asks = levels(&depth.asks)?;
                let is_snapshot = self.books.apply(
                    ChannelKind::LimitDepth,
                    &meta.instrument,
                    meta.asset,
                    &bids,
                    &asks,
                )?;
                Ok(vec![meta.event(FeedEventKind::BookDelta(BookDelta {
                    bids,
                    asks,
                    is_snapshot,
                }))])
            }
            (ChannelKind::Trades, Some(Body::Deals(deals))) => {
                let trades = deals
                    .deals
                    .iter()
                    .map(|deal| {
                        Ok(Trade {
                            price: parse_decimal("price", &deal.price)?,
                            amount: parse_decimal("qty", &deal.qty)?,
                            side: Side::from_code(deal.trade_type),
                            time: exchange_time(deal.time_ms)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(vec![meta.event(FeedEventKind::Trades(trades))])
            }
            (ChannelKind::Kline, Some(Body::Kline(kline))) => {
                Ok(vec![meta.event(FeedEventKind::Kline(normalize_kline(kline)?))])
            }
            (ChannelKind::PrivateOrders, Some(Body::Order(order))) => {
                let update = OrderUpdate {
                    order_id: order.order_id.clone(),
                    client_order_id: if order.client_order_id.is_empty() {
                        None
                    } else {
                        Some(order.client_order_id.clone())
                    },
                    side: Side::from_code(order.side),
                    order_type: OrderType::from_code(order.order_type),
                    status: OrderStatus::from_code(order.status),
                    price: parse_decimal("price", &order.price)?,
                    quantity: parse_decimal("qty", &order.qty)?,
                    filled_quantity: parse_decimal("filled_qty", &order.filled_qty)?,
                };
                Ok(vec![meta.event(FeedEventKind::Order(update))])
            }
            (ChannelKind::PrivateBalances, Some(Body::Balance(balance))) => {
                let total = parse_decimal("balance", &balance.balance)?;
                let hold = parse_decimal("frozen", &balance.frozen)?;
                let update = BalanceUpdate {
                    currency: balance.currency.clone(),
                    total,
                    hold,
                    // free is always derived, never read from the wire
                    free: total - hold,
                };
                let meta = EventMeta {
                    instrument: InstrumentKey::new(balance.currency.clone()),
                    ..meta
                };
                Ok(vec![meta.event(FeedEventKind::Balance(update))])
            }
            (ChannelKind::PrivateDeals, Some(Body::PrivateDeal(deal))) => {
                let trade = Trade {
                    price: parse_decimal("price", &deal.price)?,
                    amount: parse_decimal("qty", &deal.qty)?,
                    side: Side::from_code(deal.side),
                    time: exchange_time(deal.time_ms)?,
                };
                Ok(vec![meta.event(FeedEventKind::Trades(vec![trade]))])
            }
            _ => Err(QuantexError::MissingBody(envelope.topic.clone())),
        }
    }
}

struct EventMeta {
    asset: AssetClass,
    instrument: InstrumentKey,
    time: DateTime<Utc>,
}

impl EventMeta {
    fn event(&self, kind: FeedEventKind) -> FeedEvent {
        FeedEvent {
            venue: VENUE,
            asset: self.asset,
            instrument: self.instrument.clone(),
            exchange_time: self.time,
            kind,
        }
    }
}

pub(crate) fn unhandled_event(topic: &str, raw: &[u8]) -> FeedEvent {
    let asset = topic
        .split('@')
        .next()
        .and_then(AssetClass::from_wire)
        .unwrap_or(AssetClass::Spot);
    FeedEvent {
        venue: VENUE,
        asset,
        instrument: InstrumentKey::new(""),
        exchange_time: Utc::now(),
        kind: FeedEventKind::Unhandled(UnhandledFrame {
            topic: topic.to_string(),
            raw: raw.to_vec(),
        }),
    }
}

fn exchange_time(epoch_ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(epoch_ms).ok_or(QuantexError::NumericField {
        field: "send_time_ms",
        value: epoch_ms.to_string(),
    })
}

fn parse_decimal(field: &'static str, value: &str) -> Result<Decimal> {
    value
        .trim()
        .parse::<Decimal>()
        .map_err(|_| QuantexError::NumericField {
            field,
            value: value.to_string(),
        })
}

fn level(
    price_field: &'static str,
    price: &str,
    qty_field: &'static str,
    qty: &str,
) -> Result<Level> {
    Ok(Level::new(
        parse_decimal(price_field, price)?,
        parse_decimal(qty_field, qty)?,
    ))
}

fn levels(wire: &[WireLevel]) -> Result<Vec<Level>> {
    wire.iter()
        .map(|entry| level("price", &entry.price, "qty", &entry.qty))
        .collect()
}

fn normalize_ticker(wire: &crate::wire::push::WireTicker) -> Result<Ticker> {
    Ok(Ticker {
        last_price: parse_decimal("last_price", &wire.last_price)?,
        bid_price: parse_decimal("bid_price", &wire.bid_price)?,
        bid_size: parse_decimal("bid_qty", &wire.bid_qty)?,
        ask_price: parse_decimal("ask_price", &wire.ask_price)?,
        ask_size: parse_decimal("ask_qty", &wire.ask_qty)?,
        volume: parse_decimal("volume", &wire.volume)?,
    })
}

fn normalize_kline(wire: &crate::wire::push::WireKline) -> Result<Kline> {
    let start_time =
        DateTime::from_timestamp(wire.window_start, 0).ok_or(QuantexError::NumericField {
            field: "window_start",
            value: wire.window_start.to_string(),
        })?;
    let close_time =
        DateTime::from_timestamp(wire.window_end, 0).ok_or(QuantexError::NumericField {
            field: "window_end",
            value: wire.window_end.to_string(),
        })?;
    Ok(Kline {
        interval: Interval::new(wire.interval.clone()).map_err(|_| {
            QuantexError::NumericField {
                field: "interval",
                value: wire.interval.clone(),
            }
        })?,
        open: parse_decimal("open", &wire.open)?,
        high: parse_decimal("high", &wire.high)?,
        low: parse_decimal("low", &wire.low)?,
        close: parse_decimal("close", &wire.close)?,
        volume: parse_decimal("volume", &wire.volume)?,
        start_time,
        close_time,
    })
}
