//! Aggregated limit order book for a single instrument.
//!
//! The book keeps one aggregated quantity per price level and side. Prices
//! are snapped to the tick grid on entry and stored as integer tick indices,
//! so best-bid/best-ask lookups are ordered-map boundary reads and the
//! tick-alignment invariant holds by construction.
//!
//! Matching rules:
//! - Marketable limit orders execute immediately against the opposite side;
//!   any residual is discarded, never rested
//! - Pure market orders consume the opposite side best-first
//! - A best price only moves when its level is fully depleted

use std::collections::BTreeMap;

use crate::events::{Event, EventType, Side};

/// Fallback when the caller supplies a non-finite or non-positive tick.
const DEFAULT_TICK_SIZE: f64 = 0.1;

/// Snapshot of the best level on each side. Either side may be empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TopOfBook {
    pub best_bid_price: Option<f64>,
    pub best_bid_qty: Option<u32>,
    pub best_ask_price: Option<f64>,
    pub best_ask_qty: Option<u32>,
}

/// Top-of-book derived metrics; all present iff both sides are non-empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub mid: Option<f64>,
    pub spread: Option<f64>,
    pub imbalance_top1: Option<f64>,
}

/// Price-level aggregated order book.
#[derive(Debug, Clone)]
pub struct OrderBook {
    tick_size: f64,
    /// Best bid = highest key
    bids: BTreeMap<i64, u32>,
    /// Best ask = lowest key
    asks: BTreeMap<i64, u32>,
}

impl OrderBook {
    /// Create an empty book. A non-finite or non-positive `tick_size` is
    /// silently replaced by 0.1.
    pub fn new(tick_size: f64) -> Self {
        let tick_size = if tick_size.is_finite() && tick_size > 0.0 {
            tick_size
        } else {
            DEFAULT_TICK_SIZE
        };
        Self {
            tick_size,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    pub fn tick_size(&self) -> f64 {
        self.tick_size
    }

    /// Number of live bid levels.
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    /// Number of live ask levels.
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    fn to_ticks(&self, price: f64) -> i64 {
        (price / self.tick_size).round() as i64
    }

    fn to_price(&self, ticks: i64) -> f64 {
        ticks as f64 * self.tick_size
    }

    /// Apply one event atomically.
    ///
    /// Returns `false` (no state change) iff the event fails a precondition:
    /// non-finite time, zero quantity, or a non-finite/non-positive price on
    /// an Add/Cancel. Everything else reports `true`, including no-op
    /// cancels of absent levels and market orders against an empty side.
    pub fn apply(&mut self, e: &Event) -> bool {
        if !e.t.is_finite() || e.quantity == 0 {
            return false;
        }

        match e.kind {
            EventType::Add => {
                if !e.price.is_finite() || e.price <= 0.0 {
                    return false;
                }
                let px = self.to_ticks(e.price);

                match e.side {
                    Side::Bid => {
                        // Marketable limit buy: price >= best ask
                        let best_ask = self.asks.first_key_value().map(|(&p, _)| p);
                        if best_ask.is_some_and(|best| px >= best) {
                            consume_best_asks(&mut self.asks, e.quantity);
                            return true;
                        }
                        *self.bids.entry(px).or_insert(0) += e.quantity;
                    }
                    Side::Ask => {
                        // Marketable limit sell: price <= best bid
                        let best_bid = self.bids.last_key_value().map(|(&p, _)| p);
                        if best_bid.is_some_and(|best| px <= best) {
                            consume_best_bids(&mut self.bids, e.quantity);
                            return true;
                        }
                        *self.asks.entry(px).or_insert(0) += e.quantity;
                    }
                }
                true
            }

            EventType::Cancel => {
                if !e.price.is_finite() || e.price <= 0.0 {
                    return false;
                }
                let px = self.to_ticks(e.price);
                let side = match e.side {
                    Side::Bid => &mut self.bids,
                    Side::Ask => &mut self.asks,
                };
                // Saturating: over-cancel removes the level; absent level is
                // a no-op that still reports success
                if let Some(&resting) = side.get(&px) {
                    if resting > e.quantity {
                        side.insert(px, resting - e.quantity);
                    } else {
                        side.remove(&px);
                    }
                }
                true
            }

            EventType::Market => {
                match e.side {
                    // Market buy consumes asks, market sell consumes bids
                    Side::Bid => consume_best_asks(&mut self.asks, e.quantity),
                    Side::Ask => consume_best_bids(&mut self.bids, e.quantity),
                }
                true
            }
        }
    }

    /// Snapshot of the best level on each side.
    pub fn top(&self) -> TopOfBook {
        let mut tob = TopOfBook::default();
        if let Some((&px, &qty)) = self.bids.last_key_value() {
            tob.best_bid_price = Some(self.to_price(px));
            tob.best_bid_qty = Some(qty);
        }
        if let Some((&px, &qty)) = self.asks.first_key_value() {
            tob.best_ask_price = Some(self.to_price(px));
            tob.best_ask_qty = Some(qty);
        }
        tob
    }

    /// Mid, spread and top-level imbalance, derived from `top()`.
    pub fn metrics(&self) -> Metrics {
        let tob = self.top();
        let mut m = Metrics::default();

        if let (Some(bid), Some(ask)) = (tob.best_bid_price, tob.best_ask_price) {
            m.mid = Some(0.5 * (bid + ask));
            m.spread = Some(ask - bid);

            let qb = tob.best_bid_qty.unwrap_or(0) as f64;
            let qa = tob.best_ask_qty.unwrap_or(0) as f64;
            let denom = qb + qa;
            if denom > 0.0 {
                m.imbalance_top1 = Some((qb - qa) / denom);
            }
        }
        m
    }

    /// Total resting quantity on one side.
    pub fn depth(&self, side: Side) -> u64 {
        let levels = match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        };
        levels.values().map(|&q| q as u64).sum()
    }
}

fn consume_best_asks(asks: &mut BTreeMap<i64, u32>, mut qty: u32) {
    while qty > 0 {
        let Some((&px, &available)) = asks.first_key_value() else {
            break;
        };
        if available > qty {
            asks.insert(px, available - qty);
            qty = 0;
        } else {
            qty -= available;
            asks.remove(&px);
        }
    }
}

fn consume_best_bids(bids: &mut BTreeMap<i64, u32>, mut qty: u32) {
    while qty > 0 {
        let Some((&px, &available)) = bids.last_key_value() else {
            break;
        };
        if available > qty {
            bids.insert(px, available - qty);
            qty = 0;
        } else {
            qty -= available;
            bids.remove(&px);
        }
    }
}
