//! State-dependent category weights.
//!
//! The feedback half of the hybrid loop: before every generated event the
//! simulator reads the top of book and turns it into a multiplicative weight
//! per Hawkes category. Wide spreads pull in liquidity provision, tight
//! spreads pull in aggressive taking, thick queues invite cancellations, and
//! top-level imbalance skews market-order pressure toward the heavy side.

use crate::events::NUM_CATEGORIES;
use crate::order_book::OrderBook;

/// Weight floor/ceiling; keeps one regime from starving the others.
const WEIGHT_MIN: f64 = 0.05;
const WEIGHT_MAX: f64 = 50.0;

/// Compute the per-category weights for the current book state.
///
/// Returns the neutral all-ones vector while either side is empty.
pub fn compute_weights(book: &OrderBook) -> [f64; NUM_CATEGORIES] {
    let mut w = [1.0; NUM_CATEGORIES];

    let tob = book.top();
    let (Some(bid), Some(ask)) = (tob.best_bid_price, tob.best_ask_price) else {
        return w;
    };

    let tick = book.tick_size();
    let spread_ticks = if tick > 0.0 { (ask - bid) / tick } else { 1.0 };

    let qb = tob.best_bid_qty.unwrap_or(0) as f64;
    let qa = tob.best_ask_qty.unwrap_or(0) as f64;
    let denom = qb + qa;
    let imbalance = if denom > 0.0 { (qb - qa) / denom } else { 0.0 };

    // Wide spread: more liquidity provision
    let wide = 1.0 + 0.8 * spread_ticks;
    // Tight spread: more aggressive taking
    let tight = 1.0 + 2.5 / (1.0 + spread_ticks);

    w[0] = wide; // Bid Add
    w[1] = wide; // Ask Add
    w[2] = 1.0 + 0.01 * qb; // Bid Cancel
    w[3] = 1.0 + 0.01 * qa; // Ask Cancel
    w[4] = tight * (1.0 + 1.5 * imbalance.max(0.0)); // Market Buy
    w[5] = tight * (1.0 + 1.5 * (-imbalance).max(0.0)); // Market Sell

    for x in &mut w {
        if !x.is_finite() || *x < WEIGHT_MIN {
            *x = WEIGHT_MIN;
        } else if *x > WEIGHT_MAX {
            *x = WEIGHT_MAX;
        }
    }
    w
}
