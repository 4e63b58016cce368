use serde::{Deserialize, Serialize};

/// Number of event categories / Hawkes dimensions.
pub const NUM_CATEGORIES: usize = 6;

/// Which side of the book an event originates from.
///
/// For `Market` events this is the aggressor side: a `Bid` market order is a
/// buy and consumes the ask side, a `Ask` market order is a sell and consumes
/// the bid side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    /// Integer code used in observation records and CSV output.
    pub fn as_int(self) -> u8 {
        match self {
            Side::Bid => 0,
            Side::Ask => 1,
        }
    }
}

/// What kind of book event it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// Limit order add (passive liquidity, or a marketable take if it crosses)
    Add,
    /// Cancel own-side resting liquidity
    Cancel,
    /// Aggressive order consuming the opposite best
    Market,
}

impl EventType {
    /// Integer code used in observation records and CSV output.
    pub fn as_int(self) -> u8 {
        match self {
            EventType::Add => 0,
            EventType::Cancel => 1,
            EventType::Market => 2,
        }
    }
}

/// A single order book event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event time
    pub t: f64,

    /// Add / Cancel / Market
    pub kind: EventType,

    /// Bid or Ask (aggressor side for Market)
    pub side: Side,

    /// Price level (used for Add/Cancel; ignored for Market)
    pub price: f64,

    /// Order size
    pub quantity: u32,
}

impl Event {
    pub fn new(t: f64, kind: EventType, side: Side, price: f64, quantity: u32) -> Self {
        Self {
            t,
            kind,
            side,
            price,
            quantity,
        }
    }
}

/// Maps a Hawkes dimension to its event type and side.
///
/// The mapping is load-bearing: the weight vector installed into the engine
/// is indexed by the same categories.
///
/// | k | event        |
/// |---|--------------|
/// | 0 | Bid Add      |
/// | 1 | Ask Add      |
/// | 2 | Bid Cancel   |
/// | 3 | Ask Cancel   |
/// | 4 | Market Buy   (aggressor is buyer, consumes asks)  |
/// | 5 | Market Sell  (aggressor is seller, consumes bids) |
pub fn category_to_event(k: usize) -> (EventType, Side) {
    match k {
        0 => (EventType::Add, Side::Bid),
        1 => (EventType::Add, Side::Ask),
        2 => (EventType::Cancel, Side::Bid),
        3 => (EventType::Cancel, Side::Ask),
        4 => (EventType::Market, Side::Bid),
        _ => (EventType::Market, Side::Ask),
    }
}
