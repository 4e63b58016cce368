//! Simulation driver: the hybrid feedback loop.
//!
//! Each step reads the top of book, turns it into category weights,
//! installs them into the generator, draws the next event, resolves its
//! concrete price through the placement policy, applies it to the book and
//! emits an observation of the post-apply state. The weights make the
//! generator react to the book it is itself driving.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::events::{Event, EventType, Side};
use crate::order_book::OrderBook;
use crate::placement::PlacementPolicy;
use crate::prelude::Result;
use crate::process::{EventProcess, HawkesMultivariate};
use crate::weights::compute_weights;

/// Levels seeded on each side before the loop starts.
const SEED_LEVELS: i32 = 10;
/// Aggregated quantity at each seeded level.
const SEED_QTY: u32 = 60;
/// Quantity injected one tick off center when a side goes empty mid-run.
const LIVENESS_QTY: u32 = 50;

/// Full parameter bundle for one simulation run.
///
/// Deserializes from JSON with per-field defaults, so a parameter file only
/// needs to name what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Baseline intensity per category
    pub mu: Vec<f64>,
    /// 6x6 excitation matrix: event of category k bumps dimension i by alpha[i][k]
    pub alpha: Vec<Vec<f64>>,
    /// 6x6 decay matrix; only the diagonal is consumed
    pub beta: Vec<Vec<f64>>,
    pub qty_min: u32,
    pub qty_max: u32,
    pub price_center: f64,
    pub tick_size: f64,
    /// Seed of the Hawkes RNG stream
    pub seed: u64,
    /// Seed of the placement RNG stream, independent of the Hawkes stream
    pub placement_seed: u64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            mu: vec![1.5, 1.5, 0.8, 0.8, 1.0, 1.0],
            alpha: vec![
                vec![0.6, 0.1, 0.1, 0.0, 0.2, 0.0],
                vec![0.1, 0.6, 0.0, 0.1, 0.0, 0.2],
                vec![0.1, 0.0, 0.4, 0.1, 0.1, 0.0],
                vec![0.0, 0.1, 0.1, 0.4, 0.0, 0.1],
                vec![0.2, 0.0, 0.1, 0.0, 0.5, 0.1],
                vec![0.0, 0.2, 0.0, 0.1, 0.1, 0.5],
            ],
            beta: vec![vec![1.5; 6]; 6],
            qty_min: 5,
            qty_max: 50,
            price_center: 100.0,
            tick_size: 0.1,
            seed: 42,
            placement_seed: 42,
        }
    }
}

/// One emitted record: the event plus the post-apply top of book and
/// metrics. Optional fields are absent when the corresponding side is empty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    pub t: f64,
    pub event_type: u8,
    pub side: u8,
    pub quantity: u32,
    pub price: f64,
    pub best_bid: Option<f64>,
    pub best_bid_qty: Option<u32>,
    pub best_ask: Option<f64>,
    pub best_ask_qty: Option<u32>,
    pub mid: Option<f64>,
    pub spread: Option<f64>,
    pub imbalance_top1: Option<f64>,
}

impl Observation {
    /// Snapshot the book state after `e` was applied.
    pub fn record(e: &Event, book: &OrderBook) -> Self {
        let tob = book.top();
        let m = book.metrics();
        Self {
            t: e.t,
            event_type: e.kind.as_int(),
            side: e.side.as_int(),
            quantity: e.quantity,
            price: e.price,
            best_bid: tob.best_bid_price,
            best_bid_qty: tob.best_bid_qty,
            best_ask: tob.best_ask_price,
            best_ask_qty: tob.best_ask_qty,
            mid: m.mid,
            spread: m.spread,
            imbalance_top1: m.imbalance_top1,
        }
    }
}

/// Owns the book, the generator and the placement stream for one run.
#[derive(Debug)]
pub struct Simulator {
    book: OrderBook,
    process: EventProcess,
    placement: PlacementPolicy,
    price_center: f64,
    t: f64,
}

impl Simulator {
    /// Build the hybrid simulator: a state-dependent multivariate Hawkes
    /// generator coupled to the book through weights and placement.
    pub fn new(params: &SimulationParams) -> Result<Self> {
        let engine = HawkesMultivariate::new(
            params.mu.clone(),
            params.alpha.clone(),
            params.beta.clone(),
            params.qty_min,
            params.qty_max,
            params.seed,
        )?;
        Ok(Self::with_process(
            EventProcess::HawkesMultivariate(engine),
            params.price_center,
            params.tick_size,
            params.placement_seed,
        ))
    }

    /// Build a simulator around any generator variant. Generators that
    /// produce their own prices skip the placement layer.
    pub fn with_process(
        process: EventProcess,
        price_center: f64,
        tick_size: f64,
        placement_seed: u64,
    ) -> Self {
        let mut book = OrderBook::new(tick_size);
        seed_book(&mut book, price_center);
        info!(
            "Seeded book: {} bid / {} ask levels around {}",
            book.bid_levels(),
            book.ask_levels(),
            price_center
        );

        Self {
            book,
            process,
            placement: PlacementPolicy::new(placement_seed),
            price_center,
            t: 0.0,
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    /// Current simulated time.
    pub fn time(&self) -> f64 {
        self.t
    }

    /// Advance the simulation by one event.
    pub fn step(&mut self) -> Observation {
        let w = compute_weights(&self.book);
        // Cannot fail: the weights vector is always the right size
        let _ = self.process.set_weights(&w);

        let mut e = self.process.next(self.t);
        self.t = e.t;

        self.ensure_liveness();

        if self.process.needs_placement() {
            let tob = self.book.top();
            // Liveness injection guarantees both bests exist
            let best_bid = tob.best_bid_price.unwrap_or(self.price_center);
            let best_ask = tob.best_ask_price.unwrap_or(self.price_center);
            self.placement
                .resolve(&mut e, best_bid, best_ask, self.book.tick_size());
        }

        let applied = self.book.apply(&e);
        if !applied {
            debug!("Dropped malformed event at t={}", e.t);
        }

        Observation::record(&e, &self.book)
    }

    /// Run for `n` events and collect the observations.
    pub fn run(&mut self, n: usize) -> Vec<Observation> {
        info!("Running simulation: {} events", n);
        let out: Vec<Observation> = (0..n).map(|_| self.step()).collect();
        info!(
            "Simulation done: t={:.4}, {} bid / {} ask levels live",
            self.t,
            self.book.bid_levels(),
            self.book.ask_levels()
        );
        out
    }

    /// Never let the book go one-sided: re-inject a level one tick off
    /// center on any empty side before placement reads the bests.
    fn ensure_liveness(&mut self) {
        let tob = self.book.top();
        let tick = self.book.tick_size();
        if tob.best_bid_price.is_none() {
            self.book.apply(&Event::new(
                self.t,
                EventType::Add,
                Side::Bid,
                self.price_center - tick,
                LIVENESS_QTY,
            ));
        }
        if tob.best_ask_price.is_none() {
            self.book.apply(&Event::new(
                self.t,
                EventType::Add,
                Side::Ask,
                self.price_center + tick,
                LIVENESS_QTY,
            ));
        }
    }
}

fn seed_book(book: &mut OrderBook, price_center: f64) {
    let tick = book.tick_size();
    for k in 1..=SEED_LEVELS {
        book.apply(&Event::new(
            0.0,
            EventType::Add,
            Side::Bid,
            price_center - k as f64 * tick,
            SEED_QTY,
        ));
        book.apply(&Event::new(
            0.0,
            EventType::Add,
            Side::Ask,
            price_center + k as f64 * tick,
            SEED_QTY,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeding() {
        let sim = Simulator::new(&SimulationParams::default()).unwrap();
        let book = sim.book();
        assert_eq!(book.bid_levels(), 10);
        assert_eq!(book.ask_levels(), 10);

        let tob = book.top();
        assert!((tob.best_bid_price.unwrap() - 99.9).abs() < 1e-9);
        assert!((tob.best_ask_price.unwrap() - 100.1).abs() < 1e-9);
        assert_eq!(tob.best_bid_qty, Some(60));
        assert_eq!(tob.best_ask_qty, Some(60));
    }

    #[test]
    fn test_step_emits_post_apply_state() {
        let mut sim = Simulator::new(&SimulationParams::default()).unwrap();
        let obs = sim.step();

        assert!(obs.t > 0.0);
        // Both sides seeded and liveness-protected: metrics always present
        assert!(obs.mid.is_some());
        assert!(obs.spread.is_some());
        assert!(obs.imbalance_top1.is_some());
        assert!(obs.best_bid.unwrap() < obs.best_ask.unwrap());
    }

    #[test]
    fn test_run_time_is_monotone() {
        let mut sim = Simulator::new(&SimulationParams::default()).unwrap();
        let obs = sim.run(400);
        assert_eq!(obs.len(), 400);
        for pair in obs.windows(2) {
            assert!(pair[1].t >= pair[0].t);
        }
    }

    #[test]
    fn test_params_json_round_trip() {
        let params = SimulationParams::default();
        let json = serde_json::to_string(&params).unwrap();
        let back: SimulationParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mu, params.mu);
        assert_eq!(back.alpha, params.alpha);
        assert_eq!(back.seed, params.seed);

        // Partial files fall back to defaults per field
        let partial: SimulationParams = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(partial.seed, 7);
        assert_eq!(partial.mu, params.mu);
    }
}
