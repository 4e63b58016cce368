//! Homogeneous Poisson event generator.
//!
//! Exponential inter-arrivals at a fixed rate, with the same side/type/
//! quantity/price synthesis as the univariate Hawkes. Serves as the
//! no-clustering null model.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

use crate::errors::Error;
use crate::events::{Event, EventType, Side};
use crate::prelude::Result;

#[derive(Debug, Clone)]
pub struct PoissonProcess {
    inter_arrival: Exp<f64>,
    price_center: f64,
    tick_size: f64,
    rng: StdRng,
    qty_min: u32,
    qty_max: u32,
}

impl PoissonProcess {
    pub fn new(
        lambda: f64,
        price_center: f64,
        tick_size: f64,
        qty_min: u32,
        qty_max: u32,
        seed: u64,
    ) -> Result<Self> {
        if !lambda.is_finite() || lambda <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "rate lambda must be finite and positive, got {}",
                lambda
            )));
        }
        if qty_min == 0 || qty_min > qty_max {
            return Err(Error::InvalidInput(format!(
                "quantity range [{}, {}] must be non-empty and start at 1",
                qty_min, qty_max
            )));
        }
        let inter_arrival = Exp::new(lambda)
            .map_err(|e| Error::InvalidInput(format!("invalid rate lambda: {:?}", e)))?;

        Ok(Self {
            inter_arrival,
            price_center,
            tick_size,
            rng: StdRng::seed_from_u64(seed),
            qty_min,
            qty_max,
        })
    }

    pub fn next(&mut self, t: f64) -> Event {
        let wait = self.inter_arrival.sample(&mut self.rng);

        let side = if self.rng.gen_bool(0.5) {
            Side::Bid
        } else {
            Side::Ask
        };
        let kind = if self.rng.gen_bool(0.8) {
            EventType::Add
        } else {
            EventType::Cancel
        };
        let quantity = self.rng.gen_range(self.qty_min..=self.qty_max);

        let tick_offset = 1 + (self.rng.gen_range(self.qty_min..=self.qty_max) % 5);
        let price = match side {
            Side::Bid => self.price_center - tick_offset as f64 * self.tick_size,
            Side::Ask => self.price_center + tick_offset as f64 * self.tick_size,
        };

        Event {
            t: t + wait,
            kind,
            side,
            price,
            quantity,
        }
    }
}
