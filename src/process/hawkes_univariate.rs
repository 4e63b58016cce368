//! Univariate Hawkes event generator.
//!
//! Intensity: lambda(t) = mu + alpha * s(t) with s(t) the exponentially
//! decayed count of past events. Times come from the same thinning scheme
//! as the multivariate generator; side, type, quantity and price are filled
//! in with simple fixed distributions, so this variant stands on its own
//! without a placement layer.

use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::Exp1;

use crate::errors::Error;
use crate::events::{Event, EventType, Side};
use crate::prelude::Result;

#[derive(Debug, Clone)]
pub struct HawkesUnivariate {
    mu: f64,
    alpha: f64,
    beta: f64,

    /// s(t) = sum exp(-beta*(t - ti)) at `last_time`
    s: f64,
    last_time: f64,

    price_center: f64,
    tick_size: f64,

    rng: StdRng,
    qty_min: u32,
    qty_max: u32,
}

impl HawkesUnivariate {
    pub fn new(
        mu: f64,
        alpha: f64,
        beta: f64,
        price_center: f64,
        tick_size: f64,
        qty_min: u32,
        qty_max: u32,
        seed: u64,
    ) -> Result<Self> {
        if !(mu > 0.0) || !mu.is_finite() {
            return Err(Error::InvalidInput(format!("mu must be > 0, got {}", mu)));
        }
        if alpha < 0.0 {
            return Err(Error::InvalidInput(format!(
                "alpha must be >= 0, got {}",
                alpha
            )));
        }
        if !(beta > 0.0) || !beta.is_finite() {
            return Err(Error::InvalidInput(format!("beta must be > 0, got {}", beta)));
        }
        if qty_min == 0 || qty_min > qty_max {
            return Err(Error::InvalidInput(format!(
                "quantity range [{}, {}] must be non-empty and start at 1",
                qty_min, qty_max
            )));
        }

        Ok(Self {
            mu,
            alpha,
            beta,
            s: 0.0,
            last_time: 0.0,
            price_center,
            tick_size,
            rng: StdRng::seed_from_u64(seed),
            qty_min,
            qty_max,
        })
    }

    /// Intensity at the internal state time, useful for diagnostics.
    pub fn intensity(&self) -> f64 {
        self.mu + self.alpha * self.s
    }

    pub fn next(&mut self, t: f64) -> Event {
        self.decay_to(t);

        loop {
            // Valid upper bound until the next jump: intensity decays
            // between events
            let lambda_bar = self.intensity();

            let wait: f64 = self.rng.sample::<f64, _>(Exp1) / lambda_bar;
            let cand_time = self.last_time + wait;

            self.decay_to(cand_time);
            let lambda_cand = self.intensity();

            let u: f64 = self.rng.gen();
            if u <= lambda_cand / lambda_bar {
                // Event at cand_time contributes exp(0) = 1 to s(t)
                self.s += 1.0;

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

                // Crude price model: 1-5 ticks off center, away from a zero
                // spread
                let tick_offset =
                    1 + (self.rng.gen_range(self.qty_min..=self.qty_max) % 5);
                let price = match side {
                    Side::Bid => self.price_center - tick_offset as f64 * self.tick_size,
                    Side::Ask => self.price_center + tick_offset as f64 * self.tick_size,
                };

                return Event {
                    t: cand_time,
                    kind,
                    side,
                    price,
                    quantity,
                };
            }
            // Rejection: time advances, no jump
        }
    }

    fn decay_to(&mut self, t: f64) {
        if t < self.last_time {
            // Event simulation uses monotone time; a rewind resets the state
            self.last_time = t;
            self.s = 0.0;
            return;
        }
        let dt = t - self.last_time;
        if dt > 0.0 {
            self.s *= (-self.beta * dt).exp();
            self.last_time = t;
        }
    }
}
