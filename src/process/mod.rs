//! Event generator family.
//!
//! Every generator exposes the same capability: produce the next order book
//! event at or after a caller-supplied time. The family is a closed enum
//! rather than a trait object so the simulator owns a concrete value and
//! dispatch stays static.
//!
//! Variants:
//! - `HawkesMultivariate`: the six-dimensional state-dependent Hawkes
//!   generator driving the hybrid simulation
//! - `HawkesUnivariate`: single-intensity self-exciting generator with a
//!   simple built-in side/type/price model
//! - `Poisson`: homogeneous baseline generator, useful as a null model

mod hawkes_multivariate;
mod hawkes_univariate;
mod poisson;

pub use hawkes_multivariate::HawkesMultivariate;
pub use hawkes_univariate::HawkesUnivariate;
pub use poisson::PoissonProcess;

use crate::events::Event;
use crate::prelude::Result;

/// An event generator with a uniform `next(t)` operation.
#[derive(Debug, Clone)]
pub enum EventProcess {
    HawkesMultivariate(HawkesMultivariate),
    HawkesUnivariate(HawkesUnivariate),
    Poisson(PoissonProcess),
}

impl EventProcess {
    /// Generate the next event at a time >= `t`.
    pub fn next(&mut self, t: f64) -> Event {
        match self {
            EventProcess::HawkesMultivariate(p) => p.next(t),
            EventProcess::HawkesUnivariate(p) => p.next(t),
            EventProcess::Poisson(p) => p.next(t),
        }
    }

    /// Whether generated Add/Cancel events carry an abstract (zero) price
    /// that the simulator must resolve through its placement policy. The
    /// univariate and Poisson variants price their own events.
    pub fn needs_placement(&self) -> bool {
        matches!(self, EventProcess::HawkesMultivariate(_))
    }

    /// Install state-dependent category weights.
    ///
    /// Only the multivariate Hawkes consumes them; the univariate and
    /// Poisson variants have no category structure and ignore the call.
    pub fn set_weights(&mut self, w: &[f64]) -> Result<()> {
        match self {
            EventProcess::HawkesMultivariate(p) => p.set_weights(w),
            EventProcess::HawkesUnivariate(_) | EventProcess::Poisson(_) => Ok(()),
        }
    }
}
