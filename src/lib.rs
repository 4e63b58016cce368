#![deny(unreachable_pub)]
mod csv_logger;
mod errors;
mod events;
mod order_book;
mod placement;
mod prelude;
mod process;
mod simulator;
mod weights;


pub use csv_logger::CsvLogger;
pub use errors::Error;
pub use events::{category_to_event, Event, EventType, Side, NUM_CATEGORIES};
pub use order_book::{Metrics, OrderBook, TopOfBook};
pub use placement::PlacementPolicy;
pub use process::{EventProcess, HawkesMultivariate, HawkesUnivariate, PoissonProcess};
pub use simulator::{Observation, SimulationParams, Simulator};
pub use weights::compute_weights;
