//! CSV encoding of observation streams.
//!
//! One row per observation, post-apply book state included. Missing
//! optional fields are written as empty cells so downstream tabular tooling
//! can distinguish "no level" from zero. Floats use Rust's shortest
//! round-trip formatting, which preserves full precision.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::prelude::Result;
use crate::simulator::Observation;

const HEADER: [&str; 12] = [
    "t",
    "evt",
    "side",
    "qty",
    "price",
    "best_bid",
    "best_bid_qty",
    "best_ask",
    "best_ask_qty",
    "mid",
    "spread",
    "imbalance_top1",
];

pub struct CsvLogger {
    writer: Writer<File>,
}

impl CsvLogger {
    /// Create the output file and write the header row.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut writer = Writer::from_path(path)?;
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }

    /// Append one observation row.
    pub fn log(&mut self, obs: &Observation) -> Result<()> {
        self.writer.write_record(&[
            obs.t.to_string(),
            obs.event_type.to_string(),
            obs.side.to_string(),
            obs.quantity.to_string(),
            obs.price.to_string(),
            opt_num(obs.best_bid),
            opt_qty(obs.best_bid_qty),
            opt_num(obs.best_ask),
            opt_qty(obs.best_ask_qty),
            opt_num(obs.mid),
            opt_num(obs.spread),
            opt_num(obs.imbalance_top1),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

fn opt_num(x: Option<f64>) -> String {
    x.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_qty(x: Option<u32>) -> String {
    x.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(t: f64) -> Observation {
        Observation {
            t,
            event_type: 0,
            side: 1,
            quantity: 25,
            price: 100.1,
            best_bid: Some(100.0),
            best_bid_qty: Some(60),
            best_ask: Some(100.1),
            best_ask_qty: Some(85),
            mid: Some(100.05),
            spread: Some(0.1),
            imbalance_top1: Some(-0.1724137931034483),
        }
    }

    #[test]
    fn test_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");

        let mut logger = CsvLogger::create(&path).unwrap();
        logger.log(&obs(0.123456789012345)).unwrap();

        let mut empty = obs(0.2);
        empty.best_ask = None;
        empty.best_ask_qty = None;
        empty.mid = None;
        empty.spread = None;
        empty.imbalance_top1 = None;
        logger.log(&empty).unwrap();
        logger.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "t,evt,side,qty,price,best_bid,best_bid_qty,best_ask,best_ask_qty,mid,spread,imbalance_top1"
        );

        let row = lines.next().unwrap();
        // Shortest round-trip float formatting keeps full precision
        assert!(row.starts_with("0.123456789012345,0,1,25,100.1,"));
        assert!(row.contains("-0.1724137931034483"));

        // Missing optionals become empty cells
        let row = lines.next().unwrap();
        assert!(row.ends_with("100,60,,,,,"));
    }
}
