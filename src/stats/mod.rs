//! Cell statistics

mod aggregator;

pub use self::aggregator::{aggregate, aggregate_values, CellStats, EmptySample, NodataPolicy};
