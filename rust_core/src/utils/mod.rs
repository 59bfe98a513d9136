pub mod coerce;
pub mod matching;
pub mod stats;
