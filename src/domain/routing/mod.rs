//! Routing module - The closed intent taxonomy and its exhaustive mapping
//! onto the two downstream paths of a turn.

mod classification;
mod intent;

pub use classification::Classification;
pub use intent::{Intent, Route, UnknownLabel, Urgency};
