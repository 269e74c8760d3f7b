//! Domain-scoped crawling
//!
//! The frontier (queue + visited set) is the single serialization point;
//! fetching and extraction run in a bounded worker pool around it. The
//! record set aggregates discovered media with first-insert-wins
//! semantics keyed on the normalized URL.

mod aggregate;
mod collector;
mod frontier;

pub use crate::extract::ResourceRecord;
pub use aggregate::RecordSet;
pub use collector::{CollectOptions, Collector};
pub use frontier::{Claim, Frontier, Task};
