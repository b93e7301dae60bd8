//! Per-species biological sub-models. All functions are pure.

pub mod competition;
pub mod energy;
pub mod evolution;
pub mod growth;
pub mod predation;
pub mod stress;
