//! carbonflow - Allocation-aware greenhouse-gas emission aggregation
//!
//! Computes allocation-correct, multi-dimensional emission summaries for a
//! reporting period from a client's process hierarchy and its raw measurement
//! stream. The hierarchy and measurement stores are collaborators behind
//! async traits; the computation itself is a pure, stateless pipeline.

pub mod aggregation_core;
pub mod config;
pub mod storage;
