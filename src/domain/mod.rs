//! Core domain types and logic.
//!
//! [`resample`], [`normalize`] and [`correlation`] are pure transformations
//! over [`series::Series`]; [`query`] and [`ingest`] drive them through the
//! port traits.

pub mod series;
pub mod resample;
pub mod normalize;
pub mod correlation;
pub mod query;
pub mod ingest;
pub mod error;
