//! Service layer: the pure computations behind the dashboard endpoints.
//!
//! Everything in this module is synchronous and request-scoped: it
//! consumes already-fetched rows, never blocks, and holds no state across
//! invocations. The repository layer below supplies the rows; the HTTP
//! layer above serializes the results.

pub mod aggregation;
pub mod exceedance;
pub mod projection;

pub use aggregation::{aggregate, location_summary, measure_reports, rank};
pub use exceedance::evaluate;
pub use projection::project;

#[cfg(test)]
#[path = "exceedance_tests.rs"]
mod exceedance_tests;

#[cfg(test)]
#[path = "aggregation_tests.rs"]
mod aggregation_tests;
