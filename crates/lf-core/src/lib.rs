//! lf-core: stable foundation for lumpflow.
//!
//! Contains:
//! - units (uom SI types + constructors for hydraulic quantities)
//! - numeric (Real, finiteness checks, step counting)
//! - ids (compact block identifiers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{LfError, LfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
