//! lf-components: the block contract and reference blocks for lumpflow.
//!
//! A [`Block`] declares ordered state and output names, receives its slice of
//! the global node tables for one finite element, pulls neighbor values
//! through an [`InputContext`], and returns one residual column per declared
//! variable. Neighbors communicate only through the [`Signals`] each block
//! publishes.
//!
//! # Example
//!
//! ```
//! use lf_components::{Block, Orifice, Tank};
//! use lf_core::units::{constants::rho_water, kg, m2};
//!
//! let tank = Tank::new("tank", m2(16.0), rho_water(), kg(160_000.0)).unwrap();
//! let orifice = Orifice::new("orifice", m2(5e-4), 0.62, rho_water()).unwrap();
//!
//! assert_eq!(tank.layout().states, vec!["tank.m".to_string()]);
//! assert_eq!(orifice.layout().outputs, vec!["orifice.mdot".to_string()]);
//! ```

pub mod block;
pub mod common;
pub mod context;
pub mod error;
pub mod hydraulic;
pub mod schedule;

// Re-exports
pub use block::{Block, NodeTables, NodeValues, Signals, check_width};
pub use context::InputContext;
pub use error::{ComponentError, ComponentResult};
pub use hydraulic::{
    FlowConstant, FlowRelease, FlowSource, Orifice, Reservoir, StorageReservoir, Tank,
};
pub use schedule::{Interpolation, Schedule, Timeseries};
