//! Orthogonal collocation on finite elements for block networks.
//!
//! Provides:
//! - Fixed Lobatto collocation tables for 2 to 6 nodes per element
//! - The `Flowsheet` step engine: consistent initialization, per-element
//!   residual assembly and root-finding, trajectory accumulation
//! - Run options and convergence policy
//!
//! # Example
//!
//! ```no_run
//! use lf_components::{Block, Orifice, Tank};
//! use lf_core::units::{constants::rho_water, kg, m2};
//! use lf_core::BlockId;
//! use lf_sim::Flowsheet;
//!
//! let blocks: Vec<Box<dyn Block>> = vec![
//!     Box::new(Tank::new("tank", m2(16.0), rho_water(), kg(160_000.0)).unwrap()),
//!     Box::new(Orifice::new("orifice", m2(5e-4), 0.62, rho_water()).unwrap()),
//! ];
//! let mut sheet = Flowsheet::new(blocks).unwrap();
//! sheet.connect(BlockId::from_index(0), BlockId::from_index(1)).unwrap();
//! sheet.initialize(5, 100.0, 0.0).unwrap();
//!
//! let trajectory = sheet.update_until(8e4).unwrap();
//! println!("{:?}", trajectory.get("tank.h"));
//! ```

pub mod collocation;
pub mod error;
pub mod flowsheet;
pub mod options;
pub mod record;

// Re-exports for public API
pub use collocation::CollocationTable;
pub use error::{SimError, SimResult};
pub use flowsheet::Flowsheet;
pub use options::{ConvergencePolicy, SimOptions};
pub use record::{Snapshot, Trajectory};
