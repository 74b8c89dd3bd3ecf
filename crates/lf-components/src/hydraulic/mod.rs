//! Reference hydraulic blocks.
//!
//! Volume-based: [`Reservoir`] or [`StorageReservoir`] drained by
//! [`FlowRelease`], fed by [`FlowConstant`] or [`FlowSource`].
//! Mass-based: [`Tank`] drained by [`Orifice`].
//!
//! Flow blocks publish their flow in the units of the accumulator they are
//! connected to; the accumulators sum whatever their neighbors publish.

mod flow;
mod orifice;
mod release;
mod reservoir;
mod storage;
mod tank;

pub use flow::{FlowConstant, FlowSource};
pub use orifice::Orifice;
pub use release::FlowRelease;
pub use reservoir::Reservoir;
pub use storage::StorageReservoir;
pub use tank::Tank;

/// `"{block}.{suffix}"`, the default variable name.
fn default_name(block: &str, suffix: &str) -> String {
    format!("{block}.{suffix}")
}
