//! Open reservoir with a prismatic cross-section.

use super::default_name;
use crate::block::{Block, NodeValues, Signals, check_width};
use crate::common::{NodeCache, check_finite, check_positive, residual_table};
use crate::context::InputContext;
use crate::error::ComponentResult;
use lf_core::units::{Area, Volume};
use lf_graph::BlockLayout;
use nalgebra::{DMatrix, DVector};

/// Volume balance over a reservoir of constant area.
///
/// State `V` (volume), output `h` (level):
/// - `dV/dt - (Qin - Qout) = 0`, flows summed over inlet/outlet neighbors
/// - `h - V/A = 0`
#[derive(Clone, Debug)]
pub struct Reservoir {
    name: String,
    area: Area,
    initial_volume: Volume,
    volume_var: String,
    level_var: String,
    cache: NodeCache,
    inflow: DVector<f64>,
    outflow: DVector<f64>,
}

impl Reservoir {
    pub fn new(name: impl Into<String>, area: Area, initial_volume: Volume) -> ComponentResult<Self> {
        let name = name.into();
        check_positive(area.value, "reservoir area")?;
        check_finite(initial_volume.value, "reservoir initial volume")?;
        Ok(Self {
            volume_var: default_name(&name, "V"),
            level_var: default_name(&name, "h"),
            name,
            area,
            initial_volume,
            cache: NodeCache::default(),
            inflow: DVector::zeros(0),
            outflow: DVector::zeros(0),
        })
    }

    /// Rename the volume state and level output.
    pub fn with_variables(mut self, volume: impl Into<String>, level: impl Into<String>) -> Self {
        self.volume_var = volume.into();
        self.level_var = level.into();
        self
    }

    pub fn area(&self) -> Area {
        self.area
    }

    pub fn level_var(&self) -> &str {
        &self.level_var
    }
}

impl Block for Reservoir {
    fn name(&self) -> &str {
        &self.name
    }

    fn layout(&self) -> BlockLayout {
        BlockLayout::new([self.volume_var.clone()], [self.level_var.clone()])
    }

    fn initial_states(&self) -> Vec<f64> {
        vec![self.initial_volume.value]
    }

    fn set_values(&mut self, values: NodeValues<'_>) -> ComponentResult<()> {
        values.check_layout(&self.name, &self.layout())?;
        self.cache.store(values);
        Ok(())
    }

    fn update_inputs(&mut self, ctx: &InputContext<'_>) -> ComponentResult<()> {
        self.inflow = ctx.inflow()?;
        self.outflow = ctx.outflow()?;
        Ok(())
    }

    fn signals(&self) -> Signals {
        Signals::level(self.cache.output(0))
    }

    fn residual(&self) -> ComponentResult<DMatrix<f64>> {
        let n = self.cache.n_nodes();
        check_width(&self.name, "inflow", n, self.inflow.len())?;
        check_width(&self.name, "outflow", n, self.outflow.len())?;

        let dv = self.cache.state_derivative(0);
        let v = self.cache.state(0);
        let h = self.cache.output(0);

        let balance = dv - (&self.inflow - &self.outflow);
        let level = h - v / self.area.value;
        residual_table(&self.name, n, &[balance, level])
    }
}
