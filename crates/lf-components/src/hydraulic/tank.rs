//! Liquid holdup vessel tracked by mass.

use super::default_name;
use crate::block::{Block, NodeValues, Signals, check_width};
use crate::common::{NodeCache, check_finite, check_positive, residual_table};
use crate::context::InputContext;
use crate::error::ComponentResult;
use lf_core::units::{Area, Density, Mass};
use lf_graph::BlockLayout;
use nalgebra::{DMatrix, DVector};

/// Mass balance over a vessel of constant area holding a liquid of fixed
/// density.
///
/// State `m` (mass), output `h` (height):
/// - `dm/dt - (mdot_in - mdot_out) = 0`
/// - `m - A*rho*h = 0`
///
/// Publishes its height as `level`; a tank carries no flow of its own.
#[derive(Clone, Debug)]
pub struct Tank {
    name: String,
    area: Area,
    density: Density,
    initial_mass: Mass,
    mass_var: String,
    height_var: String,
    cache: NodeCache,
    inflow: DVector<f64>,
    outflow: DVector<f64>,
}

impl Tank {
    pub fn new(
        name: impl Into<String>,
        area: Area,
        density: Density,
        initial_mass: Mass,
    ) -> ComponentResult<Self> {
        let name = name.into();
        check_positive(area.value, "tank area")?;
        check_positive(density.value, "tank liquid density")?;
        check_finite(initial_mass.value, "tank initial mass")?;
        Ok(Self {
            mass_var: default_name(&name, "m"),
            height_var: default_name(&name, "h"),
            name,
            area,
            density,
            initial_mass,
            cache: NodeCache::default(),
            inflow: DVector::zeros(0),
            outflow: DVector::zeros(0),
        })
    }

    pub fn with_variables(mut self, mass: impl Into<String>, height: impl Into<String>) -> Self {
        self.mass_var = mass.into();
        self.height_var = height.into();
        self
    }

    pub fn height_var(&self) -> &str {
        &self.height_var
    }

    pub fn density(&self) -> Density {
        self.density
    }
}

impl Block for Tank {
    fn name(&self) -> &str {
        &self.name
    }

    fn layout(&self) -> BlockLayout {
        BlockLayout::new([self.mass_var.clone()], [self.height_var.clone()])
    }

    fn initial_states(&self) -> Vec<f64> {
        vec![self.initial_mass.value]
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

        let dm = self.cache.state_derivative(0);
        let m = self.cache.state(0);
        let h = self.cache.output(0);

        let balance = dm - (&self.inflow - &self.outflow);
        let holdup = m - h * (self.area.value * self.density.value);
        residual_table(&self.name, n, &[balance, holdup])
    }
}
