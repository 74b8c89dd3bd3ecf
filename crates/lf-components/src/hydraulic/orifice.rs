//! Gravity-driven discharge through a sharp-edged orifice.

use super::default_name;
use crate::block::{Block, NodeValues, Signals, check_width};
use crate::common::{NodeCache, check_positive, residual_table, sqrt_head};
use crate::context::InputContext;
use crate::error::{ComponentError, ComponentResult};
use lf_core::units::constants::G_MPS2;
use lf_core::units::{Area, Density};
use lf_graph::BlockLayout;
use nalgebra::{DMatrix, DVector};

/// Mass flow out of the upstream vessel through an orifice.
///
/// Output `mdot`: `mdot - rho*A_o*c*sqrt(2*g*max(h_up, 0)) = 0`, with `h_up`
/// the level published by the first upstream neighbor.
#[derive(Clone, Debug)]
pub struct Orifice {
    name: String,
    /// Throat area.
    pub area: Area,
    /// Discharge coefficient (dimensionless, typically 0.6-0.9)
    pub cd: f64,
    /// Density of the discharged liquid.
    pub density: Density,
    flow_var: String,
    cache: NodeCache,
    upstream_level: DVector<f64>,
}

impl Orifice {
    pub fn new(
        name: impl Into<String>,
        area: Area,
        cd: f64,
        density: Density,
    ) -> ComponentResult<Self> {
        let name = name.into();
        check_positive(area.value, "orifice area")?;
        check_positive(cd, "discharge coefficient")?;
        check_positive(density.value, "orifice liquid density")?;
        Ok(Self {
            flow_var: default_name(&name, "mdot"),
            name,
            area,
            cd,
            density,
            cache: NodeCache::default(),
            upstream_level: DVector::zeros(0),
        })
    }

    pub fn with_variable(mut self, mass_flow: impl Into<String>) -> Self {
        self.flow_var = mass_flow.into();
        self
    }

    pub fn flow_var(&self) -> &str {
        &self.flow_var
    }
}

impl Block for Orifice {
    fn name(&self) -> &str {
        &self.name
    }

    fn layout(&self) -> BlockLayout {
        BlockLayout::new(Vec::<String>::new(), [self.flow_var.clone()])
    }

    fn initial_states(&self) -> Vec<f64> {
        Vec::new()
    }

    fn set_values(&mut self, values: NodeValues<'_>) -> ComponentResult<()> {
        values.check_layout(&self.name, &self.layout())?;
        self.cache.store(values);
        Ok(())
    }

    fn update_inputs(&mut self, ctx: &InputContext<'_>) -> ComponentResult<()> {
        self.upstream_level = ctx
            .upstream_level()
            .ok_or_else(|| ComponentError::MissingInput {
                block: self.name.clone(),
                what: "upstream level",
            })?;
        Ok(())
    }

    fn signals(&self) -> Signals {
        Signals::flow(self.cache.output(0))
    }

    fn residual(&self) -> ComponentResult<DMatrix<f64>> {
        let n = self.cache.n_nodes();
        check_width(&self.name, "upstream level", n, self.upstream_level.len())?;

        let k = self.density.value * self.area.value * self.cd * (2.0 * G_MPS2).sqrt();
        let mdot = self.cache.output(0) - sqrt_head(&self.upstream_level) * k;
        residual_table(&self.name, n, &[mdot])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_core::units::{constants::rho_water, m2};

    #[test]
    fn rejects_bad_parameters() {
        assert!(Orifice::new("o", m2(-1.0), 0.62, rho_water()).is_err());
        assert!(Orifice::new("o", m2(5e-4), 0.0, rho_water()).is_err());
    }

    #[test]
    fn layout_is_output_only() {
        let o = Orifice::new("o", m2(5e-4), 0.62, rho_water()).unwrap();
        let layout = o.layout();
        assert!(layout.states.is_empty());
        assert_eq!(layout.outputs, vec!["o.mdot".to_string()]);
        assert_eq!(o.with_variable("q").flow_var(), "q");
    }
}
