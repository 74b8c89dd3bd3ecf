//! Controlled release from an upstream reservoir.

use super::default_name;
use crate::block::{Block, NodeValues, Signals, check_width};
use crate::common::{NodeCache, check_finite, residual_table, sqrt_head};
use crate::context::InputContext;
use crate::error::{ComponentError, ComponentResult};
use lf_graph::BlockLayout;
use nalgebra::{DMatrix, DVector};

/// Output `Q`: `Q - Cv*sqrt(max(h_up, 0)) = 0`.
#[derive(Clone, Debug)]
pub struct FlowRelease {
    name: String,
    /// Release coefficient relating head to volumetric flow.
    pub cv: f64,
    flow_var: String,
    cache: NodeCache,
    upstream_level: DVector<f64>,
}

impl FlowRelease {
    pub fn new(name: impl Into<String>, cv: f64) -> ComponentResult<Self> {
        let name = name.into();
        check_finite(cv, "release coefficient")?;
        Ok(Self {
            flow_var: default_name(&name, "Q"),
            name,
            cv,
            cache: NodeCache::default(),
            upstream_level: DVector::zeros(0),
        })
    }

    pub fn with_variable(mut self, flow: impl Into<String>) -> Self {
        self.flow_var = flow.into();
        self
    }

    pub fn flow_var(&self) -> &str {
        &self.flow_var
    }
}

impl Block for FlowRelease {
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
        let q = self.cache.output(0) - sqrt_head(&self.upstream_level) * self.cv;
        residual_table(&self.name, n, &[q])
    }
}
