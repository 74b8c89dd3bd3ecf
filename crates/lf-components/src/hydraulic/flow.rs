//! Prescribed boundary flows.

use super::default_name;
use crate::block::{Block, NodeValues, Signals};
use crate::common::{NodeCache, check_finite, residual_table};
use crate::error::ComponentResult;
use crate::schedule::Schedule;
use lf_graph::BlockLayout;
use nalgebra::DMatrix;

/// Output `Q`: `Q - q = 0` for a fixed `q`.
///
/// Connected downstream of an accumulator it acts as a draw-off, upstream of
/// one as a feed.
#[derive(Clone, Debug)]
pub struct FlowConstant {
    name: String,
    pub rate: f64,
    flow_var: String,
    cache: NodeCache,
}

impl FlowConstant {
    pub fn new(name: impl Into<String>, rate: f64) -> ComponentResult<Self> {
        let name = name.into();
        check_finite(rate, "constant flow rate")?;
        Ok(Self {
            flow_var: default_name(&name, "Q"),
            name,
            rate,
            cache: NodeCache::default(),
        })
    }

    pub fn with_variable(mut self, flow: impl Into<String>) -> Self {
        self.flow_var = flow.into();
        self
    }
}

impl Block for FlowConstant {
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

    fn signals(&self) -> Signals {
        Signals::flow(self.cache.output(0))
    }

    fn residual(&self) -> ComponentResult<DMatrix<f64>> {
        let q = self.cache.output(0).add_scalar(-self.rate);
        residual_table(&self.name, self.cache.n_nodes(), &[q])
    }
}

/// Output `Q`: `Q - q(t) = 0` with `q` evaluated at every node time.
#[derive(Debug)]
pub struct FlowSource {
    name: String,
    schedule: Schedule,
    flow_var: String,
    cache: NodeCache,
}

impl FlowSource {
    pub fn new(name: impl Into<String>, schedule: impl Into<Schedule>) -> Self {
        let name = name.into();
        Self {
            flow_var: default_name(&name, "Q"),
            name,
            schedule: schedule.into(),
            cache: NodeCache::default(),
        }
    }

    pub fn with_variable(mut self, flow: impl Into<String>) -> Self {
        self.flow_var = flow.into();
        self
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }
}

impl Block for FlowSource {
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

    fn signals(&self) -> Signals {
        Signals::flow(self.cache.output(0))
    }

    fn residual(&self) -> ComponentResult<DMatrix<f64>> {
        let target = self.cache.t.map(|t| self.schedule.at(t));
        let q = self.cache.output(0) - target;
        residual_table(&self.name, self.cache.n_nodes(), &[q])
    }
}
