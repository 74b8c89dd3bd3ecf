//! Reservoir whose level follows a tabulated storage curve.

use super::default_name;
use crate::block::{Block, NodeValues, Signals, check_width};
use crate::common::{NodeCache, check_finite, residual_table};
use crate::context::InputContext;
use crate::error::{ComponentError, ComponentResult};
use crate::schedule::{Interpolation, Timeseries};
use lf_core::units::Volume;
use lf_graph::BlockLayout;
use nalgebra::{DMatrix, DVector};

/// Volume balance over a reservoir of arbitrary shape.
///
/// State `V` (volume), output `h` (level):
/// - `dV/dt - (Qin - Qout) = 0`
/// - `h - level(V) = 0`, `level` interpolated linearly in the storage table
///
/// A volume outside the table is [`ComponentError::NonPhysical`]; the table
/// is never extrapolated.
#[derive(Clone, Debug)]
pub struct StorageReservoir {
    name: String,
    table: Timeseries,
    initial_volume: Volume,
    volume_var: String,
    level_var: String,
    cache: NodeCache,
    inflow: DVector<f64>,
    outflow: DVector<f64>,
}

impl StorageReservoir {
    /// `volumes` must be strictly increasing, with one level per volume.
    pub fn new(
        name: impl Into<String>,
        volumes: Vec<f64>,
        levels: Vec<f64>,
        initial_volume: Volume,
    ) -> ComponentResult<Self> {
        let name = name.into();
        if volumes.len() < 2 {
            return Err(ComponentError::InvalidArg {
                what: "storage table needs at least two points",
            });
        }
        let table = Timeseries::new(volumes, levels, Interpolation::Linear)?;
        check_finite(initial_volume.value, "reservoir initial volume")?;
        let reservoir = Self {
            volume_var: default_name(&name, "V"),
            level_var: default_name(&name, "h"),
            name,
            table,
            initial_volume,
            cache: NodeCache::default(),
            inflow: DVector::zeros(0),
            outflow: DVector::zeros(0),
        };
        reservoir.level_at(initial_volume.value)?;
        Ok(reservoir)
    }

    pub fn with_variables(mut self, volume: impl Into<String>, level: impl Into<String>) -> Self {
        self.volume_var = volume.into();
        self.level_var = level.into();
        self
    }

    pub fn level_var(&self) -> &str {
        &self.level_var
    }

    /// Level at volume `v`.
    pub fn level_at(&self, v: f64) -> ComponentResult<f64> {
        let volumes = self.table.times();
        let (lo, hi) = (volumes[0], volumes[volumes.len() - 1]);
        if !(lo..=hi).contains(&v) {
            return Err(ComponentError::NonPhysical {
                what: "reservoir volume outside storage table",
            });
        }
        Ok(self.table.at(v))
    }
}

impl Block for StorageReservoir {
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

        let curve = v
            .iter()
            .map(|&v| self.level_at(v))
            .collect::<ComponentResult<Vec<f64>>>()?;
        let balance = dv - (&self.inflow - &self.outflow);
        let level = h - DVector::from_vec(curve);
        residual_table(&self.name, n, &[balance, level])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_core::units::m3;

    fn two_segments() -> StorageReservoir {
        // 0..10 m3 rises 2 m, 10..30 m3 rises 1 m
        StorageReservoir::new("pond", vec![0.0, 10.0, 30.0], vec![0.0, 2.0, 3.0], m3(20.0)).unwrap()
    }

    #[test]
    fn level_interpolates_each_segment() {
        let r = two_segments();
        assert_eq!(r.level_at(5.0).unwrap(), 1.0);
        assert_eq!(r.level_at(10.0).unwrap(), 2.0);
        assert_eq!(r.level_at(20.0).unwrap(), 2.5);
        assert_eq!(r.level_at(30.0).unwrap(), 3.0);
    }

    #[test]
    fn volume_outside_table_is_not_extrapolated() {
        let r = two_segments();
        assert!(matches!(
            r.level_at(30.5),
            Err(ComponentError::NonPhysical { .. })
        ));
        assert!(r.level_at(-0.1).is_err());
    }

    #[test]
    fn rejects_bad_tables() {
        assert!(StorageReservoir::new("p", vec![0.0], vec![0.0], m3(0.0)).is_err());
        assert!(StorageReservoir::new("p", vec![0.0, 0.0], vec![0.0, 1.0], m3(0.0)).is_err());
        assert!(StorageReservoir::new("p", vec![0.0, 1.0], vec![0.0], m3(0.0)).is_err());
        // initial volume off the table
        assert!(StorageReservoir::new("p", vec![0.0, 1.0], vec![0.0, 1.0], m3(2.0)).is_err());
    }

    #[test]
    fn residual_reports_volume_off_the_table() {
        let mut r = two_segments();
        let xdot = DMatrix::zeros(2, 1);
        let x = DMatrix::from_column_slice(2, 1, &[20.0, 40.0]);
        let y = DMatrix::from_column_slice(2, 1, &[2.5, 3.0]);
        let t = [0.5, 1.0];
        r.set_values(NodeValues {
            xdot: xdot.columns(0, 1),
            x: x.columns(0, 1),
            y: y.columns(0, 1),
            t: &t,
        })
        .unwrap();
        r.inflow = DVector::zeros(2);
        r.outflow = DVector::zeros(2);
        assert!(matches!(
            r.residual(),
            Err(ComponentError::NonPhysical { .. })
        ));
    }
}
