//! Failure modes surfaced by the flowsheet.

use lf_components::common::NodeCache;
use lf_components::{
    Block, ComponentError, ComponentResult, FlowConstant, FlowRelease, NodeValues, Reservoir,
};
use lf_core::units::{m2, m3};
use lf_graph::BlockLayout;
use lf_sim::{ConvergencePolicy, Flowsheet, SimError, SimOptions};
use nalgebra::{DMatrix, DVector};

/// Declares one output but returns a residual of the wrong width.
struct WideResidual {
    cache: NodeCache,
}

impl Block for WideResidual {
    fn name(&self) -> &str {
        "wide"
    }
    fn layout(&self) -> BlockLayout {
        BlockLayout::new(Vec::<String>::new(), ["w"])
    }
    fn initial_states(&self) -> Vec<f64> {
        Vec::new()
    }
    fn set_values(&mut self, values: NodeValues<'_>) -> ComponentResult<()> {
        self.cache.store(values);
        Ok(())
    }
    fn residual(&self) -> ComponentResult<DMatrix<f64>> {
        Ok(DMatrix::zeros(self.cache.n_nodes(), 2))
    }
}

/// Output `y` with residual `y^2 + 1`, which has no real root.
struct NoRoot {
    cache: NodeCache,
}

impl Block for NoRoot {
    fn name(&self) -> &str {
        "no_root"
    }
    fn layout(&self) -> BlockLayout {
        BlockLayout::new(Vec::<String>::new(), ["y"])
    }
    fn initial_states(&self) -> Vec<f64> {
        Vec::new()
    }
    fn set_values(&mut self, values: NodeValues<'_>) -> ComponentResult<()> {
        self.cache.store(values);
        Ok(())
    }
    fn residual(&self) -> ComponentResult<DMatrix<f64>> {
        let y = self.cache.output(0);
        Ok(DMatrix::from_fn(y.len(), 1, |i, _| y[i] * y[i] + 1.0))
    }
}

/// Declares a state but reports no initial value for it.
struct MissingInitial;

impl Block for MissingInitial {
    fn name(&self) -> &str {
        "missing"
    }
    fn layout(&self) -> BlockLayout {
        BlockLayout::new(["s"], Vec::<String>::new())
    }
    fn initial_states(&self) -> Vec<f64> {
        Vec::new()
    }
    fn set_values(&mut self, _values: NodeValues<'_>) -> ComponentResult<()> {
        Ok(())
    }
    fn residual(&self) -> ComponentResult<DMatrix<f64>> {
        Ok(DMatrix::zeros(1, 1))
    }
}

fn reservoir() -> Flowsheet {
    let blocks: Vec<Box<dyn Block>> =
        vec![Box::new(Reservoir::new("lake", m2(2.0), m3(8.0)).unwrap())];
    Flowsheet::new(blocks).unwrap()
}

#[test]
fn unsupported_order_is_rejected_at_initialize() {
    let mut sheet = reservoir();
    for n in [0, 1, 7] {
        assert_eq!(
            sheet.initialize(n, 1.0, 0.0).unwrap_err(),
            SimError::UnsupportedOrder { n }
        );
    }
    assert!(matches!(
        sheet.initialize(3, -1.0, 0.0),
        Err(SimError::InvalidArg { .. })
    ));
}

#[test]
fn duplicate_names_are_rejected_at_construction() {
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(FlowConstant::new("a", 1.0).unwrap().with_variable("Q")),
        Box::new(FlowConstant::new("b", 2.0).unwrap().with_variable("Q")),
    ];
    let err = Flowsheet::new(blocks).unwrap_err();
    assert_eq!(err, SimError::DuplicateName { name: "Q".into() });
}

#[test]
fn states_and_outputs_share_one_namespace() {
    let blocks: Vec<Box<dyn Block>> = vec![
        Box::new(Reservoir::new("lake", m2(1.0), m3(1.0)).unwrap().with_variables("x", "h")),
        Box::new(FlowConstant::new("feed", 1.0).unwrap().with_variable("x")),
    ];
    assert!(matches!(
        Flowsheet::new(blocks),
        Err(SimError::DuplicateName { .. })
    ));
}

#[test]
fn wrong_residual_width_is_a_dimension_mismatch() {
    let blocks: Vec<Box<dyn Block>> = vec![Box::new(WideResidual {
        cache: NodeCache::default(),
    })];
    let mut sheet = Flowsheet::new(blocks).unwrap();
    let err = sheet.initialize(3, 1.0, 0.0).unwrap_err();
    assert_eq!(
        err,
        SimError::DimensionMismatch {
            block: "wide".into(),
            what: "residual".into(),
            expected: 1,
            actual: 2,
        }
    );
}

#[test]
fn wrong_table_width_is_a_dimension_mismatch() {
    let mut sheet = reservoir();
    let xdot = DMatrix::zeros(1, 1);
    let y = DMatrix::zeros(1, 3);
    let err = sheet.step(&xdot, &xdot, &y, &[0.0]).unwrap_err();
    assert!(matches!(err, SimError::DimensionMismatch { expected: 1, actual: 3, .. }));
}

#[test]
fn missing_initial_values_are_rejected() {
    let blocks: Vec<Box<dyn Block>> = vec![Box::new(MissingInitial)];
    assert!(matches!(
        Flowsheet::new(blocks),
        Err(SimError::DimensionMismatch { .. })
    ));
}

#[test]
fn stepping_before_initialize_fails() {
    let mut sheet = reservoir();
    assert_eq!(sheet.update().unwrap_err(), SimError::NotInitialized);
    assert_eq!(sheet.update_until(10.0).unwrap_err(), SimError::NotInitialized);
    assert_eq!(
        sheet.collocation_residuals(&DVector::zeros(0)).unwrap_err(),
        SimError::NotInitialized
    );
    assert_eq!(sheet.time().unwrap_err(), SimError::NotInitialized);
}

#[test]
fn block_errors_surface_unchanged_through_the_solver() {
    // A release with nothing upstream has no level to read.
    let blocks: Vec<Box<dyn Block>> = vec![Box::new(FlowRelease::new("orphan", 1.0).unwrap())];
    let mut sheet = Flowsheet::new(blocks).unwrap();
    let err = sheet.initialize(3, 1.0, 0.0).unwrap_err();
    assert!(matches!(
        err,
        SimError::Component(ComponentError::MissingInput { .. })
    ));
}

#[test]
fn convergence_policy_controls_non_convergence() {
    let no_root = || -> Flowsheet {
        let blocks: Vec<Box<dyn Block>> = vec![Box::new(NoRoot {
            cache: NodeCache::default(),
        })];
        Flowsheet::new(blocks).unwrap()
    };

    let fail = SimOptions::new(3, 1.0, 0.0).with_convergence(ConvergencePolicy::Fail);
    let err = no_root().initialize_with(fail).unwrap_err();
    assert!(matches!(err, SimError::NotConverged { time, .. } if time == 0.0));

    for policy in [ConvergencePolicy::Trust, ConvergencePolicy::Warn] {
        let opts = SimOptions::new(3, 1.0, 0.0).with_convergence(policy);
        let mut sheet = no_root();
        sheet.initialize_with(opts).unwrap();
        let traj = sheet.update_until(2.0).unwrap();
        assert_eq!(traj.len(), 3);
    }
}

#[test]
fn unknown_connection_endpoint_is_rejected() {
    let mut sheet = reservoir();
    let err = sheet
        .connect(lf_core::BlockId::from_index(0), lf_core::BlockId::from_index(4))
        .unwrap_err();
    assert!(matches!(err, SimError::Graph(_)));
}
