//! Finite-element step engine.
//!
//! A [`Flowsheet`] owns an ordered set of blocks, their connectivity and the
//! frozen [`NetworkIndex`]. Each call to [`Flowsheet::update`] solves one
//! finite element: the unknowns are the states, state derivatives and
//! outputs at the element's interior nodes, laid out row-major as
//! `[x | xdot | y]` per node, and the equations are the block residuals
//! (`F1`) stacked on the collocation relation (`F2`).

use crate::collocation::CollocationTable;
use crate::error::{SimError, SimResult};
use crate::options::{ConvergencePolicy, SimOptions};
use crate::record::{Snapshot, Trajectory};
use lf_components::{Block, InputContext, NodeTables, Signals};
use lf_core::{BlockId, ensure_all_finite, whole_steps};
use lf_graph::{BlockLayout, Connections, NetworkIndex};
use lf_solver::{NewtonSolver, RootFinder, RootReport, SolverError};
use nalgebra::{DMatrix, DVector};
use std::fmt;
use tracing::{debug, info, warn};

/// Blocks, connectivity and index: everything a residual evaluation touches.
struct Network {
    blocks: Vec<Box<dyn Block>>,
    connections: Connections,
    index: NetworkIndex,
    /// Global residual columns holding algebraic equations.
    algebraic: Vec<usize>,
}

/// Running state between element boundaries.
#[derive(Debug, Clone)]
struct RunState {
    options: SimOptions,
    table: CollocationTable,
    k: usize,
    time: f64,
    state: DVector<f64>,
    outputs: DVector<f64>,
}

impl RunState {
    fn snapshot(&self, index: &NetworkIndex) -> Snapshot {
        Snapshot::new(self.time, index, &self.state, &self.outputs)
    }

    /// Element-boundary time after `k` elements.
    fn clock(&self, k: usize) -> f64 {
        self.options.start_time + k as f64 * self.options.dt
    }

    fn interior_nodes(&self) -> usize {
        self.table.order() - 1
    }
}

/// A connected network of blocks advanced one finite element at a time.
pub struct Flowsheet {
    network: Network,
    solver: Box<dyn RootFinder>,
    initial_state: DVector<f64>,
    run: Option<RunState>,
}

impl Flowsheet {
    /// Freeze the index over `blocks` (in order) and capture initial states.
    ///
    /// Fails with `DuplicateName` if two blocks declare the same variable.
    pub fn new(blocks: Vec<Box<dyn Block>>) -> SimResult<Self> {
        let layouts: Vec<BlockLayout> = blocks.iter().map(|b| b.layout()).collect();
        let index = NetworkIndex::from_layouts(&layouts)?;

        let mut initial = Vec::with_capacity(index.num_states());
        for (block, layout) in blocks.iter().zip(&layouts) {
            let values = block.initial_states();
            if values.len() != layout.states.len() {
                return Err(SimError::DimensionMismatch {
                    block: block.name().to_string(),
                    what: "initial states".to_string(),
                    expected: layout.states.len(),
                    actual: values.len(),
                });
            }
            initial.extend(values);
        }
        ensure_all_finite(&initial, "initial state")?;

        let connections = Connections::new(blocks.len());
        let algebraic = index.algebraic_residual_columns();
        debug!(
            blocks = blocks.len(),
            states = index.num_states(),
            outputs = index.num_outputs(),
            "flowsheet index built"
        );

        Ok(Self {
            network: Network {
                blocks,
                connections,
                index,
                algebraic,
            },
            solver: Box::new(NewtonSolver::default()),
            initial_state: DVector::from_vec(initial),
            run: None,
        })
    }

    /// Replace the root-finder used for every solve.
    pub fn with_solver(mut self, solver: impl RootFinder + 'static) -> Self {
        self.solver = Box::new(solver);
        self
    }

    /// Route `producer`'s published signals to `consumer`.
    pub fn connect(&mut self, producer: BlockId, consumer: BlockId) -> SimResult<()> {
        self.network.connections.connect(producer, consumer)?;
        Ok(())
    }

    /// Id of the first block with this name.
    pub fn block_id(&self, name: &str) -> Option<BlockId> {
        self.network
            .blocks
            .iter()
            .position(|b| b.name() == name)
            .map(|i| BlockId::from_index(i as u32))
    }

    pub fn block(&self, id: BlockId) -> Option<&dyn Block> {
        self.network.blocks.get(id.slot()).map(|b| &**b)
    }

    pub fn index(&self) -> &NetworkIndex {
        &self.network.index
    }

    pub fn connections(&self) -> &Connections {
        &self.network.connections
    }

    pub fn num_states(&self) -> usize {
        self.network.index.num_states()
    }

    pub fn num_outputs(&self) -> usize {
        self.network.index.num_outputs()
    }

    /// Construction-time initial conditions.
    pub fn initial_state(&self) -> &DVector<f64> {
        &self.initial_state
    }

    /// Running state; the initial conditions before `initialize`.
    pub fn state(&self) -> &DVector<f64> {
        self.run
            .as_ref()
            .map_or(&self.initial_state, |run| &run.state)
    }

    pub fn options(&self) -> Option<&SimOptions> {
        self.run.as_ref().map(|run| &run.options)
    }

    pub fn time(&self) -> SimResult<f64> {
        Ok(self.running()?.time)
    }

    /// Number of elements solved since `initialize`.
    pub fn element(&self) -> SimResult<usize> {
        Ok(self.running()?.k)
    }

    /// Current element-boundary values.
    pub fn snapshot(&self) -> SimResult<Snapshot> {
        Ok(self.running()?.snapshot(&self.network.index))
    }

    /// [`initialize_with`](Self::initialize_with) using the default
    /// convergence policy.
    pub fn initialize(&mut self, n_nodes: usize, dt: f64, start_time: f64) -> SimResult<Snapshot> {
        self.initialize_with(SimOptions::new(n_nodes, dt, start_time))
    }

    /// Reset the run and solve for consistent initial outputs.
    ///
    /// The outputs are found at a single node at `start_time`, with every
    /// state at its initial value and every derivative zero, by solving the
    /// blocks' algebraic equations only.
    pub fn initialize_with(&mut self, options: SimOptions) -> SimResult<Snapshot> {
        self.run = None;
        options.validate()?;
        let table = CollocationTable::new(options.n_nodes)?;
        let state = self.initial_state.clone();
        info!(
            n_nodes = options.n_nodes,
            dt = options.dt,
            start_time = options.start_time,
            states = self.num_states(),
            outputs = self.num_outputs(),
            "initializing flowsheet"
        );

        let outputs = if self.num_outputs() == 0 {
            DVector::zeros(0)
        } else {
            let network = &mut self.network;
            let time = options.start_time;
            let guess = DVector::from_element(network.index.num_outputs(), 1.0);
            let report = solve_captured(&*self.solver, guess, |y| {
                network.algebraic_residuals(&state, time, y)
            })?;
            apply_policy(options.convergence, &report, time, "consistent initialization")?;
            report.x
        };

        let run = RunState {
            time: options.start_time,
            options,
            table,
            k: 0,
            state,
            outputs,
        };
        let snapshot = run.snapshot(&self.network.index);
        self.run = Some(run);
        Ok(snapshot)
    }

    /// Evaluate every block over a set of nodes and return the global
    /// residual table, `nodes x (num_states + num_outputs)`.
    ///
    /// All blocks receive `set_values` before any `update_inputs`, and all
    /// `update_inputs` calls finish before any `residual`.
    pub fn step(
        &mut self,
        xdot: &DMatrix<f64>,
        x: &DMatrix<f64>,
        y: &DMatrix<f64>,
        t: &[f64],
    ) -> SimResult<DMatrix<f64>> {
        self.network.step(NodeTables { xdot, x, y, t })
    }

    /// `[F1; F2]` for the current element, flattened row-major.
    pub fn collocation_residuals(&mut self, z: &DVector<f64>) -> SimResult<DVector<f64>> {
        let run = self.run.as_ref().ok_or(SimError::NotInitialized)?;
        self.network.collocation_residuals(run, z)
    }

    /// Euclidean norm of [`collocation_residuals`](Self::collocation_residuals).
    pub fn residual_norm(&mut self, z: &DVector<f64>) -> SimResult<f64> {
        Ok(self.collocation_residuals(z)?.norm())
    }

    /// Solve one finite element and advance the clock.
    ///
    /// Returns the values at the element's last node.
    pub fn update(&mut self) -> SimResult<Snapshot> {
        let Self {
            network,
            solver,
            run,
            ..
        } = self;
        let run = run.as_mut().ok_or(SimError::NotInitialized)?;

        let s = network.index.num_states();
        let o = network.index.num_outputs();
        let width = 2 * s + o;
        let nodes = run.interior_nodes();
        let end_time = run.clock(run.k + 1);

        let z = if width == 0 {
            DVector::zeros(0)
        } else {
            let current: &RunState = run;
            let guess = DVector::from_element(nodes * width, 1.0);
            let report = solve_captured(&**solver, guess, |z| {
                network.collocation_residuals(current, z)
            })?;
            debug!(
                k = current.k + 1,
                time = end_time,
                residual_norm = report.residual_norm,
                iterations = report.iterations,
                "finite element solved"
            );
            apply_policy(current.options.convergence, &report, end_time, "finite element")?;
            report.x
        };

        let last = (nodes - 1) * width;
        run.state = DVector::from_fn(s, |j, _| z[last + j]);
        run.outputs = DVector::from_fn(o, |j, _| z[last + 2 * s + j]);
        run.k += 1;
        run.time = end_time;
        Ok(run.snapshot(&network.index))
    }

    /// Step `floor((tf - time) / dt)` elements; no reported time exceeds `tf`.
    ///
    /// The returned trajectory starts with the current point, so it holds
    /// one more entry than the number of steps taken.
    pub fn update_until(&mut self, tf: f64) -> SimResult<Trajectory> {
        if !tf.is_finite() {
            return Err(SimError::InvalidArg {
                what: "final time must be finite",
            });
        }
        let run = self.running()?;
        let mut steps = whole_steps(tf - run.time, run.options.dt);
        while steps > 0 && run.clock(run.k + steps) > tf {
            steps -= 1;
        }
        debug!(from = run.time, to = tf, steps, "stepping flowsheet");

        let mut trajectory = Trajectory::default();
        trajectory.push(&run.snapshot(&self.network.index));
        for _ in 0..steps {
            let snapshot = self.update()?;
            trajectory.push(&snapshot);
        }
        Ok(trajectory)
    }

    fn running(&self) -> SimResult<&RunState> {
        self.run.as_ref().ok_or(SimError::NotInitialized)
    }
}

impl fmt::Debug for Flowsheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flowsheet")
            .field("blocks", &self.network.blocks.len())
            .field("states", &self.num_states())
            .field("outputs", &self.num_outputs())
            .field("edges", &self.network.connections.edge_count())
            .field("run", &self.run)
            .finish()
    }
}

impl Network {
    fn step(&mut self, tables: NodeTables<'_>) -> SimResult<DMatrix<f64>> {
        let n = tables.n_nodes();
        let s = self.index.num_states();
        let o = self.index.num_outputs();
        check_table("state derivative table", tables.xdot, n, s)?;
        check_table("state table", tables.x, n, s)?;
        check_table("output table", tables.y, n, o)?;

        for (block, slots) in self.blocks.iter_mut().zip(self.index.blocks()) {
            block.set_values(tables.block_view(slots))?;
        }

        let signals: Vec<Signals> = self.blocks.iter().map(|b| b.signals()).collect();
        for (i, block) in self.blocks.iter_mut().enumerate() {
            let ctx = InputContext::new(
                BlockId::from_index(i as u32),
                &self.connections,
                &signals,
                &self.index,
                tables,
            );
            block.update_inputs(&ctx)?;
        }

        let mut table = DMatrix::zeros(n, self.index.num_residuals());
        for (block, slots) in self.blocks.iter().zip(self.index.blocks()) {
            let r = block.residual()?;
            let width = slots.residuals.len();
            if r.nrows() != n {
                return Err(residual_mismatch(&**block, "residual rows", n, r.nrows()));
            }
            if r.ncols() != width {
                return Err(residual_mismatch(&**block, "residual", width, r.ncols()));
            }
            table.columns_mut(slots.residuals.start, width).copy_from(&r);
        }
        Ok(table)
    }

    /// Algebraic residuals at one node with derivatives held at zero.
    fn algebraic_residuals(
        &mut self,
        state: &DVector<f64>,
        time: f64,
        y: &DVector<f64>,
    ) -> SimResult<DVector<f64>> {
        let s = self.index.num_states();
        let xdot = DMatrix::zeros(1, s);
        let x = DMatrix::from_row_slice(1, s, state.as_slice());
        let y = DMatrix::from_row_slice(1, y.len(), y.as_slice());
        let t = [time];
        let table = self.step(NodeTables {
            xdot: &xdot,
            x: &x,
            y: &y,
            t: &t,
        })?;
        Ok(DVector::from_iterator(
            self.algebraic.len(),
            self.algebraic.iter().map(|&c| table[(0, c)]),
        ))
    }

    fn collocation_residuals(&mut self, run: &RunState, z: &DVector<f64>) -> SimResult<DVector<f64>> {
        let s = self.index.num_states();
        let o = self.index.num_outputs();
        let width = 2 * s + o;
        let nodes = run.interior_nodes();
        if z.len() != nodes * width {
            return Err(SimError::DimensionMismatch {
                block: "flowsheet".to_string(),
                what: "collocation unknowns".to_string(),
                expected: nodes * width,
                actual: z.len(),
            });
        }

        let x = DMatrix::from_fn(nodes, s, |i, j| z[i * width + j]);
        let xdot = DMatrix::from_fn(nodes, s, |i, j| z[i * width + s + j]);
        let y = DMatrix::from_fn(nodes, o, |i, j| z[i * width + 2 * s + j]);
        let dt = run.options.dt;
        let t: Vec<f64> = run
            .table
            .interior_fractions()
            .iter()
            .map(|frac| run.time + frac * dt)
            .collect();

        let f1 = self.step(NodeTables {
            xdot: &xdot,
            x: &x,
            y: &y,
            t: &t,
        })?;

        let mx = &run.table.matrix * &xdot;
        let f2 = DMatrix::from_fn(nodes, s, |i, j| dt * mx[(i, j)] - x[(i, j)] + run.state[j]);

        let mut out = Vec::with_capacity(z.len());
        for i in 0..nodes {
            out.extend(f1.row(i).iter().copied());
        }
        for i in 0..nodes {
            out.extend(f2.row(i).iter().copied());
        }
        Ok(DVector::from_vec(out))
    }
}

fn check_table(what: &str, table: &DMatrix<f64>, rows: usize, cols: usize) -> SimResult<()> {
    if table.nrows() != rows {
        return Err(SimError::DimensionMismatch {
            block: "flowsheet".to_string(),
            what: format!("{what} rows"),
            expected: rows,
            actual: table.nrows(),
        });
    }
    if table.ncols() != cols {
        return Err(SimError::DimensionMismatch {
            block: "flowsheet".to_string(),
            what: what.to_string(),
            expected: cols,
            actual: table.ncols(),
        });
    }
    Ok(())
}

fn residual_mismatch(block: &dyn Block, what: &str, expected: usize, actual: usize) -> SimError {
    SimError::DimensionMismatch {
        block: block.name().to_string(),
        what: what.to_string(),
        expected,
        actual,
    }
}

/// Run the root-finder on a fallible residual.
///
/// The first error raised by `residual` aborts the solve and is returned
/// as-is instead of the solver's wrapper.
fn solve_captured<F>(
    solver: &dyn RootFinder,
    guess: DVector<f64>,
    mut residual: F,
) -> SimResult<RootReport>
where
    F: FnMut(&DVector<f64>) -> SimResult<DVector<f64>>,
{
    let mut failure: Option<SimError> = None;
    let mut wrapped = |z: &DVector<f64>| match residual(z) {
        Ok(r) => Ok(r),
        Err(e) => {
            let what = e.to_string();
            failure.get_or_insert(e);
            Err(SolverError::ResidualFailed { what })
        }
    };
    let outcome = solver.solve(&mut wrapped, guess);
    outcome.map_err(|e| failure.take().unwrap_or_else(|| e.into()))
}

fn apply_policy(
    policy: ConvergencePolicy,
    report: &RootReport,
    time: f64,
    what: &str,
) -> SimResult<()> {
    if report.converged {
        return Ok(());
    }
    match policy {
        ConvergencePolicy::Trust => Ok(()),
        ConvergencePolicy::Warn => {
            warn!(
                time,
                residual_norm = report.residual_norm,
                iterations = report.iterations,
                "{what}: root-finder did not converge, accepting result"
            );
            Ok(())
        }
        ConvergencePolicy::Fail => Err(SimError::NotConverged {
            time,
            residual_norm: report.residual_norm,
        }),
    }
}
