//! Turn a validated project into a ready-to-initialize flowsheet.

use crate::schema::{
    BlockDef, BlockKindDef, ConvergenceDef, InterpolationDef, Project, TimeseriesDef,
    TimeseriesSourceDef,
};
use crate::series::read_timeseries_csv;
use crate::{ProjectError, ProjectResult};
use lf_components::{
    Block, FlowConstant, FlowRelease, FlowSource, Interpolation, Orifice, Reservoir,
    StorageReservoir, Tank, Timeseries,
};
use lf_core::units::{kg, kgpm3, m2, m3};
use lf_sim::{ConvergencePolicy, Flowsheet, SimOptions};
use std::collections::HashMap;
use tracing::debug;

/// A flowsheet assembled from a project, with the run settings it came with.
#[derive(Debug)]
pub struct BuiltProject {
    pub flowsheet: Flowsheet,
    pub options: SimOptions,
    pub end_time: f64,
}

impl BuiltProject {
    /// Initialize with the project's options and integrate to `end_time`.
    pub fn run(&mut self) -> ProjectResult<lf_sim::Trajectory> {
        self.flowsheet.initialize_with(self.options.clone())?;
        Ok(self.flowsheet.update_until(self.end_time)?)
    }
}

impl From<ConvergenceDef> for ConvergencePolicy {
    fn from(def: ConvergenceDef) -> Self {
        match def {
            ConvergenceDef::Trust => ConvergencePolicy::Trust,
            ConvergenceDef::Warn => ConvergencePolicy::Warn,
            ConvergenceDef::Fail => ConvergencePolicy::Fail,
        }
    }
}

impl From<InterpolationDef> for Interpolation {
    fn from(def: InterpolationDef) -> Self {
        match def {
            InterpolationDef::Linear => Interpolation::Linear,
            InterpolationDef::Previous => Interpolation::Previous,
        }
    }
}

/// Build the flowsheet described by `project`.
///
/// CSV paths are opened as written. [`crate::load_yaml`] resolves relative
/// ones against the project file's directory.
pub fn build_flowsheet(project: &Project) -> ProjectResult<BuiltProject> {
    let mut series = HashMap::new();
    for def in &project.timeseries {
        series.insert(def.id.as_str(), load_timeseries(def)?);
    }

    let blocks = project
        .blocks
        .iter()
        .map(|def| build_block(def, &series))
        .collect::<ProjectResult<Vec<_>>>()?;

    let mut flowsheet = Flowsheet::new(blocks)?;
    for conn in &project.connections {
        let from = block_id(&flowsheet, &conn.from)?;
        let to = block_id(&flowsheet, &conn.to)?;
        flowsheet.connect(from, to)?;
    }

    debug!(
        project = %project.name,
        blocks = project.blocks.len(),
        connections = project.connections.len(),
        series = series.len(),
        "Built flowsheet from project"
    );

    let options = SimOptions::new(
        project.run.n_nodes,
        project.run.time_step_s,
        project.run.start_time_s,
    )
    .with_convergence(project.run.convergence.into());
    options.validate()?;

    Ok(BuiltProject {
        flowsheet,
        options,
        end_time: project.run.end_time_s,
    })
}

fn block_id(flowsheet: &Flowsheet, name: &str) -> ProjectResult<lf_core::BlockId> {
    flowsheet
        .block_id(name)
        .ok_or_else(|| ProjectError::UnknownBlock {
            name: name.to_string(),
        })
}

fn load_timeseries(def: &TimeseriesDef) -> ProjectResult<Timeseries> {
    let (t, values) = match &def.source {
        TimeseriesSourceDef::Inline { t, values } => (t.clone(), values.clone()),
        TimeseriesSourceDef::Csv { path, column } => {
            let csv = read_timeseries_csv(path)?;
            let values = csv.column(column)?.to_vec();
            debug!(series = %def.id, path = %path.display(), samples = values.len(), "Read CSV series");
            (csv.t, values)
        }
    };
    Ok(Timeseries::new(t, values, def.interpolation.into())?)
}

fn build_block(
    def: &BlockDef,
    series: &HashMap<&str, Timeseries>,
) -> ProjectResult<Box<dyn Block>> {
    let name = def.id.as_str();
    let block: Box<dyn Block> = match &def.kind {
        BlockKindDef::Reservoir {
            area_m2,
            initial_volume_m3,
            volume_var,
            level_var,
        } => {
            let mut block = Reservoir::new(name, m2(*area_m2), m3(*initial_volume_m3))?;
            if volume_var.is_some() || level_var.is_some() {
                let volume = volume_var.clone().unwrap_or_else(|| format!("{name}.V"));
                let level = level_var.clone().unwrap_or_else(|| format!("{name}.h"));
                block = block.with_variables(volume, level);
            }
            Box::new(block)
        }
        BlockKindDef::StorageReservoir {
            volumes_m3,
            levels_m,
            initial_volume_m3,
            volume_var,
            level_var,
        } => {
            let mut block = StorageReservoir::new(
                name,
                volumes_m3.clone(),
                levels_m.clone(),
                m3(*initial_volume_m3),
            )?;
            if volume_var.is_some() || level_var.is_some() {
                let volume = volume_var.clone().unwrap_or_else(|| format!("{name}.V"));
                let level = level_var.clone().unwrap_or_else(|| format!("{name}.h"));
                block = block.with_variables(volume, level);
            }
            Box::new(block)
        }
        BlockKindDef::Tank {
            area_m2,
            initial_mass_kg,
            density_kg_m3,
            mass_var,
            height_var,
        } => {
            let mut block = Tank::new(
                name,
                m2(*area_m2),
                kgpm3(*density_kg_m3),
                kg(*initial_mass_kg),
            )?;
            if mass_var.is_some() || height_var.is_some() {
                let mass = mass_var.clone().unwrap_or_else(|| format!("{name}.m"));
                let height = height_var.clone().unwrap_or_else(|| format!("{name}.h"));
                block = block.with_variables(mass, height);
            }
            Box::new(block)
        }
        BlockKindDef::FlowRelease { cv, flow_var } => {
            let block = FlowRelease::new(name, *cv)?;
            Box::new(match flow_var {
                Some(var) => block.with_variable(var.clone()),
                None => block,
            })
        }
        BlockKindDef::Orifice {
            area_m2,
            cd,
            density_kg_m3,
            flow_var,
        } => {
            let block = Orifice::new(name, m2(*area_m2), *cd, kgpm3(*density_kg_m3))?;
            Box::new(match flow_var {
                Some(var) => block.with_variable(var.clone()),
                None => block,
            })
        }
        BlockKindDef::FlowConstant { rate, flow_var } => {
            let block = FlowConstant::new(name, *rate)?;
            Box::new(match flow_var {
                Some(var) => block.with_variable(var.clone()),
                None => block,
            })
        }
        BlockKindDef::FlowSource {
            series: series_id,
            flow_var,
        } => {
            let schedule =
                series
                    .get(series_id.as_str())
                    .cloned()
                    .ok_or_else(|| ProjectError::UnknownSeries {
                        id: series_id.clone(),
                    })?;
            let block = FlowSource::new(name, schedule);
            Box::new(match flow_var {
                Some(var) => block.with_variable(var.clone()),
                None => block,
            })
        }
    };
    debug!(block = name, kind = def.kind.type_name(), "Created block");
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ConnectionDef, RunDef};

    fn project() -> Project {
        Project {
            version: crate::LATEST_VERSION,
            name: "feed".into(),
            run: RunDef {
                n_nodes: 3,
                time_step_s: 0.5,
                start_time_s: 1.0,
                end_time_s: 3.0,
                convergence: ConvergenceDef::Fail,
            },
            blocks: vec![
                BlockDef {
                    id: "pump".into(),
                    kind: BlockKindDef::FlowConstant {
                        rate: 0.25,
                        flow_var: Some("qin".into()),
                    },
                },
                BlockDef {
                    id: "pond".into(),
                    kind: BlockKindDef::Reservoir {
                        area_m2: 1.0,
                        initial_volume_m3: 2.0,
                        volume_var: None,
                        level_var: Some("stage".into()),
                    },
                },
            ],
            connections: vec![ConnectionDef {
                from: "pump".into(),
                to: "pond".into(),
            }],
            timeseries: Vec::new(),
        }
    }

    #[test]
    fn options_and_names_come_from_project() {
        let built = build_flowsheet(&project()).unwrap();
        assert_eq!(built.options.n_nodes, 3);
        assert_eq!(built.options.start_time, 1.0);
        assert_eq!(built.options.convergence, ConvergencePolicy::Fail);
        assert_eq!(built.end_time, 3.0);

        let index = built.flowsheet.index();
        assert_eq!(index.state_names(), &["pond.V".to_string()]);
        assert_eq!(
            index.output_names(),
            &["qin".to_string(), "stage".to_string()]
        );
        assert_eq!(built.flowsheet.connections().edge_count(), 1);
    }

    #[test]
    fn constant_feed_fills_pond_linearly() {
        let mut built = build_flowsheet(&project()).unwrap();
        let traj = built.run().unwrap();
        assert_eq!(traj.time, vec![1.0, 1.5, 2.0, 2.5, 3.0]);
        let volume = traj.get("pond.V").unwrap();
        assert!((volume[4] - 2.5).abs() < 1e-8);
        let stage = traj.get("stage").unwrap();
        assert!((stage[4] - 2.5).abs() < 1e-8);
    }

    #[test]
    fn storage_table_level_crosses_its_kink() {
        let mut p = project();
        p.blocks[0].kind = BlockKindDef::FlowConstant {
            rate: 0.5,
            flow_var: None,
        };
        // 0..1 m3 rises 1 m, 1..3 m3 rises 1 m
        p.blocks[1].kind = BlockKindDef::StorageReservoir {
            volumes_m3: vec![0.0, 1.0, 3.0],
            levels_m: vec![0.0, 1.0, 2.0],
            initial_volume_m3: 0.5,
            volume_var: None,
            level_var: None,
        };
        let mut built = build_flowsheet(&p).unwrap();
        let traj = built.run().unwrap();

        let volume = traj.get("pond.V").unwrap();
        let level = traj.get("pond.h").unwrap();
        assert!((level[0] - 0.5).abs() < 1e-8);
        assert!((volume[2] - 1.0).abs() < 1e-8);
        assert!((level[2] - 1.0).abs() < 1e-8);
        assert!((volume[4] - 1.5).abs() < 1e-8);
        assert!((level[4] - 1.25).abs() < 1e-8);
    }
}
