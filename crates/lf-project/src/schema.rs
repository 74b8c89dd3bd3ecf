//! Project schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    #[serde(default = "default_version")]
    pub version: u32,
    pub name: String,
    pub run: RunDef,
    #[serde(default)]
    pub blocks: Vec<BlockDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    #[serde(default)]
    pub timeseries: Vec<TimeseriesDef>,
}

fn default_version() -> u32 {
    LATEST_VERSION
}

/// Time grid and solver policy for a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunDef {
    #[serde(default = "default_n_nodes")]
    pub n_nodes: usize,
    pub time_step_s: f64,
    #[serde(default)]
    pub start_time_s: f64,
    pub end_time_s: f64,
    #[serde(default)]
    pub convergence: ConvergenceDef,
}

fn default_n_nodes() -> usize {
    5
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceDef {
    Trust,
    #[default]
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockDef {
    /// Block name; also the prefix of its default variable names.
    pub id: String,
    pub kind: BlockKindDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKindDef {
    Reservoir {
        area_m2: f64,
        initial_volume_m3: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume_var: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level_var: Option<String>,
    },
    /// Reservoir whose level is read off a volume to level table.
    StorageReservoir {
        /// Strictly increasing volumes of the storage table.
        volumes_m3: Vec<f64>,
        levels_m: Vec<f64>,
        initial_volume_m3: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        volume_var: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level_var: Option<String>,
    },
    Tank {
        area_m2: f64,
        initial_mass_kg: f64,
        #[serde(default = "default_density")]
        density_kg_m3: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mass_var: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height_var: Option<String>,
    },
    FlowRelease {
        cv: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow_var: Option<String>,
    },
    Orifice {
        area_m2: f64,
        cd: f64,
        #[serde(default = "default_density")]
        density_kg_m3: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow_var: Option<String>,
    },
    FlowConstant {
        rate: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow_var: Option<String>,
    },
    FlowSource {
        /// Id of an entry in `timeseries`.
        series: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        flow_var: Option<String>,
    },
}

fn default_density() -> f64 {
    1000.0
}

impl BlockKindDef {
    pub fn type_name(&self) -> &'static str {
        match self {
            BlockKindDef::Reservoir { .. } => "reservoir",
            BlockKindDef::StorageReservoir { .. } => "storage_reservoir",
            BlockKindDef::Tank { .. } => "tank",
            BlockKindDef::FlowRelease { .. } => "flow_release",
            BlockKindDef::Orifice { .. } => "orifice",
            BlockKindDef::FlowConstant { .. } => "flow_constant",
            BlockKindDef::FlowSource { .. } => "flow_source",
        }
    }
}

/// Directed edge: `from` publishes to `to`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeseriesDef {
    pub id: String,
    #[serde(default)]
    pub interpolation: InterpolationDef,
    pub source: TimeseriesSourceDef,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationDef {
    Linear,
    /// Hold the last sample (step input).
    #[default]
    Previous,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimeseriesSourceDef {
    Inline {
        t: Vec<f64>,
        values: Vec<f64>,
    },
    /// Column of a CSV file whose time column is named `t`.
    Csv {
        path: PathBuf,
        column: String,
    },
}
