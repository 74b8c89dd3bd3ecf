//! lf-project: project file format, validation, and flowsheet assembly.

pub mod build;
pub mod schema;
pub mod series;
pub mod validate;

pub use build::{BuiltProject, build_flowsheet};
pub use schema::*;
pub use series::{
    CsvColumns, parse_timeseries_csv, read_timeseries_csv, write_trajectory_csv,
    write_trajectory_json,
};
pub use validate::{ValidationError, validate_project};

use lf_components::ComponentError;
use lf_sim::SimError;
use std::path::Path;
use tracing::debug;

pub type ProjectResult<T> = Result<T, ProjectError>;

#[derive(thiserror::Error, Debug)]
pub enum ProjectError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown block: {name}")]
    UnknownBlock { name: String },

    #[error("Unknown timeseries: {id}")]
    UnknownSeries { id: String },

    #[error("CSV error at line {line}: {what}")]
    Csv { line: usize, what: String },

    #[error("Block error: {0}")]
    Component(#[from] ComponentError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load and validate a project. Relative CSV paths are resolved against the
/// directory containing `path`.
pub fn load_yaml(path: &Path) -> ProjectResult<Project> {
    let content = std::fs::read_to_string(path)?;
    let mut project: Project = serde_yaml::from_str(&content)?;
    validate_project(&project)?;
    debug!(path = %path.display(), project = %project.name, "Loaded project");

    if let Some(dir) = path.parent() {
        for series in &mut project.timeseries {
            if let TimeseriesSourceDef::Csv { path, .. } = &mut series.source {
                if path.is_relative() {
                    *path = dir.join(&*path);
                }
            }
        }
    }
    Ok(project)
}

pub fn save_yaml(path: &Path, project: &Project) -> ProjectResult<()> {
    validate_project(project)?;
    let content = serde_yaml::to_string(project)?;
    std::fs::write(path, content)?;
    Ok(())
}
