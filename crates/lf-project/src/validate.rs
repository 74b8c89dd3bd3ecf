//! Project validation logic.

use crate::schema::{
    BlockDef, BlockKindDef, LATEST_VERSION, Project, RunDef, TimeseriesDef, TimeseriesSourceDef,
};
use std::collections::HashSet;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_run(&project.run)?;

    let mut series_ids = HashSet::new();
    for series in &project.timeseries {
        if !series_ids.insert(series.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: series.id.clone(),
                context: "timeseries".to_string(),
            });
        }
        validate_timeseries(series)?;
    }

    let mut block_ids = HashSet::new();
    for block in &project.blocks {
        if !block_ids.insert(block.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: block.id.clone(),
                context: "blocks".to_string(),
            });
        }
        validate_block(block, &series_ids)?;
    }

    for conn in &project.connections {
        for (id, end) in [(&conn.from, "from"), (&conn.to, "to")] {
            if !block_ids.contains(id.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: id.clone(),
                    context: format!("connection {end}"),
                });
            }
        }
    }

    Ok(())
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    if !(2..=6).contains(&run.n_nodes) {
        return Err(invalid("run.n_nodes", run.n_nodes, "must be between 2 and 6"));
    }
    if !run.time_step_s.is_finite() || run.time_step_s <= 0.0 {
        return Err(invalid("run.time_step_s", run.time_step_s, "must be positive"));
    }
    if !run.start_time_s.is_finite() {
        return Err(invalid("run.start_time_s", run.start_time_s, "must be finite"));
    }
    if !run.end_time_s.is_finite() || run.end_time_s < run.start_time_s {
        return Err(invalid(
            "run.end_time_s",
            run.end_time_s,
            "must be finite and not before start_time_s",
        ));
    }
    Ok(())
}

fn validate_timeseries(series: &TimeseriesDef) -> Result<(), ValidationError> {
    if let TimeseriesSourceDef::Inline { t, values } = &series.source {
        let field = format!("timeseries '{}'", series.id);
        if t.is_empty() {
            return Err(invalid(&field, 0, "has no samples"));
        }
        if t.len() != values.len() {
            return Err(invalid(
                &field,
                format!("{} times, {} values", t.len(), values.len()),
                "times and values must have equal length",
            ));
        }
        if t.windows(2).any(|w| w[1] <= w[0]) {
            return Err(invalid(&field, "t", "times must be strictly increasing"));
        }
    }
    Ok(())
}

fn validate_block(block: &BlockDef, series_ids: &HashSet<&str>) -> Result<(), ValidationError> {
    let positive = |name: &str, value: f64| {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(invalid(&format!("{}.{name}", block.id), value, "must be positive"))
        }
    };
    let finite = |name: &str, value: f64| {
        if value.is_finite() {
            Ok(())
        } else {
            Err(invalid(&format!("{}.{name}", block.id), value, "must be finite"))
        }
    };

    match &block.kind {
        BlockKindDef::Reservoir {
            area_m2,
            initial_volume_m3,
            ..
        } => {
            positive("area_m2", *area_m2)?;
            finite("initial_volume_m3", *initial_volume_m3)
        }
        BlockKindDef::StorageReservoir {
            volumes_m3,
            levels_m,
            initial_volume_m3,
            ..
        } => {
            let field = format!("{}.volumes_m3", block.id);
            if volumes_m3.len() < 2 || volumes_m3.len() != levels_m.len() {
                return Err(invalid(
                    &field,
                    format!("{} volumes, {} levels", volumes_m3.len(), levels_m.len()),
                    "need at least two volumes, one level each",
                ));
            }
            if volumes_m3.iter().chain(levels_m).any(|v| !v.is_finite()) {
                return Err(invalid(&field, "non-finite", "table entries must be finite"));
            }
            if volumes_m3.windows(2).any(|w| w[1] <= w[0]) {
                return Err(invalid(&field, "", "volumes must be strictly increasing"));
            }
            finite("initial_volume_m3", *initial_volume_m3)?;
            let (lo, hi) = (volumes_m3[0], volumes_m3[volumes_m3.len() - 1]);
            if !(lo..=hi).contains(initial_volume_m3) {
                return Err(invalid(
                    &format!("{}.initial_volume_m3", block.id),
                    initial_volume_m3,
                    "must lie within the storage table",
                ));
            }
            Ok(())
        }
        BlockKindDef::Tank {
            area_m2,
            initial_mass_kg,
            density_kg_m3,
            ..
        } => {
            positive("area_m2", *area_m2)?;
            positive("density_kg_m3", *density_kg_m3)?;
            finite("initial_mass_kg", *initial_mass_kg)
        }
        BlockKindDef::FlowRelease { cv, .. } => finite("cv", *cv),
        BlockKindDef::Orifice {
            area_m2,
            cd,
            density_kg_m3,
            ..
        } => {
            positive("area_m2", *area_m2)?;
            positive("cd", *cd)?;
            positive("density_kg_m3", *density_kg_m3)
        }
        BlockKindDef::FlowConstant { rate, .. } => finite("rate", *rate),
        BlockKindDef::FlowSource { series, .. } => {
            if series_ids.contains(series.as_str()) {
                Ok(())
            } else {
                Err(ValidationError::MissingReference {
                    id: series.clone(),
                    context: format!("block '{}' series", block.id),
                })
            }
        }
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
