//! CSV import of input series and export of trajectories.

use crate::{ProjectError, ProjectResult};
use lf_graph::NetworkIndex;
use lf_sim::Trajectory;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

/// Name of the time column in imported CSV files.
pub const TIME_COLUMN: &str = "t";

/// Columns of a numeric CSV file, keyed by header name.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvColumns {
    pub t: Vec<f64>,
    pub columns: BTreeMap<String, Vec<f64>>,
}

impl CsvColumns {
    pub fn column(&self, name: &str) -> ProjectResult<&[f64]> {
        self.columns
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| ProjectError::Csv {
                line: 1,
                what: format!("no column named '{name}'"),
            })
    }
}

pub fn read_timeseries_csv(path: &Path) -> ProjectResult<CsvColumns> {
    let content = std::fs::read_to_string(path)?;
    parse_timeseries_csv(&content)
}

/// Parse comma-separated numeric columns with a header row.
///
/// Blank lines and lines starting with `#` are skipped, fields may be quoted.
/// One column must be named `t`.
pub fn parse_timeseries_csv(content: &str) -> ProjectResult<CsvColumns> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let names: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    if names.is_empty() {
        return Err(ProjectError::Csv {
            line: 1,
            what: "file is empty".to_string(),
        });
    }
    let time_col = names
        .iter()
        .position(|n| n == TIME_COLUMN)
        .ok_or_else(|| ProjectError::Csv {
            line: 1,
            what: format!("header has no '{TIME_COLUMN}' column"),
        })?;

    let mut data: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let line = record.position().map_or(0, |p| p.line() as usize);
        if record.len() != names.len() {
            return Err(ProjectError::Csv {
                line,
                what: format!("expected {} fields, found {}", names.len(), record.len()),
            });
        }
        for (col, field) in data.iter_mut().zip(record.iter()) {
            let value = field.parse::<f64>().map_err(|_| ProjectError::Csv {
                line,
                what: format!("'{field}' is not a number"),
            })?;
            col.push(value);
        }
    }

    let t = std::mem::take(&mut data[time_col]);
    let columns = names
        .into_iter()
        .zip(data)
        .enumerate()
        .filter(|(i, _)| *i != time_col)
        .map(|(_, column)| column)
        .collect();
    Ok(CsvColumns { t, columns })
}

fn csv_error(err: csv::Error) -> ProjectError {
    ProjectError::Csv {
        line: err.position().map_or(0, |p| p.line() as usize),
        what: err.to_string(),
    }
}

/// Write a trajectory as CSV: `t`, then states and outputs in index order.
pub fn write_trajectory_csv<W: Write>(
    mut writer: W,
    trajectory: &Trajectory,
    index: &NetworkIndex,
) -> ProjectResult<()> {
    let states: Vec<&[f64]> = lookup_all(index.state_names(), &trajectory.states)?;
    let outputs: Vec<&[f64]> = lookup_all(index.output_names(), &trajectory.outputs)?;

    let header: Vec<&str> = std::iter::once(TIME_COLUMN)
        .chain(index.state_names().iter().map(String::as_str))
        .chain(index.output_names().iter().map(String::as_str))
        .collect();
    writeln!(writer, "{}", header.join(","))?;

    for (row, t) in trajectory.time.iter().enumerate() {
        let mut line = t.to_string();
        for column in states.iter().chain(&outputs) {
            line.push(',');
            line.push_str(&column[row].to_string());
        }
        writeln!(writer, "{line}")?;
    }
    Ok(())
}

/// Serializable form of a trajectory for JSON export.
#[derive(Debug, Clone, Serialize)]
pub struct TrajectoryExport<'a> {
    pub time: &'a [f64],
    pub states: &'a BTreeMap<String, Vec<f64>>,
    pub outputs: &'a BTreeMap<String, Vec<f64>>,
}

impl<'a> From<&'a Trajectory> for TrajectoryExport<'a> {
    fn from(t: &'a Trajectory) -> Self {
        Self {
            time: &t.time,
            states: &t.states,
            outputs: &t.outputs,
        }
    }
}

pub fn write_trajectory_json<W: Write>(writer: W, trajectory: &Trajectory) -> ProjectResult<()> {
    serde_json::to_writer_pretty(writer, &TrajectoryExport::from(trajectory))?;
    Ok(())
}

fn lookup_all<'a>(
    names: &[String],
    series: &'a BTreeMap<String, Vec<f64>>,
) -> ProjectResult<Vec<&'a [f64]>> {
    names
        .iter()
        .map(|name| {
            series
                .get(name)
                .map(Vec::as_slice)
                .ok_or_else(|| ProjectError::Csv {
                    line: 0,
                    what: format!("trajectory has no series '{name}'"),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_graph::BlockLayout;

    #[test]
    fn parses_columns_and_skips_comments() {
        let csv = "# inflow schedule\nt, q, spare\n0, 1.5, 9\n\n10, 2.5, 8\n";
        let parsed = parse_timeseries_csv(csv).unwrap();
        assert_eq!(parsed.t, vec![0.0, 10.0]);
        assert_eq!(parsed.column("q").unwrap(), &[1.5, 2.5]);
        assert_eq!(parsed.column("spare").unwrap(), &[9.0, 8.0]);
        assert!(parsed.column("t").is_err());
    }

    #[test]
    fn reports_bad_rows_with_line_numbers() {
        let err = parse_timeseries_csv("t,q\n0,1\n1,x\n").unwrap_err();
        assert!(matches!(err, ProjectError::Csv { line: 3, .. }));

        let err = parse_timeseries_csv("t,q\n0\n").unwrap_err();
        assert!(matches!(err, ProjectError::Csv { line: 2, .. }));

        let err = parse_timeseries_csv("time,q\n0,1\n").unwrap_err();
        assert!(matches!(err, ProjectError::Csv { line: 1, .. }));
    }

    #[test]
    fn accepts_quoted_headers_and_fields() {
        let parsed = parse_timeseries_csv("\"t\",\"Q\"\n0,1.5\n10,\"2.5\"\n").unwrap();
        assert_eq!(parsed.t, vec![0.0, 10.0]);
        assert_eq!(parsed.column("Q").unwrap(), &[1.5, 2.5]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            parse_timeseries_csv(""),
            Err(ProjectError::Csv { line: 1, .. })
        ));
        assert!(matches!(
            parse_timeseries_csv("# only a comment\n"),
            Err(ProjectError::Csv { line: 1, .. })
        ));
    }

    #[test]
    fn trajectory_csv_follows_index_order() {
        let layouts = [BlockLayout::new(["V"], ["h", "Q"])];
        let index = NetworkIndex::from_layouts(&layouts).unwrap();
        let mut traj = Trajectory::default();
        traj.time = vec![0.0, 1.0];
        traj.states.insert("V".into(), vec![8.0, 7.5]);
        traj.outputs.insert("h".into(), vec![4.0, 3.75]);
        traj.outputs.insert("Q".into(), vec![0.5, 0.25]);

        let mut out = Vec::new();
        write_trajectory_csv(&mut out, &traj, &index).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "t,V,h,Q\n0,8,4,0.5\n1,7.5,3.75,0.25\n");

        let mut json = Vec::new();
        write_trajectory_json(&mut json, &traj).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&json).unwrap();
        assert_eq!(value["outputs"]["Q"][1], 0.25);
    }
}
