use lf_core::units::constants::G_MPS2;
use lf_project::{build_flowsheet, load_yaml, write_trajectory_csv};
use std::path::{Path, PathBuf};

fn demo(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos/projects")
        .join(name)
}

#[test]
fn demos_load_and_validate() {
    for name in ["draining_tank.yaml", "reservoir_cascade.yaml"] {
        let project =
            load_yaml(&demo(name)).unwrap_or_else(|e| panic!("Failed to load {name}: {e}"));
        build_flowsheet(&project).unwrap_or_else(|e| panic!("Failed to build {name}: {e}"));
    }
}

#[test]
fn draining_tank_demo_tracks_closed_form() {
    let project = load_yaml(&demo("draining_tank.yaml")).unwrap();
    let mut built = build_flowsheet(&project).unwrap();
    let traj = built.run().unwrap();

    assert_eq!(traj.len(), 51);
    assert_eq!(traj.last_time(), Some(80000.0));

    let k = 5e-4 * 0.62 * (2.0 * G_MPS2).sqrt() / (2.0 * 16.0);
    let heights = traj.get("tank.h").unwrap();
    for (t, h) in traj.time.iter().zip(heights).filter(|(t, _)| **t <= 6e4) {
        let exact = (10f64.sqrt() - k * t).powi(2);
        assert!((h - exact).abs() < 5e-2, "t = {t}: h = {h}, exact = {exact}");
    }
}

#[test]
fn cascade_reads_csv_relative_to_project() {
    let project = load_yaml(&demo("reservoir_cascade.yaml")).unwrap();
    let mut built = build_flowsheet(&project).unwrap();
    let traj = built.run().unwrap();

    assert_eq!(traj.len(), 25);
    let inflow = traj.get("inflow.Q").unwrap();
    assert!((inflow[0] - 3.0).abs() < 1e-9);
    assert!((inflow[6] - 8.0).abs() < 1e-9);
    assert!((inflow[9] - 10.0).abs() < 1e-9);

    let stage = traj.get("lower.stage").unwrap();
    assert!((stage[0] - 1.5).abs() < 1e-9);
    assert!(traj.get("outlet.discharge").is_some());

    let mut out = Vec::new();
    write_trajectory_csv(&mut out, &traj, built.flowsheet.index()).unwrap();
    let text = String::from_utf8(out).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        "t,upper.V,lower.V,inflow.Q,upper.h,spillway.Q,lower.stage,outlet.discharge"
    );
    assert_eq!(text.lines().count(), 26);
}
