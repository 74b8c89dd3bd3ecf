use clap::{Parser, Subcommand, ValueEnum};
use lf_core::BlockId;
use lf_project::{ProjectResult, build_flowsheet, load_yaml};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::Level;

#[derive(Parser)]
#[command(name = "lf-cli")]
#[command(about = "LumpFlow CLI - lumped-parameter network simulation by collocation", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// List the blocks of a project and the variables they own
    Blocks {
        /// Path to the project YAML file
        project_path: PathBuf,
    },
    /// Run a simulation and export the trajectory
    Run {
        /// Path to the project YAML file
        project_path: PathBuf,
        /// Output file (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
        /// Override the element width in seconds
        #[arg(long)]
        dt: Option<f64>,
        /// Override the end time in seconds
        #[arg(long)]
        t_end: Option<f64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> ProjectResult<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Blocks { project_path } => cmd_blocks(&project_path),
        Commands::Run {
            project_path,
            output,
            format,
            dt,
            t_end,
        } => cmd_run(&project_path, output.as_deref(), format, dt, t_end),
    }
}

fn cmd_validate(project_path: &Path) -> ProjectResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = load_yaml(project_path)?;
    build_flowsheet(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_blocks(project_path: &Path) -> ProjectResult<()> {
    let project = load_yaml(project_path)?;
    let built = build_flowsheet(&project)?;
    let sheet = &built.flowsheet;
    let index = sheet.index();

    println!(
        "{}: {} blocks, {} states, {} outputs, {} connections",
        project.name,
        index.block_count(),
        index.num_states(),
        index.num_outputs(),
        sheet.connections().edge_count()
    );
    for (i, def) in project.blocks.iter().enumerate() {
        let id = BlockId::from_index(i as u32);
        println!("  {} ({})", def.id, def.kind.type_name());
        for (name, offset) in index.block_states(id) {
            println!("    state  [{offset:>3}] {name}");
        }
        for (name, offset) in index.block_outputs(id) {
            println!("    output [{offset:>3}] {name}");
        }
    }
    Ok(())
}

fn cmd_run(
    project_path: &Path,
    output: Option<&Path>,
    format: Format,
    dt: Option<f64>,
    t_end: Option<f64>,
) -> ProjectResult<()> {
    let mut project = load_yaml(project_path)?;
    if let Some(dt) = dt {
        project.run.time_step_s = dt;
    }
    if let Some(t_end) = t_end {
        project.run.end_time_s = t_end;
    }
    lf_project::validate_project(&project)?;

    eprintln!(
        "Running {}: n_nodes = {}, dt = {:.3} s, t_end = {:.3} s",
        project.name, project.run.n_nodes, project.run.time_step_s, project.run.end_time_s
    );

    let mut built = build_flowsheet(&project)?;
    let start = Instant::now();
    let trajectory = built.run()?;
    let elapsed = start.elapsed().as_secs_f64();

    eprintln!("✓ Simulation completed in {elapsed:.3}s");
    eprintln!("  Time points: {}", trajectory.len());
    eprintln!("  Elements:    {}", built.flowsheet.element()?);

    let index = built.flowsheet.index();
    match output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            write_results(writer, format, &trajectory, index)?;
            eprintln!("✓ Written to {}", path.display());
        }
        None => write_results(io::stdout().lock(), format, &trajectory, index)?,
    }
    Ok(())
}

fn write_results<W: Write>(
    mut writer: W,
    format: Format,
    trajectory: &lf_sim::Trajectory,
    index: &lf_graph::NetworkIndex,
) -> ProjectResult<()> {
    match format {
        Format::Csv => lf_project::write_trajectory_csv(&mut writer, trajectory, index)?,
        Format::Json => {
            lf_project::write_trajectory_json(&mut writer, trajectory)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}
