use anyhow::Result;
use clap::Parser;
use genesis_common::{SimulationConfig, Trajectory};
use genesis_engine::{run_simulation, scenario};
use log::{error, info, warn};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const DEFAULT_CONFIG: &str = "config.toml";

/// Runs the particle simulation and writes the trajectory to stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration (defaults to ./config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format: json, csv or summary (overrides [output].format)
    #[arg(short, long)]
    format: Option<String>,

    /// Seed for random initial conditions (overrides [initial_conditions].seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of steps to simulate (overrides [timing].step_count)
    #[arg(long)]
    steps: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Csv,
    Summary,
}

fn parse_format(name: &str) -> OutputFormat {
    match name.to_ascii_lowercase().as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "summary" => OutputFormat::Summary,
        other => {
            error!("Unknown output format: {}. Using JSON instead.", other);
            OutputFormat::Json
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => SimulationConfig::load(path),
        None if Path::new(DEFAULT_CONFIG).exists() => SimulationConfig::load(DEFAULT_CONFIG),
        None => {
            warn!("No {} found, using built-in defaults.", DEFAULT_CONFIG);
            Ok(SimulationConfig::default())
        }
    }
}

/// Long-form table: one row per particle per snapshot.
fn write_csv<W: Write>(trajectory: &Trajectory, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["step", "time", "particle", "x", "y"])?;
    for snapshot in trajectory {
        for (i, (x, y)) in snapshot.positions.iter().enumerate() {
            writer.write_record(&[
                snapshot.step.to_string(),
                snapshot.time.to_string(),
                i.to_string(),
                x.to_string(),
                y.to_string(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn write_json<W: Write>(trajectory: &Trajectory, mut out: W) -> Result<()> {
    serde_json::to_writer(&mut out, trajectory)?;
    writeln!(out)?;
    Ok(())
}

fn log_summary(trajectory: &Trajectory) {
    if let (Some(first), Some(last)) = (trajectory.initial(), trajectory.last()) {
        info!(
            "Kinetic energy: {:.6} -> {:.6} over {:.3} time units",
            first.kinetic_energy, last.kinetic_energy, last.time
        );
    }
    let total_wall_hits: u32 = trajectory.iter().map(|s| s.wall_collisions).sum();
    info!("Wall collisions resolved: {}", total_wall_hits);
    for (i, (x, y)) in trajectory.final_positions().iter().enumerate() {
        info!("Particle {:>3}: final position ({:.4}, {:.4})", i, x, y);
    }
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();

    info!("Starting Genesis particle simulation...");
    let args = Args::parse();

    // --- Load Configuration ---
    let mut config = load_config(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.initial_conditions.seed = seed;
    }
    if let Some(steps) = args.steps {
        config.timing.step_count = steps;
    }
    let format = parse_format(
        args.format
            .as_deref()
            .or(config.output.format.as_deref())
            .unwrap_or("json"),
    );

    // --- Initial State ---
    let initial = scenario::initial_state(&config)?;
    info!("Initial state ready with {} particles.", initial.len());

    // --- Run ---
    let start_time = Instant::now();
    let trajectory = run_simulation(initial, config.get_sim_params())?;
    info!(
        "Simulation finished in {:.3} ms.",
        start_time.elapsed().as_secs_f64() * 1000.0
    );

    // --- Emit Trajectory ---
    let stdout = io::stdout();
    match format {
        OutputFormat::Json => write_json(&trajectory, stdout.lock())?,
        OutputFormat::Csv => write_csv(&trajectory, stdout.lock())?,
        OutputFormat::Summary => log_summary(&trajectory),
    }

    info!("Simulation Complete.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use genesis_common::Snapshot;

    fn tiny_trajectory() -> Trajectory {
        Trajectory::from(vec![
            Snapshot { step: 0, time: 0.0, positions: vec![(1.0, 2.0)], kinetic_energy: 0.5, wall_collisions: 0 },
            Snapshot { step: 1, time: 0.5, positions: vec![(1.5, 2.0)], kinetic_energy: 0.5, wall_collisions: 0 },
        ])
    }

    #[test]
    fn format_names_are_case_insensitive() {
        assert_eq!(parse_format("CSV"), OutputFormat::Csv);
        assert_eq!(parse_format("summary"), OutputFormat::Summary);
        assert_eq!(parse_format("json"), OutputFormat::Json);
        assert_eq!(parse_format("msgpack"), OutputFormat::Json);
    }

    #[test]
    fn csv_has_one_row_per_particle_per_snapshot() -> Result<()> {
        let mut buf = Vec::new();
        write_csv(&tiny_trajectory(), &mut buf)?;
        let text = String::from_utf8(buf)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["step,time,particle,x,y", "0,0,0,1,2", "1,0.5,0,1.5,2"]);
        Ok(())
    }

    #[test]
    fn json_round_trips_through_the_shared_type() -> Result<()> {
        let mut buf = Vec::new();
        write_json(&tiny_trajectory(), &mut buf)?;
        let parsed: Trajectory = serde_json::from_slice(&buf)?;
        assert_eq!(parsed, tiny_trajectory());
        assert!(buf.starts_with(b"[{"));
        Ok(())
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        assert!(load_config(Some(Path::new("missing/config.toml"))).is_err());
    }
}
