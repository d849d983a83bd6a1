#![deny(unsafe_code)]
//! CLI binary for the curlflow streamline visualizer core.
//!
//! Subcommands:
//! - `run <engine>`: build an engine, tick it N times, optionally write a JSON snapshot
//! - `list`: print available engines and palettes
//! - `palette <name>`: print hex swatches sampled from a palette
//!
//! Logging goes to stderr through `env_logger`; set `RUST_LOG` to raise the
//! default `warn` level.

mod error;

use clap::{Parser, Subcommand};
use curlflow_core::palette::PaletteRegistry;
use curlflow_core::{ColorGenerator, Engine};
use curlflow_engines::EngineKind;
use error::CliError;
use serde_json::Value;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "curlflow", about = "Curl-noise streamline CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an engine, tick it, and report or snapshot the final frame.
    Run {
        /// Engine name (e.g. "streamline").
        engine: String,

        /// Number of ticks to run.
        #[arg(short, long, default_value_t = 100)]
        ticks: usize,

        /// Noise seed; identical seeds give identical frames.
        #[arg(long, default_value_t = 42.0, allow_negative_numbers = true)]
        seed: f64,

        /// Number of samples along the trail. Overrides `particle_count` in --params.
        #[arg(short = 'n', long)]
        particles: Option<usize>,

        /// Palette preset name. Overrides `palette` in --params.
        #[arg(short, long)]
        palette: Option<String>,

        /// Engine parameters as a JSON string.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Write the final frame as a JSON snapshot to this path.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List available engines and palettes.
    List,
    /// Print hex swatches sampled evenly across a palette.
    Palette {
        /// Preset name (see `list`).
        name: String,

        /// Number of swatches.
        #[arg(short = 'k', long, default_value_t = 8)]
        samples: usize,
    },
}

/// Parses `--params` and folds the dedicated flags over it.
fn merge_params(
    params: &str,
    particles: Option<usize>,
    palette: Option<&str>,
) -> Result<Value, CliError> {
    let mut params: Value = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    let obj = params
        .as_object_mut()
        .ok_or_else(|| CliError::Input("--params must be a JSON object".into()))?;
    if let Some(n) = particles {
        obj.insert("particle_count".into(), n.into());
    }
    if let Some(name) = palette {
        obj.insert("palette".into(), name.into());
    }
    Ok(params)
}

/// Evenly spaced swatches over one palette period.
fn swatches(name: &str, samples: usize) -> Result<Vec<String>, CliError> {
    let generator = ColorGenerator::from_preset(PaletteRegistry::builtin(), name, 0.0, 1.0)?;
    // color_at halves its input, so [0, 2) covers one full period.
    Ok((0..samples)
        .map(|k| {
            let t = 2.0 * k as f64 / samples as f64;
            generator.color_at(t).to_hex()
        })
        .collect())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let engines = EngineKind::list_engines();
            let registry = PaletteRegistry::builtin();
            let palettes = registry.names();
            if cli.json {
                let info = serde_json::json!({
                    "engines": engines,
                    "palettes": palettes,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Engines:");
                for name in engines {
                    println!("  {name}");
                }
                println!("Palettes:");
                println!("  {}", palettes.join(", "));
            }
        }
        Command::Palette { name, samples } => {
            let hex = swatches(&name, samples)?;
            if cli.json {
                let info = serde_json::json!({"palette": name, "swatches": hex});
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", hex.join(" "));
            }
        }
        Command::Run {
            engine,
            ticks,
            seed,
            particles,
            palette,
            params,
            output,
        } => {
            let params = merge_params(&params, particles, palette.as_deref())?;

            let mut eng = EngineKind::from_name(&engine, seed, &params)?;
            log::info!("running {engine} for {ticks} ticks ({} samples)", eng.len());

            (0..ticks).try_for_each(|_| eng.step())?;

            if let Some(path) = &output {
                curlflow_engines::snapshot::write_json(&eng, eng.frame(), path)?;
            }

            if cli.json {
                let info = serde_json::json!({
                    "engine": engine,
                    "ticks": ticks,
                    "seed": seed,
                    "particles": eng.len(),
                    "frame": eng.frame(),
                    "params": eng.params(),
                    "output": output.as_ref().map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                let head = &eng.positions()[..3];
                eprintln!(
                    "ran {engine} ({} samples, {ticks} ticks, seed {seed}), head at ({:.6}, {:.6}, {:.6})",
                    eng.len(),
                    head[0],
                    head[1],
                    head[2]
                );
                if let Some(path) = &output {
                    eprintln!("snapshot -> {}", path.display());
                }
            }
        }
    }

    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        eprintln!("{}", e.report(json_mode));
        process::exit(e.exit_code());
    }
}
