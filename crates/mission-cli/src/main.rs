//! mission-tool - import, translate, template and export survey missions.

mod config;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mission_core::locations::DEFAULT_LOCATION;
use mission_core::{Coordinate, MissionDocument, MissionPipeline, TemplateBase, TemplateKind};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a mission document and print its summary
    Import {
        file: PathBuf,

        /// On failure, list every violation instead of the first
        #[arg(long)]
        all: bool,
    },
    /// Lower a mission document into a vendor mission
    Translate {
        file: PathBuf,

        /// Keep declared actions and waypoint metadata
        #[arg(long)]
        enhanced: bool,

        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Generate a mission document from a template
    Template {
        #[command(subcommand)]
        kind: TemplateCommand,

        #[arg(long, global = true)]
        out: Option<PathBuf>,
    },
    /// Re-export an imported mission as a fresh document
    Export {
        file: PathBuf,

        #[arg(long)]
        name: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum TemplateCommand {
    /// Four-waypoint square
    Basic {
        #[command(flatten)]
        origin: OriginArgs,

        /// Side length in degrees
        #[arg(long, default_value_t = 0.001)]
        delta: f64,

        #[arg(long)]
        altitude: Option<f64>,
    },
    /// Boustrophedon grid survey
    Grid {
        #[command(flatten)]
        origin: OriginArgs,

        #[arg(long, default_value_t = 3)]
        rows: usize,

        #[arg(long, default_value_t = 3)]
        columns: usize,

        /// Cell spacing in meters
        #[arg(long, default_value_t = 30.0)]
        spacing: f64,

        #[arg(long)]
        altitude: Option<f64>,
    },
    /// Perimeter inspection around a polygon
    Perimeter {
        /// Corner as "lat,lon"; repeat for each corner
        #[arg(long = "corner", value_parser = parse_coordinate, required = true)]
        corners: Vec<Coordinate>,

        #[arg(long, default_value_t = 30.0)]
        altitude: f64,
    },
}

#[derive(clap::Args, Debug)]
struct OriginArgs {
    /// Named test site
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    location: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lon: Option<f64>,
}

impl OriginArgs {
    fn base(&self) -> TemplateBase {
        match (&self.location, self.lat, self.lon) {
            (_, Some(lat), Some(lon)) => TemplateBase::Coordinate(Coordinate::new(lat, lon)),
            (Some(name), _, _) => TemplateBase::Location(name.clone()),
            _ => TemplateBase::Location(DEFAULT_LOCATION.to_string()),
        }
    }
}

fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got \"{raw}\""))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    Ok(Coordinate::new(lat, lon))
}

impl TemplateCommand {
    fn kind(&self) -> TemplateKind {
        match self {
            Self::Basic {
                origin,
                delta,
                altitude,
            } => TemplateKind::BasicTest {
                base: origin.base(),
                delta_deg: *delta,
                altitude_m: *altitude,
            },
            Self::Grid {
                origin,
                rows,
                columns,
                spacing,
                altitude,
            } => TemplateKind::GridSurvey {
                origin: origin.base(),
                rows: *rows,
                columns: *columns,
                spacing_m: *spacing,
                altitude_m: *altitude,
            },
            Self::Perimeter { corners, altitude } => TemplateKind::Perimeter {
                corners: corners.clone(),
                altitude_m: *altitude,
            },
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env();

    // Logs go to stderr; stdout carries mission JSON.
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("mission_core=info".parse()?)
        .add_directive("mission_tool=info".parse()?);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            config
                .log_json
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!config.log_json)
                .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    let pipeline = MissionPipeline::new(config.load_rules()?).with_default_author(config.author);
    run(&pipeline, cli.command)
}

fn run(pipeline: &MissionPipeline, command: Command) -> Result<()> {
    match command {
        Command::Import { file, all } => {
            let bytes = read_input(&file)?;
            match pipeline.import_document(&bytes) {
                Ok(plan) => emit_json(&pipeline.summarize(&plan), None),
                Err(err) => {
                    if all && err.validation().is_some() {
                        let doc = pipeline.parse_document(&bytes)?;
                        for line in violation_report(pipeline, &doc) {
                            eprintln!("{line}");
                        }
                    }
                    Err(err).with_context(|| format!("importing {}", file.display()))
                }
            }
        }
        Command::Translate {
            file,
            enhanced,
            out,
        } => {
            let bytes = read_input(&file)?;
            let mission = if enhanced {
                let doc = pipeline.parse_document(&bytes)?;
                pipeline.validate(&doc)?;
                pipeline.translate_enhanced(&doc)?
            } else {
                let plan = pipeline
                    .import_document(&bytes)
                    .with_context(|| format!("importing {}", file.display()))?;
                pipeline.translate(&plan)?
            };
            tracing::info!(
                waypoints = mission.waypoints.len(),
                actions = mission.action_count(),
                "vendor mission ready"
            );
            emit_json(&mission, out.as_deref())
        }
        Command::Template { kind, out } => {
            let built = pipeline.build_template(&kind.kind())?;
            let summary = pipeline.summarize(&built.plan);
            tracing::info!(
                name = %built.document.metadata.name,
                waypoints = summary.waypoint_count,
                distance_m = summary.total_distance_m,
                "template built"
            );
            emit(&pipeline.document_to_json(&built.document)?, out.as_deref())
        }
        Command::Export {
            file,
            name,
            description,
            tags,
            out,
        } => {
            if name.trim().is_empty() {
                bail!("--name must not be empty");
            }
            let plan = pipeline
                .import_document(&read_input(&file)?)
                .with_context(|| format!("importing {}", file.display()))?;
            let doc = pipeline.export_document(&plan, &name, description.as_deref(), &tags)?;
            emit(&pipeline.document_to_json(&doc)?, out.as_deref())
        }
    }
}

/// Lines printed by `import --all`. A document can pass every document
/// check and still fail at the flight-plan stage.
fn violation_report(pipeline: &MissionPipeline, doc: &MissionDocument) -> Vec<String> {
    let violations = pipeline.collect_violations(doc);
    if violations.is_empty() {
        return vec!["no document-level violations; rejected at the flight-plan stage".to_string()];
    }
    violations.iter().map(ToString::to_string).collect()
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn emit_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    emit(&serde_json::to_vec_pretty(value)?, out)
}

fn emit(bytes: &[u8], out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}
