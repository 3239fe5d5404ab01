//! Flight ops viewer CLI.
//!
//! Loads operation and AoR uploads, then prints a summary, writes the
//! render-ready GeoJSON or exports filtered records.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use opsview_cli::{
    export_aors, export_operations, load_session, open_output, parse_instant, summary_lines,
    timeframe, ExportFormat,
};
use opsview_core::bounding_box;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Flight operation and AoR viewer pipeline
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one line per loaded operation and AoR
    Summary {
        /// Operations / flight plans JSON file
        #[arg(long)]
        ops: PathBuf,

        /// Areas of Responsibility JSON file
        #[arg(long)]
        aors: Option<PathBuf>,
    },

    /// Write the combined feature collection (operations, then AoRs)
    Geojson {
        #[arg(long)]
        ops: PathBuf,

        #[arg(long)]
        aors: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export flattened records of one domain
    Export {
        #[arg(long, conflicts_with = "aors", required_unless_present = "aors")]
        ops: Option<PathBuf>,

        #[arg(long)]
        aors: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Keep operations active at or after this instant
        #[arg(long, value_parser = parse_instant)]
        from: Option<DateTime<Utc>>,

        /// Keep operations active at or before this instant
        #[arg(long, value_parser = parse_instant)]
        to: Option<DateTime<Utc>>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("opsview=info".parse()?))
        .init();

    let args = Args::parse();

    match args.command {
        Command::Summary { ops, aors } => {
            let session = load_session(Some(&ops), aors.as_deref())?;
            for line in summary_lines(&session, Utc::now()) {
                println!("{}", line);
            }
        }
        Command::Geojson { ops, aors, output } => {
            let session = load_session(Some(&ops), aors.as_deref())?;
            let collection = session.all_features();

            match bounding_box(&collection) {
                Some([[min_lon, min_lat], [max_lon, max_lat]]) => tracing::info!(
                    "Bounds: {:.5},{:.5} -> {:.5},{:.5}",
                    min_lon,
                    min_lat,
                    max_lon,
                    max_lat
                ),
                None => tracing::warn!("No zones with geometry to display"),
            }

            let mut writer = open_output(output.as_deref())?;
            serde_json::to_writer_pretty(&mut writer, &collection)
                .context("Failed to write GeoJSON")?;
            writeln!(writer)?;
            writer.flush()?;
            tracing::info!("Wrote {} features", collection.features.len());
        }
        Command::Export {
            ops,
            aors,
            format,
            from,
            to,
            output,
        } => {
            let written = match (ops, aors) {
                (Some(ops), None) => {
                    let mut session = load_session(Some(&ops), None)?;
                    let range = timeframe(&session, from, to);
                    session.set_timeframe(range);
                    let mut writer = open_output(output.as_deref())?;
                    let written = export_operations(&session, format, &mut writer)?;
                    writer.flush()?;
                    written
                }
                (None, Some(aors)) => {
                    if from.is_some() || to.is_some() {
                        tracing::warn!("--from/--to only apply to operations; ignoring");
                    }
                    let session = load_session(None, Some(&aors))?;
                    let mut writer = open_output(output.as_deref())?;
                    let written = export_aors(&session, format, &mut writer)?;
                    writer.flush()?;
                    written
                }
                _ => bail!("Pass exactly one of --ops or --aors"),
            };
            tracing::info!("{} records exported", written);
        }
    }

    Ok(())
}
