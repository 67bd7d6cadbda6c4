use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crimenav::{display, Catalog, DataConfig, Selection, ViewKind};
use std::{path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about = "Browse district-level crime statistics")]
struct Args {
    /// YAML data source config; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List the states in the crime table.
    States,
    /// List the districts of one state.
    Districts {
        #[arg(long)]
        state: String,
    },
    /// Render one view for a selection.
    View {
        #[arg(value_enum)]
        view: ViewKind,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        district: Option<String>,
    },
}

fn main() -> Result<()> {
    // ─── 1) init logging (stderr, so stdout only carries output) ────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // ─── 2) config ──────────────────────────────────────────────────
    let config = match &args.config {
        Some(path) => DataConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DataConfig::default(),
    };

    // ─── 3) load sources once ───────────────────────────────────────
    let start = Instant::now();
    let catalog = Catalog::load(&config).context("loading data sources")?;
    info!(
        crime_rows = catalog.crime().num_rows(),
        victim_rows = catalog.victims().num_rows(),
        elapsed = ?start.elapsed(),
        "catalog ready"
    );

    // ─── 4) answer the query ────────────────────────────────────────
    match args.command {
        Command::States => {
            let states = catalog.states();
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&states)?),
                OutputFormat::Table => {
                    display::list_table("State", &states).printstd();
                }
            }
        }
        Command::Districts { state } => {
            let districts = catalog
                .districts(&state)
                .with_context(|| format!("listing districts of {}", state))?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&districts)?),
                OutputFormat::Table => {
                    display::list_table("District", &districts).printstd();
                }
            }
        }
        Command::View {
            view,
            state,
            district,
        } => {
            let selection = Selection { state, district };
            let report = catalog
                .render(view, &selection)
                .with_context(|| format!("rendering {:?} for {:?}", view, selection))?;
            match args.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
                OutputFormat::Table => {
                    for section in display::report_sections(&report) {
                        println!("{}", section.title);
                        section.table.printstd();
                        println!();
                    }
                }
            }
        }
    }

    Ok(())
}
