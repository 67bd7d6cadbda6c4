use anyhow::{Context, Result};
use clap::Parser;
use crimenav::{process, schema::TableSchema, DataConfig};
use prettytable::{format, Cell, Row, Table};
use std::path::PathBuf;
use std::process::exit;
use tracing_subscriber::{fmt, EnvFilter};

/// Check every configured source header against the columns the loader
/// expects, without loading any rows.
#[derive(Parser)]
#[command(author, version, about = "Validate source CSV headers")]
struct Args {
    #[arg(long)]
    config: Option<PathBuf>,
}

struct HeaderCheck {
    table: String,
    path: PathBuf,
    missing: Vec<String>,
    ignored: usize,
    error: Option<String>,
}

fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => DataConfig::from_yaml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DataConfig::default(),
    };

    let mut checks = Vec::new();
    for (schema, sources) in [
        (config.crime.schema(), &config.crime.sources),
        (config.victims.schema(), &config.victims.sources),
    ] {
        let paths = process::expand_sources(sources)
            .with_context(|| format!("expanding `{}` sources", schema.name))?;
        for path in paths {
            checks.push(check_source(&schema, path));
        }
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(vec![
        Cell::new("Table").style_spec("bFg"),
        Cell::new("Source").style_spec("bFg"),
        Cell::new("Status").style_spec("bFg"),
        Cell::new("Ignored Cols").style_spec("bFg"),
        Cell::new("Detail").style_spec("bFg"),
    ]));

    let mut failed = 0;
    for check in &checks {
        let (status, detail) = match (&check.error, check.missing.is_empty()) {
            (Some(e), _) => ("ERROR", e.clone()),
            (None, false) => ("MISMATCH", format!("missing: {}", check.missing.join(", "))),
            (None, true) => ("OK", String::new()),
        };
        if status != "OK" {
            failed += 1;
        }
        table.add_row(Row::new(vec![
            Cell::new(&check.table),
            Cell::new(&check.path.display().to_string()),
            Cell::new(status).style_spec(if status == "OK" { "Fg" } else { "Fr" }),
            Cell::new(&check.ignored.to_string()).style_spec("r"),
            Cell::new(&detail),
        ]));
    }
    table.printstd();

    if failed > 0 {
        eprintln!("{} of {} sources would fail to load", failed, checks.len());
        exit(1);
    }
    println!("→ all {} sources match their schema", checks.len());
    Ok(())
}

fn check_source(schema: &TableSchema, path: PathBuf) -> HeaderCheck {
    let mut check = HeaderCheck {
        table: schema.name.clone(),
        path,
        missing: Vec::new(),
        ignored: 0,
        error: None,
    };
    match process::read_headers(&check.path) {
        Ok(headers) => {
            if let Err(missing) = schema.header_positions(&headers) {
                check.missing = missing;
            }
            check.ignored = schema.extra_columns(&headers).len();
        }
        Err(e) => check.error = Some(e.to_string()),
    }
    check
}
