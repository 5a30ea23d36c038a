//! dmprobe - check that the automation object can be reached and report
//! what it says about itself.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use dmsoft::{BridgeConfig, Rect, method_table};

#[derive(Parser)]
#[command(name = "dmprobe")]
#[command(about = "Probe the dm.dmsoft automation object", long_about = None)]
struct Cli {
    /// TOML configuration file (requires the `toml-config` feature)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Base directory for pictures and dictionaries
    #[arg(short, long, value_name = "DIR")]
    path: Option<String>,

    /// Run OCR over `x1,y1,x2,y2`
    #[arg(long, value_name = "RECT", value_parser = parse_rect)]
    ocr: Option<Rect>,

    /// Color format for OCR
    #[arg(long, default_value = "ffffff-000000")]
    color: String,

    /// Similarity for OCR (0.1-1.0)
    #[arg(long, default_value_t = 0.9)]
    sim: f64,

    /// Print the method table summary and exit
    #[arg(long)]
    table: bool,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default, Serialize)]
struct Report {
    prog_id: String,
    version: Option<String>,
    base_path: Option<String>,
    ocr: Option<String>,
    invocations: u64,
    cache_hits: u64,
}

fn parse_rect(text: &str) -> Result<Rect, String> {
    let parts: Vec<i32> = text
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|err| format!("bad coordinate in `{text}`: {err}"))?;
    match parts.as_slice() {
        &[x1, y1, x2, y2] => Rect::new(x1, y1, x2, y2)
            .validate()
            .map_err(|err| err.to_string()),
        _ => Err(format!("expected x1,y1,x2,y2, found `{text}`")),
    }
}

fn load_config(cli: &Cli) -> Result<BridgeConfig> {
    let config = match &cli.config {
        Some(path) => BridgeConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?
            .merge_with_env(),
        None => BridgeConfig::from_env(),
    };
    Ok(config)
}

fn print_table() -> Result<()> {
    let table = method_table()?;
    println!("{} methods", table.len());
    for capability in table.capabilities() {
        println!("  {:<16} {}", capability, table.capability(capability).len());
    }
    Ok(())
}

#[cfg(windows)]
fn probe(cli: &Cli, config: BridgeConfig) -> Result<Report> {
    use dmsoft::{ComObject, Dmsoft, System, TextOcr};

    let mut report = Report {
        prog_id: config.prog_id.clone(),
        ..Report::default()
    };
    let dm =
        Dmsoft::<ComObject>::connect(config).context("connecting to the automation object")?;
    report.version = Some(dm.ver()?);
    if let Some(path) = &cli.path {
        if dm.set_path(path)? == 0 {
            tracing::warn!(path = %path, "object rejected base path");
        }
        report.base_path = Some(dm.get_path()?);
    }
    if let Some(rect) = cli.ocr {
        report.ocr = Some(dm.ocr(rect, &cli.color, cli.sim)?);
    }
    let stats = dm.stats();
    report.invocations = stats.invocations;
    report.cache_hits = stats.cache_hits;
    dm.release()?;
    Ok(report)
}

#[cfg(not(windows))]
fn probe(_cli: &Cli, config: BridgeConfig) -> Result<Report> {
    anyhow::bail!(
        "`{}` is unavailable: COM automation objects exist only on Windows",
        config.prog_id
    )
}

fn main() -> Result<()> {
    dmsoft_utils::init_logging();
    let cli = Cli::parse();

    if cli.table {
        return print_table();
    }

    let config = load_config(&cli)?;
    let report = probe(&cli, config)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("prog_id  {}", report.prog_id);
        if let Some(version) = &report.version {
            println!("version  {version}");
        }
        if let Some(path) = &report.base_path {
            println!("path     {path}");
        }
        if let Some(text) = &report.ocr {
            println!("ocr      {text}");
        }
        println!(
            "calls    {} ({} cached lookups)",
            report.invocations, report.cache_hits
        );
    }
    Ok(())
}
