//! Command line entry point.
//!
//! # Commands
//!
//! - `serve` - Serve the tabbed dashboard over HTTP
//! - `figures` - Write the ten charts as static SVG figures
//! - `generate` - Write a synthetic incident dataset
//! - `summary` - Print row counts, view warnings and timings

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use incident_board::data::generator::{self, GeneratorConfig};
use incident_board::data::{self, compute_all};
use incident_board::render::{render_all, write_figures};
use incident_board::server::{Dashboard, DashboardServer};
use incident_board::settings::Settings;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Incident operations dashboard over a synthetic dataset.
#[derive(Parser)]
#[command(name = "incident-board", version)]
#[command(about = "Incident operations dashboard and static figures", long_about = None)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Incident dataset, overrides the settings file
    #[arg(short, long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard page with ten chart tabs.
    Serve {
        /// Bind host
        #[arg(long)]
        host: Option<String>,

        /// Bind port
        #[arg(short, long)]
        port: Option<u16>,

        /// Open the dashboard in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Write the ten charts as SVG files plus a JSON summary.
    Figures {
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write a synthetic incident dataset.
    Generate {
        /// Output CSV path (defaults to the dataset path)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Number of incidents
        #[arg(short, long, default_value_t = 2_000)]
        rows: usize,

        /// Random seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// First opening date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Number of days incidents are spread over
        #[arg(long, default_value_t = 90)]
        days: u32,
    },

    /// Print dataset size, empty views and computation timings.
    Summary,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("incident_board=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut settings = Settings::resolve(cli.config.as_deref()).context("loading settings")?;
    if let Some(dataset) = cli.dataset {
        settings.dataset_path = dataset;
    }

    match cli.command {
        Commands::Serve { host, port, open } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            serve(&settings, open || settings.open_browser)
        }
        Commands::Figures { out } => {
            let dir = out.unwrap_or_else(|| settings.figures_dir.clone());
            figures(&settings, dir)
        }
        Commands::Generate {
            out,
            rows,
            seed,
            start,
            days,
        } => {
            let mut config = GeneratorConfig {
                rows,
                seed,
                days,
                ..Default::default()
            };
            if let Some(start) = start {
                config.start = start;
            }
            let path = out.unwrap_or_else(|| settings.dataset_path.clone());
            generate(&config, path)
        }
        Commands::Summary => summary(&settings),
    }
}

fn load_table(settings: &Settings) -> Result<incident_board::types::IncidentTable> {
    data::load(&settings.dataset_path)
        .with_context(|| format!("loading dataset {}", settings.dataset_path.display()))
}

fn serve(settings: &Settings, open_browser: bool) -> Result<()> {
    let table = load_table(settings)?;
    let dashboard = Arc::new(Dashboard::build(&table, settings.chart_size()));
    let server = DashboardServer::start(&settings.bind_addr(), dashboard)
        .context("starting dashboard server")?;

    let url = server.url();
    println!("Dashboard running at {}", url);
    if open_browser {
        if let Err(e) = open::that(&url) {
            tracing::warn!("Could not open browser: {}", e);
        }
    }
    server.wait();
    Ok(())
}

fn figures(settings: &Settings, dir: PathBuf) -> Result<()> {
    let table = load_table(settings)?;
    let views = compute_all(&table);
    let artifacts = render_all(&views, settings.chart_size());
    let written = write_figures(&dir, &artifacts, &views)
        .with_context(|| format!("writing figures to {}", dir.display()))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn generate(config: &GeneratorConfig, path: PathBuf) -> Result<()> {
    let incidents = generator::generate(config);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    generator::write_csv(&incidents, BufWriter::new(file))
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {} incidents to {}", incidents.len(), path.display());
    Ok(())
}

fn summary(settings: &Settings) -> Result<()> {
    let table = load_table(settings)?;
    let views = compute_all(&table);

    println!("Dataset: {} ({} incidents)", settings.dataset_path.display(), table.len());
    for report in &views.reports {
        let status = match &report.warning {
            Some(warning) => format!("empty ({})", warning),
            None => "ok".to_string(),
        };
        let timing = views
            .perf
            .get(report.kind.slug())
            .map(|s| format!("{:.2}ms", s.total_ms))
            .unwrap_or_default();
        println!("  {:<45} {:<8} {}", report.kind.title(), timing, status);
    }
    Ok(())
}
