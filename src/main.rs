use clap::{Parser, Subcommand};
use log::info;
use std::fs;
use std::path::PathBuf;

use scopeview::app;
use scopeview::config::ViewerConfig;
use scopeview::downloader::to_csv;
use scopeview::graph::Layout;
use scopeview::loader::{DEFAULT_HEADER_LINES, read_scope_file};
use scopeview::{ViewportRange, classify_channels, filter_range, render_pipeline};

#[derive(Parser)]
#[command(name = "scopeview")]
#[command(about = "Browser-based viewer for oscilloscope CSV exports", version)]
struct Cli {
    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web viewer
    Serve {
        /// Path to JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Address to listen on (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
        /// Initial point budget (overrides the config file)
        #[arg(long)]
        points: Option<i64>,
        /// Initial layout, `combined` or `split` (overrides the config file)
        #[arg(long)]
        layout: Option<Layout>,
    },

    /// Summarise an export and optionally write the reduced view
    Inspect {
        /// Oscilloscope CSV export
        file: PathBuf,
        /// Point budget
        #[arg(short, long, default_value_t = 10_000)]
        points: i64,
        /// Time window as LOW:HIGH
        #[arg(short, long, value_parser = parse_range)]
        range: Option<ViewportRange>,
        /// Lines to skip before the column header
        #[arg(long, default_value_t = DEFAULT_HEADER_LINES)]
        header_lines: usize,
        /// Write the reduced table here as CSV
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

fn parse_range(s: &str) -> Result<ViewportRange, String> {
    let (low, high) = s
        .split_once(':')
        .ok_or_else(|| format!("expected LOW:HIGH, got '{}'", s))?;
    let low: f64 = low.trim().parse().map_err(|_| format!("bad low bound '{}'", low))?;
    let high: f64 = high.trim().parse().map_err(|_| format!("bad high bound '{}'", high))?;
    ViewportRange::new(low, high).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose > 0 { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Serve {
            config,
            bind,
            points,
            layout,
        } => {
            let mut config = ViewerConfig::load(config.as_deref())?;
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            if let Some(points) = points {
                config.default_points = points;
            }
            if let Some(layout) = layout {
                config.default_layout = layout;
            }
            app::run(config).await
        }
        Commands::Inspect {
            file,
            points,
            range,
            header_lines,
            out,
        } => {
            let table = read_scope_file(&file, header_lines)?;
            let channels = classify_channels(&table.columns);

            println!("File:      {}", file.display());
            println!("Columns:   {}", table.columns.join(", "));
            println!("Channels:  {}", channels.join(", "));
            println!("Rows:      {}", table.len());
            if let Some(r) = &range {
                let in_range = filter_range(&table, r.low, r.high)?;
                println!("In range:  {} ({} .. {})", in_range.len(), r.low, r.high);
            }

            let shown = render_pipeline(&table, range.as_ref(), points)?;
            println!("Rendered:  {} (budget {})", shown.len(), points);

            if let Some(out) = out {
                fs::write(&out, to_csv(&shown)?)?;
                info!("wrote {} rows to {}", shown.len(), out.display());
            }
            Ok(())
        }
    }
}
