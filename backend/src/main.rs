//! Orderclean CLI - clean pharmacy order exports
//!
//! # Commands
//!
//! ```bash
//! orderclean convert export.csv -o processed_orders.csv   # Clean to CSV
//! orderclean preview export.csv --limit 5                 # First orders as JSON
//! orderclean exclusions                                   # Excluded component names
//! orderclean serve                                        # HTTP server (port 3000)
//! ```

use clap::{Parser, Subcommand};
use orderclean::{process_file, write_csv, ExclusionList, OrderRecord, PipelineOptions, PipelineResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "orderclean")]
#[command(about = "Clean pharmacy order exports into a sorted order table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean an export and write the processed CSV
    Convert {
        /// Input export (CSV)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Clean an export and print the first orders as JSON
    Preview {
        /// Input export (CSV)
        input: PathBuf,

        /// Number of orders to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Show the component names dropped from every export
    Exclusions,

    /// Start HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert { input, output } => cmd_convert(&input, output.as_deref()),

        Commands::Preview { input, limit } => cmd_preview(&input, limit),

        Commands::Exclusions => cmd_exclusions(),

        Commands::Serve { port } => cmd_serve(port).await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run(input: &Path) -> Result<PipelineResult, Box<dyn std::error::Error>> {
    eprintln!("📄 Processing: {}", input.display());

    let result = process_file(input, &PipelineOptions::default())?;

    eprintln!("   Encoding: {}", result.csv_info.encoding);
    eprintln!("   Raw rows: {}", result.csv_info.raw_rows);
    eprintln!("   Body rows: {}", result.stats.body_rows);
    eprintln!("   Excluded: {}", result.stats.excluded_rows);
    for (column, format) in &result.stats.time_formats {
        eprintln!("   {}: {}", column, format.pattern());
    }
    eprintln!("\n⚙️  Orders: {}", result.stats.output_rows);

    Ok(result)
}

fn cmd_convert(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let result = run(input)?;
    let bytes = write_csv(&result.table)?;

    match output {
        Some(p) => {
            fs::write(p, &bytes)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            std::io::stdout().write_all(&bytes)?;
        }
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

fn cmd_preview(input: &Path, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let result = run(input)?;

    let orders: Vec<OrderRecord> = OrderRecord::from_table(&result.table)
        .into_iter()
        .take(limit)
        .collect();

    println!("{}", serde_json::to_string_pretty(&orders)?);
    Ok(())
}

fn cmd_exclusions() -> Result<(), Box<dyn std::error::Error>> {
    let list = ExclusionList::default();
    eprintln!("📋 {} excluded component names", list.len());
    println!("{}", list.to_json()?);
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    orderclean::server::start_server(port).await
}
