mod frame;
mod subtap;
mod testdata;

use std::io::stderr;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reassemble telemetry frames from a raw fast telemetry stream.
    ///
    /// Scans the input for sync-tagged byte pairs, drops events that lose
    /// sync, and writes each 8192-byte frame the moment it completes. The
    /// frame in progress at end of input is flushed once, complete or not,
    /// so the output length is always a multiple of the frame size.
    Frame {
        /// Raw telemetry input; reads stdin when omitted.
        input: Option<PathBuf>,

        /// Output file; writes stdout when omitted.
        #[arg(short, long, value_name = "path")]
        output: Option<PathBuf>,
    },
    /// List the subtap record headers in a binfile.
    Subtaps {
        /// Input binfile.
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: subtap::Format,
    },
    /// Extract the histogram of a single subtap from a binfile.
    ///
    /// Prints the first record whose header matches all four coordinates.
    Hist {
        ytap: u32,
        ysubtap: u32,
        xtap: u32,
        xsubtap: u32,

        /// Input binfile.
        input: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: subtap::Format,
    },
    /// Print the lab test table columns.
    Testdata {
        /// Test table path.
        #[arg(short, long, default_value = detlab::lab::TEST_FILE, value_name = "path")]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("DETLAB_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Frame { input, output } => frame::frame(input.as_deref(), output.as_deref()),
        Commands::Subtaps { input, format } => subtap::info(input, format),
        Commands::Hist {
            ytap,
            ysubtap,
            xtap,
            xsubtap,
            input,
            format,
        } => subtap::hist(input, (*ytap, *ysubtap, *xtap, *xsubtap), format),
        Commands::Testdata { config } => testdata::testdata(config),
    }
}
