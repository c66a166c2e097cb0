//! Probe program for the `conbind` harness.
//!
//! Each entry point writes through [`Console`], so the bytes land wherever
//! this process's stdout points. Nothing else is written to stdout, and
//! stderr stays empty unless an entry writes to it on purpose.

use std::io::{self, Write as _};
use std::process;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use conbind::{Console, DEFAULT_OUTPUT};
use thiserror::Error;

/// Exit status for an unusable `--search-path`, matching clap's usage errors.
const USAGE_EXIT: i32 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "conbind-probe",
    about = "Write known text through the console for the conbind harness"
)]
struct Cli {
    /// Directory the entry point is resolved from; must exist when given.
    #[arg(long, value_name = "DIR")]
    search_path: Option<Utf8PathBuf>,
    #[command(subcommand)]
    entry: Entry,
}

#[derive(Debug, Subcommand)]
enum Entry {
    /// Write the default greeting.
    Hello,
    /// Write TEXT verbatim.
    Echo {
        /// Text to write.
        text: String,
    },
    /// Write BYTES bytes to the console and the same amount to stderr.
    Flood {
        /// Number of bytes per stream.
        bytes: usize,
    },
}

#[derive(Debug, Error)]
enum ProbeError {
    #[error("search path {path} is not a directory")]
    SearchPath { path: Utf8PathBuf },
    #[error("console write failed: {0}")]
    Console(#[from] io::Error),
}

impl ProbeError {
    const fn exit_code(&self) -> i32 {
        match self {
            Self::SearchPath { .. } => USAGE_EXIT,
            Self::Console(_) => 1,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        writeln!(io::stderr(), "conbind-probe: {err}").ok();
        process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), ProbeError> {
    if let Some(path) = cli.search_path.filter(|path| !path.is_dir()) {
        return Err(ProbeError::SearchPath { path });
    }

    let console = Console::open();
    match cli.entry {
        Entry::Hello => console.printf(DEFAULT_OUTPUT)?,
        Entry::Echo { text } => console.printf(&text)?,
        Entry::Flood { bytes } => {
            let payload = vec![b'x'; bytes];
            console.write_bytes(&payload)?;
            let mut stderr = io::stderr().lock();
            stderr.write_all(&payload)?;
            stderr.flush()?;
        }
    }
    Ok(())
}
