//! CLI wrapper around the stateless extraction entry points. Reads a file
//! or stdin, feeds it through a transient emulator, and writes JSON, plain
//! text, or HTML to a file or stdout.
//!
//! Not part of the core engine contract — the CLI wrapper is an external
//! collaborator of the engine, not the engine itself. This binary only
//! plumbs bytes in and a chosen projection out.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Json,
    Text,
    Html,
}

/// Convert a raw ANSI/VT byte stream into JSON, plain text, or HTML.
#[derive(Parser, Debug)]
#[command(name = "vtgrid", version, about)]
struct Args {
    /// Input file; omit or pass `-` to read stdin.
    input: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value = "json")]
    format: Format,

    /// Grid width. Defaults to the format's documented default (120 for
    /// JSON, 500 for text/HTML).
    #[arg(long)]
    cols: Option<u16>,

    /// Grid height. Defaults to the format's documented default (40 for
    /// JSON, 256 for text/HTML).
    #[arg(long)]
    rows: Option<u16>,

    /// Number of leading lines to skip.
    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Maximum number of lines to emit. 0 means unlimited.
    #[arg(long, default_value_t = 0)]
    limit: u32,

    /// Write output to this file instead of stdout.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,
}

fn read_input(path: &Option<PathBuf>) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    match path.as_deref() {
        None => {
            io::stdin().read_to_end(&mut bytes).context("reading stdin")?;
        }
        Some(p) if p == std::path::Path::new("-") => {
            io::stdin().read_to_end(&mut bytes).context("reading stdin")?;
        }
        Some(p) => {
            File::open(p)
                .and_then(|mut f| f.read_to_end(&mut bytes))
                .with_context(|| format!("reading {}", p.display()))?;
        }
    }
    Ok(bytes)
}

fn write_output(path: &Option<PathBuf>, contents: &str) -> Result<()> {
    match path {
        Some(p) => {
            let mut file = File::create(p).with_context(|| format!("creating {}", p.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("writing {}", p.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            lock.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                lock.write_all(b"\n")?;
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let input = read_input(&args.input)?;

    let cols = args.cols;
    let rows = args.rows;
    let use_custom_grid = cols.is_some() || rows.is_some();

    let rendered = match (args.format, use_custom_grid) {
        (Format::Json, false) => vtgrid::to_json(&input, args.offset, args.limit)?,
        (Format::Text, false) => vtgrid::to_text(&input, args.offset, args.limit)?,
        (Format::Html, false) => vtgrid::to_html(&input, args.offset, args.limit)?,
        (format, true) => {
            let default_cols = match format {
                Format::Json => 120,
                Format::Text | Format::Html => 500,
            };
            let default_rows = match format {
                Format::Json => 40,
                Format::Text | Format::Html => 256,
            };
            let mut emulator = vtgrid::Emulator::new(vtgrid::EmulatorOptions {
                cols: cols.unwrap_or(default_cols),
                rows: rows.unwrap_or(default_rows),
                max_scrollback: None,
            });
            emulator.feed_bounded(&input, args.offset, args.limit)?;
            match format {
                Format::Json => emulator
                    .to_json_string(args.offset, args.limit)
                    .context("serializing JSON document")?,
                Format::Text => emulator.to_text(args.offset, args.limit),
                Format::Html => emulator.to_html(args.offset, args.limit),
            }
        }
    };

    write_output(&args.output, &rendered)?;
    Ok(())
}
