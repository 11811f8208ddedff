//! protopeek - inspect protobuf wire payloads without a schema
//!
//! Decodes a payload from a file or standard input into a field tree and
//! prints a human-readable or constructor-literal view of it. No `.proto`
//! file is needed; fields are identified by tag and wire kind alone.

use anyhow::{Context, Result};
use clap::Parser;
use protopeek_core::{
    decode_with, render_human, render_literal, DecodeOptions, HumanOptions, LiteralOptions,
};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Decode protobuf wire payloads without a schema
#[derive(Parser, Debug)]
#[command(name = "protopeek")]
#[command(author, version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// Reinterpretation depth for length-delimited payloads (-1 = unbounded)
    #[arg(short, long, default_value_t = 2, allow_negative_numbers = true)]
    depth: i32,

    /// Render whatever decoded cleanly even when decoding fails
    #[arg(short, long)]
    force: bool,

    /// Output style: human or cpp (1 is an alias for cpp)
    #[arg(short, long, default_value = "human", value_parser = parse_style)]
    style: Style,

    /// Read the payload from standard input instead of a file
    #[arg(long = "decode_raw")]
    decode_raw: bool,

    /// Payload file to decode
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

/// Output rendering styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    /// Pseudo-JSON with comment annotations
    Human,
    /// Constructor-literal source form
    Cpp,
}

fn parse_style(value: &str) -> std::result::Result<Style, String> {
    Ok(match value {
        "cpp" | "1" => Style::Cpp,
        // anything unrecognized falls back to human
        _ => Style::Human,
    })
}

fn main() {
    // launched bare: print usage instead of waiting on stdin
    if std::env::args().len() < 2 {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        println!();
        return;
    }

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let data = match read_input(cli.file.as_deref(), cli.decode_raw) {
        Ok(data) => data,
        Err(err) => {
            eprintln!("error: {err:#}");
            println!("// decode fail");
            std::process::exit(-1);
        }
    };

    let options = DecodeOptions::new().packed_depth(cli.depth);
    let report = decode_with(&data, &options);

    if let Some(err) = &report.error {
        debug!(%err, consumed = report.consumed, "decode stopped");
    }

    if report.is_ok() || cli.force {
        let text = match cli.style {
            Style::Human => render_human(&report.root, &HumanOptions::default()),
            Style::Cpp => render_literal(&report.root, &LiteralOptions::default()),
        };
        print!("{text}");
    }

    if !report.is_ok() {
        println!("// decode fail");
        std::process::exit(-1);
    }
}

/// Slurp the payload from the named file, or from standard input when
/// `--decode_raw` was given or no file was named. Stdin is read as raw
/// bytes to end of input.
fn read_input(file: Option<&Path>, decode_raw: bool) -> Result<Vec<u8>> {
    match file {
        Some(path) if !decode_raw => fs::read(path)
            .with_context(|| format!("failed to read input file: {}", path.display())),
        _ => {
            let mut data = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut data)
                .context("failed to read standard input")?;
            Ok(data)
        }
    }
}
