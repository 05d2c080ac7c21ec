/*
 * Copyright (C) 2024 taylor.fish <contact@taylor.fish>
 *
 * This file is part of unibinary.
 *
 * unibinary is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * unibinary is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with unibinary. If not, see <https://www.gnu.org/licenses/>.
 */

use std::fmt::Display;
use std::fs::File;
use std::io::{self, stdin, stdout, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process::exit;

use clap::{ArgGroup, Parser};
use tracing_subscriber::EnvFilter;
use unibinary::{decode_stream, encode_stream, EncodeConfig, StreamError};

/// Encodes data as printable Unicode text, or decodes it back.
///
/// Reads from the given string, the given file, or standard input, and
/// writes the result to standard output.
#[derive(Debug, Parser)]
#[command(name = "unibinary", version)]
#[command(group(
    ArgGroup::new("mode").required(true).args(["encode", "decode"])
))]
struct Cli {
    /// Encode the input
    #[arg(short, long)]
    encode: bool,

    /// Decode the input
    #[arg(short, long)]
    decode: bool,

    /// Use TEXT as the input
    #[arg(short, long, value_name = "TEXT", conflicts_with = "file")]
    string: Option<String>,

    /// Read the input from PATH
    #[arg(short, long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Break encoded output into lines of N chars (0 disables)
    #[arg(
        short = 'b',
        long = "break",
        value_name = "N",
        default_value_t = 0,
        conflicts_with = "decode"
    )]
    wrap: usize,

    /// Log progress to standard error
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("could not open file '{}': {source}", .path.display())]
    Open {
        path: PathBuf,
        source: io::Error,
    },
    #[error(transparent)]
    Stream(#[from] StreamError),
}

fn error_exit(err: impl Display) -> ! {
    eprintln!("error: {}", err);
    exit(1);
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn process(
    cli: &Cli,
    input: impl Read,
    output: impl Write,
) -> Result<(), CliError> {
    let stats = if cli.decode {
        decode_stream(input, output)?
    } else {
        let config = EncodeConfig::new().with_wrap_length(cli.wrap);
        encode_stream(input, output, config)?
    };
    tracing::debug!(?stats, "done");
    Ok(())
}

fn run(cli: &Cli, output: impl Write) -> Result<(), CliError> {
    if let Some(s) = &cli.string {
        return process(cli, s.as_bytes(), output);
    }
    if let Some(path) = &cli.file {
        let file = File::open(path).map_err(|source| CliError::Open {
            path: path.clone(),
            source,
        })?;
        return process(cli, file, output);
    }
    process(cli, stdin().lock(), output)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = stdout();
    if let Err(e) = run(&cli, stdout.lock()) {
        error_exit(e);
    }
    if stdout.is_terminal() {
        eprintln!();
    }
}
