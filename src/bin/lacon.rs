//! lacon - convert LACON documents to JSON

use clap::Parser;
use lacon::{collect_variables, from_path, parse_str, preprocess, to_json_with_options, Options};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lacon")]
#[command(version)]
#[command(about = "Convert LACON configuration documents to JSON", long_about = None)]
struct Cli {
    /// Input file path (reads from stdin if not provided)
    file: Option<PathBuf>,

    /// Output file path (writes to stdout if not provided)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Single-line JSON output
    #[arg(long)]
    compact: bool,

    /// Spaces per indentation level in pretty output
    #[arg(long, default_value_t = 2)]
    indent: usize,

    /// Print the document with emit directives expanded instead of converting
    #[arg(long, conflicts_with = "variables")]
    preprocess: bool,

    /// List global variable declarations as JSON instead of converting
    #[arg(long)]
    variables: bool,

    /// Log more (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "lacon=debug",
        _ => "lacon=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_source(cli: &Cli) -> io::Result<String> {
    match &cli.file {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn run(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    if cli.preprocess {
        return Ok(preprocess(&read_source(cli)?));
    }
    if cli.variables {
        let vars = collect_variables(&read_source(cli)?);
        return Ok(serde_json::to_string_pretty(&vars)?);
    }

    let value = match &cli.file {
        Some(path) => from_path(path)?,
        None => parse_str(&read_source(cli)?)?,
    };
    let options = Options::new()
        .with_pretty(!cli.compact)
        .with_indent(cli.indent);
    Ok(to_json_with_options(&value, &options)?)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = run(&cli).and_then(|out| {
        match &cli.output {
            Some(path) => {
                let mut file = fs::File::create(path)?;
                writeln!(file, "{}", out)?;
            }
            None => println!("{}", out),
        }
        Ok(())
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
