use clap::Parser as ClapParser;
use sift_lang::cli::{self, CliError, RunOptions};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "sift")]
#[command(about = "sift - apply a jq-style filter to newline-delimited JSON")]
#[command(version)]
struct Cli {
    /// The filter expression to compile
    expression: String,

    /// Read input lines from a file instead of stdin
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Pretty-print output values
    #[arg(short, long)]
    pretty: bool,

    /// Halt at the first line that fails to parse or evaluate
    #[arg(long)]
    exit_on_error: bool,

    /// Only validate the expression syntax, don't read input
    #[arg(long)]
    syntax_only: bool,
}

fn main() {
    let cli = Cli::parse();

    match run(cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<i32, CliError> {
    if cli.syntax_only {
        return match sift_lang::parse(&cli.expression) {
            Ok(_) => {
                println!("Syntax is valid");
                Ok(0)
            }
            Err(e) => Err(CliError::Compile(sift_lang::Error::Parse(e))),
        };
    }

    let mut reader: Box<dyn BufRead> = match &cli.file {
        Some(path) => Box::new(BufReader::new(File::open(path)?)),
        None if !atty::is(atty::Stream::Stdin) => Box::new(BufReader::new(io::stdin())),
        None => return Err(CliError::NoInput),
    };

    let options = RunOptions {
        expression: cli.expression,
        pretty: cli.pretty,
        exit_on_error: cli.exit_on_error,
    };

    let stats = cli::execute(
        &options,
        &mut reader,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )?;

    if stats.errors > 0 && options.exit_on_error {
        return Ok(1);
    }
    Ok(0)
}
