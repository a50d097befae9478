use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use lox_interpreter as lox;

use lox::driver::{self, Status};

/// Stack for the thread running the pipeline.  Sized so that
/// `interpreter::MAX_CALL_DEPTH` nested Lox calls fit comfortably.
const PIPELINE_STACK_SIZE: usize = 64 * 1024 * 1024;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print each token as a JSON object instead of `KIND lexeme literal`
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file as UTF‑8 source text.
fn read_file(filename: PathBuf) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("File {:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'lox_interpreter::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("lox_interpreter::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    let (filename, mode) = match args.commands {
        Commands::Tokenize { filename, json } => (filename, Mode::Tokenize { json }),
        Commands::Parse { filename } => (filename, Mode::Parse),
        Commands::Evaluate { filename } => (filename, Mode::Evaluate),
        Commands::Run { filename } => (filename, Mode::Run),
    };

    let Some(filename) = filename else {
        info!("No filepath provided");
        println!("No input filepath was provided. Exiting...");
        return Ok(());
    };

    let source: String = read_file(filename)?;

    let status: Status = thread::Builder::new()
        .name("pipeline".into())
        .stack_size(PIPELINE_STACK_SIZE)
        .spawn(move || execute(mode, &source))
        .context("Failed to spawn pipeline thread")?
        .join()
        .map_err(|_| anyhow!("Pipeline thread panicked"))??;

    debug!("Finished with {:?}", status);

    if status != Status::Success {
        std::process::exit(status.exit_code());
    }

    Ok(())
}

fn execute(mode: Mode, source: &str) -> lox::error::Result<Status> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut err = stderr.lock();

    let status: Status = match mode {
        Mode::Tokenize { json } => driver::tokenize(source, json, &mut out, &mut err)?,
        Mode::Parse => driver::parse(source, &mut out, &mut err)?,
        Mode::Evaluate => driver::evaluate(source, &mut out, &mut err)?,
        Mode::Run => driver::run(source, &mut out, &mut err)?,
    };

    out.flush()?;
    err.flush()?;

    Ok(status)
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Tokenize { json: bool },
    Parse,
    Evaluate,
    Run,
}
