use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rox::ast::Stmt;
use rox::ast_printer::AstPrinter;
use rox::lox::Lox;
use rox::output::Stdio;
use rox::parser;
use rox::reporter::Reporter;
use rox::scanner::{self, Scanner};
use rox::token::Token;

const EXIT_USAGE: i32 = 64;
const EXIT_DATA_ERR: i32 = 65;
const EXIT_SOFTWARE: i32 = 70;

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
        filename: PathBuf,

        /// Print the tokens as a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Parses a file as a Lox program and prints it back in canonical form
    Parse {
        filename: PathBuf,

        /// Print the syntax tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Runs a Lox program, or starts a prompt when no file is given
    Run { filename: Option<PathBuf> },
}

/// A script mapped read‑only into memory.  Empty files cannot be mapped and
/// are represented by `None`.
struct Script {
    map: Option<Mmap>,
}

impl Script {
    fn open(filename: &Path) -> Result<Self> {
        info!("Mapping file: {:?}", filename);

        let file: File =
            File::open(filename).context(format!("Failed to open file {:?}", filename))?;

        let len: u64 = file
            .metadata()
            .context(format!("Failed to stat file {:?}", filename))?
            .len();

        if len == 0 {
            return Ok(Self { map: None });
        }

        // SAFETY: the map is read-only and lives no longer than this process
        // run; scripts are not expected to be rewritten while being read.
        let map: Mmap = unsafe { Mmap::map(&file) }
            .context(format!("Failed to map file {:?}", filename))?;

        info!("Mapped {} bytes from {:?}", len, filename);

        Ok(Self { map: Some(map) })
    }

    fn text(&self) -> rox::error::Result<&str> {
        match &self.map {
            Some(map) => Ok(std::str::from_utf8(map)?),
            None => Ok(""),
        }
    }
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file: File = File::create("app.log").context("Failed to create app.log")?;

    Builder::new()
        .format(|buf, record| {
            let module: &str = record.module_path().unwrap_or("<unnamed>");
            let module: &str = module.strip_prefix("rox::").unwrap_or(module);
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

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    info!("Running Tokenize subcommand");

    let script: Script = Script::open(filename)?;
    let mut tokens: Vec<Token> = Vec::new();
    let mut tokenized: bool = true;

    for result in Scanner::new(script.text()?) {
        match result {
            Ok(token) => {
                if !json {
                    println!("{}", token);
                }
                tokens.push(token);
            }

            Err(e) => {
                tokenized = false;
                debug!("Tokenization debug: {} (line {:?})", e, e.line());
                eprintln!("{}", e);
            }
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tokens).context("Failed to serialize tokens")?
        );
    }

    if !tokenized {
        debug!("Tokenization failed, exiting with code {}", EXIT_DATA_ERR);
        process::exit(EXIT_DATA_ERR);
    }

    info!("Tokenization completed successfully");
    Ok(())
}

fn parse(filename: &Path, json: bool) -> Result<()> {
    info!("Running Parse subcommand");

    let script: Script = Script::open(filename)?;
    let mut reporter: Reporter = Reporter::new(Rc::new(Stdio));

    let tokens: Vec<Token> = scanner::scan(script.text()?, &mut reporter);
    let statements: Vec<Stmt> = parser::parse(&tokens, &mut reporter);

    if reporter.had_error() {
        debug!("Parse failed, exiting with code {}", EXIT_DATA_ERR);
        process::exit(EXIT_DATA_ERR);
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&statements).context("Failed to serialize AST")?
        );
    } else {
        print!("{}", AstPrinter.print_program(&statements));
    }

    info!("Parse subcommand completed");
    Ok(())
}

fn run_file(filename: &Path) -> Result<()> {
    info!("Running Run subcommand");

    let script: Script = Script::open(filename)?;
    let source: &str = script.text()?;
    info!("Provided input:\n {}", source);

    let mut lox: Lox = Lox::with_stdio();
    lox.run(source);

    if lox.had_error() {
        process::exit(EXIT_DATA_ERR);
    }

    if lox.had_runtime_error() {
        process::exit(EXIT_SOFTWARE);
    }

    info!("Program executed successfully");
    Ok(())
}

fn run_prompt() -> Result<()> {
    info!("Starting interactive prompt");

    println!("Running Lox in interactive mode.");
    println!("Type \"quit\" to exit.");

    let mut lox: Lox = Lox::with_stdio();
    let stdin = io::stdin();
    let mut line: String = String::new();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        line.clear();
        let read: usize = stdin
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;

        // EOF
        if read == 0 {
            println!();
            break;
        }

        let input: &str = line.trim_end();
        if input == "quit" {
            break;
        }

        lox.run(input);
        lox.reset_error();
    }

    info!("Leaving interactive prompt");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                eprint!("{}", e);
                process::exit(EXIT_USAGE);
            }
        },
    };

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Off unless RUST_LOG asks for something
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .parse_default_env()
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => tokenize(&filename, json),
        Commands::Parse { filename, json } => parse(&filename, json),
        Commands::Run { filename } => match filename {
            Some(filename) => run_file(&filename),
            None => run_prompt(),
        },
    }
}
