use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

use tapevm::bytecode::compile::Compiler;
use tapevm::bytecode::disasm::print_bc;
use tapevm::bytecode::ir::ArtifactError;
use tapevm::bytecode::syntax_error::SyntaxError;
use tapevm::bytecode::Program;
use tapevm::frontend::Scanner;
use tapevm::frontend::symbol_dumper::SymbolDumper;
use tapevm::runtime::{BoundsPolicy, Machine, MachineConfig, RuntimeError};

/// Extension of compiled artifacts written by `--emit`.
const ARTIFACT_EXTENSION: &str = "bfc";

/// Runs when no file is given.
const DEMO_SOURCE: &str = "
	++++++++[>++++[>++>+++>+++>+<<
	<<-]>+>+>->>+[<]<-]>>.>---.+++
	++++..+++.>>.<-.<.+++.------.-
	-------.>>+.>++.
";

#[derive(Parser, Debug)]
#[command(name = "tapevm")]
#[command(about = "Compile and run programs for the eight-symbol tape machine")]
struct Args {
    /// Program source, or a compiled `.bfc` artifact. Runs a demo when omitted.
    file: Option<PathBuf>,

    /// Print the recognized symbols with their positions and exit
    #[arg(long)]
    tokens: bool,

    /// With --tokens, show source symbols instead of op names
    #[arg(long)]
    pretty: bool,

    /// Disable ANSI colors in --tokens output
    #[arg(long = "no-color")]
    no_color: bool,

    /// Print the compiled instruction listing and exit
    #[arg(long = "bc", alias = "bytecode")]
    bytecode: bool,

    /// Write the compiled program to PATH and exit
    #[arg(long, value_name = "PATH")]
    emit: Option<PathBuf>,

    /// Number of cells on the tape
    #[arg(long = "tape-size", default_value_t = MachineConfig::default().tape_size)]
    tape_size: usize,

    /// Wrap the data pointer around the tape ends instead of aborting
    #[arg(long)]
    wrap: bool,

    /// Abort after executing this many instructions
    #[arg(long = "max-steps", value_name = "N")]
    max_steps: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read '{}': {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write '{}': {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("in '{name}': {source}")]
    Syntax { name: String, source: SyntaxError },

    #[error("in '{}': {source}", path.display())]
    Artifact { path: PathBuf, source: ArtifactError },

    #[error("failed to write to stdout: {0}")]
    Stdout(io::Error),

    #[error("failed to encode program: {0}")]
    Encode(#[from] postcard::Error),

    #[error("--tokens needs program source, not a compiled artifact")]
    TokensFromArtifact,

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

fn main() {
    init_logging();

    let args = Args::parse();

    if let Err(e) = run(&args) {
        error!("{}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout belongs to the running program
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), CliError> {
    if args.tokens {
        let source = match &args.file {
            Some(path) if is_artifact(path) => return Err(CliError::TokensFromArtifact),
            Some(path) => read_source(path)?,
            None => DEMO_SOURCE.to_string(),
        };
        return dump_symbols(&source, args);
    }

    let program = match &args.file {
        Some(path) => load_program(path)?,
        None => {
            info!("no file given, running the demo program");
            compile_source(DEMO_SOURCE, "<demo>")?
        }
    };

    if args.bytecode {
        print_bc(&program);
        return Ok(());
    }

    if let Some(out) = &args.emit {
        let bytes = program.to_bytes()?;
        fs::write(out, bytes).map_err(|source| CliError::Write {
            path: out.clone(),
            source,
        })?;
        info!("wrote {} instructions to {}", program.len(), out.display());
        return Ok(());
    }

    run_program(program, machine_config(args))
}

fn machine_config(args: &Args) -> MachineConfig {
    MachineConfig {
        tape_size: args.tape_size,
        bounds: if args.wrap {
            BoundsPolicy::Wrap
        } else {
            BoundsPolicy::Abort
        },
        max_steps: args.max_steps,
    }
}

fn is_artifact(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(ARTIFACT_EXTENSION)
}

fn read_source(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn compile_source(source: &str, name: &str) -> Result<Program, CliError> {
    Compiler::new()
        .compile(source)
        .map_err(|source| CliError::Syntax {
            name: name.to_string(),
            source,
        })
}

fn load_program(path: &Path) -> Result<Program, CliError> {
    if is_artifact(path) {
        let bytes = fs::read(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        return Program::from_bytes(&bytes).map_err(|source| CliError::Artifact {
            path: path.to_path_buf(),
            source,
        });
    }

    let source = read_source(path)?;
    compile_source(&source, &path.display().to_string())
}

fn dump_symbols(source: &str, args: &Args) -> Result<(), CliError> {
    let mut dumper = SymbolDumper::new();
    if args.no_color {
        dumper = dumper.no_color();
    }
    if args.pretty {
        dumper = dumper.pretty();
    }

    let symbols = Scanner::new(source).scan();
    dumper
        .dump(&symbols, &mut io::stdout().lock())
        .map_err(CliError::Stdout)
}

fn run_program(program: Program, config: MachineConfig) -> Result<(), CliError> {
    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());

    let mut machine = Machine::with_config(program, stdin, stdout, config);
    let summary = machine.run()?;

    info!(
        steps = summary.steps,
        bytes_read = summary.bytes_read,
        bytes_written = summary.bytes_written,
        "program finished"
    );
    Ok(())
}
