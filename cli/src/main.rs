use std::path::PathBuf;

use argsplit_core::render_help;
use argsplit_descriptor::{SchemaDescriptor, collect_descriptor_paths};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Output encodings for `split`.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "argsplit", disable_help_subcommand = true)]
#[command(about = "Split command-line tokens against a declarative schema")]
struct Cli {
    /// Log decisions of the splitting engine to stderr.
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Split tokens with a schema descriptor and print the result.
    Split(SplitArgs),
    /// Print help rendered from a schema descriptor.
    Help(HelpArgs),
    /// Build every descriptor found in the given files and directories.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct SplitArgs {
    /// Descriptor file (.yaml, .yml or .json).
    #[arg(long)]
    schema: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Treat `@file` tokens literally.
    #[arg(long)]
    no_expand: bool,
    /// Tokens to split; put them after `--` when they start with a dash.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    /// Descriptor file (.yaml, .yml or .json).
    #[arg(long)]
    schema: PathBuf,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Descriptor files and/or directories containing descriptors.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let result = match cli.command {
        Command::Split(args) => run_split(args),
        Command::Help(args) => run_help(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(debug: bool) {
    let default = if debug {
        "argsplit=debug,argsplit_core=trace,argsplit_descriptor=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_split(args: SplitArgs) -> Result<(), String> {
    let mut descriptor = SchemaDescriptor::load(&args.schema).map_err(|e| e.to_string())?;
    if args.no_expand {
        descriptor.settings.expand_arg_files = false;
    }
    let splitter = descriptor.splitter().map_err(|e| e.to_string())?;

    debug!(tokens = args.tokens.len(), "splitting");
    let bag = splitter.split(args.tokens).map_err(|e| e.to_string())?;

    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&bag).map_err(|e| e.to_string())?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&bag).map_err(|e| e.to_string())?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let descriptor = SchemaDescriptor::load(&args.schema).map_err(|e| e.to_string())?;
    let schema = descriptor.build().map_err(|e| e.to_string())?;

    match (&descriptor.name, &descriptor.description) {
        (Some(name), Some(description)) => println!("{name}: {description}\n"),
        (Some(name), None) => println!("{name}\n"),
        (None, Some(description)) => println!("{description}\n"),
        (None, None) => {}
    }
    print!("{}", render_help(&schema));
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let paths = collect_descriptor_paths(&args.inputs).map_err(|e| e.to_string())?;

    let mut failures = 0usize;
    for path in &paths {
        let result = SchemaDescriptor::load(path).and_then(|d| d.splitter().map(|_| ()));
        if let Err(err) = result {
            warn!(path = %path.display(), "descriptor rejected");
            eprintln!("{}: {err}", path.display());
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!(
            "{failures} of {} descriptor file(s) failed validation",
            paths.len()
        ));
    }
    println!("Validated {} descriptor file(s).", paths.len());
    Ok(())
}
