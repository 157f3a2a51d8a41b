use std::fs;
use std::io::BufRead;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use command_args_core::{ParsedArguments, SchemaRegistry, ValueTypeTable, validate_package};
use command_args_db::{CliConfig, FileFormat, SchemaSet};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for parse results and listings.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Text,
}

#[derive(Debug, Parser)]
#[command(name = "command-args")]
#[command(about = "Schema-driven command line parsing")]
struct Cli {
    /// Log registry and binder activity to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a command line against the loaded schemas and print the result.
    Parse(ParseArgs),
    /// List the commands of the loaded schemas.
    List(ListArgs),
    /// Validate one or more schema files.
    Validate(ValidateArgs),
    /// Bundle schema files into a SchemaPackage file.
    Bundle(BundleArgs),
}

/// Where schemas come from.
#[derive(Debug, Args)]
struct SchemaArgs {
    /// Path to a YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Extra schema file, package or directory (repeatable).
    #[arg(long = "schemas")]
    schemas: Vec<PathBuf>,
    /// Do not load the built-in add/sub/sqrt/calc/date schemas.
    #[arg(long)]
    no_builtin: bool,
    /// Honour shell-style quotes in command lines.
    #[arg(long)]
    quoting: bool,
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    source: SchemaArgs,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
    /// Read one command line per input line from stdin.
    #[arg(long, conflicts_with = "line")]
    stdin: bool,
    /// Command line to parse. With quoting enabled each word is re-quoted, so
    /// grouping done by the invoking shell is kept.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, required_unless_present = "stdin")]
    line: Vec<String>,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[command(flatten)]
    source: SchemaArgs,
    /// Output format.
    #[arg(long, default_value = "text")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Schema files, packages and/or directories of schema files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct BundleArgs {
    /// Schema files, packages and/or directories of schema files.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
    /// Output bundle path (`.json`, `.yaml` or `.yml`).
    #[arg(long)]
    output: PathBuf,
    /// Optional bundle name metadata.
    #[arg(long)]
    name: Option<String>,
    /// Optional bundle description metadata.
    #[arg(long)]
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct ListEntry<'a> {
    command: &'a str,
    usage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::List(args) => run_list(args),
        Command::Validate(args) => run_validate(args),
        Command::Bundle(args) => run_bundle(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_registry(args: &SchemaArgs) -> Result<SchemaRegistry, String> {
    let mut config = match &args.config {
        Some(path) => CliConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => CliConfig::default(),
    };
    if args.no_builtin {
        config.builtin_schemas = false;
    }
    if args.quoting {
        config.parser.quoting = true;
    }

    let mut set = config.schema_set().map_err(|e| e.to_string())?;
    for path in &args.schemas {
        let loaded = SchemaSet::from_path(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
        set.extend(loaded);
    }
    debug!(schemas = set.len(), "building registry");

    set.register_into(SchemaRegistry::builder().with_config(config.parser))
        .build()
        .map_err(|e| e.to_string())
}

fn load_inputs(inputs: &[PathBuf]) -> Result<SchemaSet, String> {
    let mut set = SchemaSet::empty();
    for path in inputs {
        let loaded = SchemaSet::from_path(path)
            .map_err(|err| format!("Failed to load '{}': {err}", path.display()))?;
        set.extend(loaded);
    }
    Ok(set)
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let registry = load_registry(&args.source)?;

    if !args.stdin {
        let line = join_words(&args.line, registry.config().quoting)?;
        return parse_line(&registry, &line, args.format);
    }

    let mut failures = 0usize;
    for line in std::io::stdin().lock().lines() {
        let line = line.map_err(|err| format!("Failed to read stdin: {err}"))?;
        if line.trim().is_empty() {
            continue;
        }
        if let Err(err) = parse_line(&registry, &line, args.format) {
            eprintln!("error: {err}");
            failures += 1;
        }
    }
    if failures > 0 {
        return Err(format!("{failures} line(s) failed to parse"));
    }
    Ok(())
}

fn join_words(words: &[String], quoting: bool) -> Result<String, String> {
    if !quoting {
        return Ok(words.join(" "));
    }
    shlex::try_join(words.iter().map(String::as_str))
        .map_err(|err| format!("Failed to quote command line: {err}"))
}

fn parse_line(registry: &SchemaRegistry, line: &str, format: CliOutputFormat) -> Result<(), String> {
    let parsed = registry
        .parse(line)
        .map_err(|err| format!("{}: {err}", err.kind))?;

    match format {
        CliOutputFormat::Json => {
            let raw = serde_json::to_string_pretty(&parsed)
                .map_err(|err| format!("Failed to serialize result: {err}"))?;
            println!("{raw}");
        }
        CliOutputFormat::Yaml => {
            let raw = serde_yaml::to_string(&parsed)
                .map_err(|err| format!("Failed to serialize result: {err}"))?;
            print!("{raw}");
        }
        CliOutputFormat::Text => {
            println!("{}", parsed.command);
            print_arguments(&parsed.arguments, 1);
        }
    }
    Ok(())
}

fn print_arguments(arguments: &ParsedArguments, depth: usize) {
    let indent = "  ".repeat(depth);
    for (name, value) in arguments.iter() {
        println!("{indent}{name} = {value}");
    }
    if let Some(sub) = arguments.subcommand() {
        println!("{indent}{}", sub.name);
        print_arguments(&sub.arguments, depth + 1);
    }
}

fn run_list(args: ListArgs) -> Result<(), String> {
    let registry = load_registry(&args.source)?;
    let prefix = registry.config().flag_prefix.as_str();
    let entries: Vec<ListEntry<'_>> = registry
        .schemas()
        .map(|schema| ListEntry {
            command: &schema.name,
            usage: schema.usage(prefix),
            description: schema.description.as_deref(),
        })
        .collect();

    match args.format {
        CliOutputFormat::Json => {
            let raw = serde_json::to_string_pretty(&entries)
                .map_err(|err| format!("Failed to serialize listing: {err}"))?;
            println!("{raw}");
        }
        CliOutputFormat::Yaml => {
            let raw = serde_yaml::to_string(&entries)
                .map_err(|err| format!("Failed to serialize listing: {err}"))?;
            print!("{raw}");
        }
        CliOutputFormat::Text => {
            for entry in &entries {
                match entry.description {
                    Some(desc) => println!("{:<40} {desc}", entry.usage),
                    None => println!("{}", entry.usage),
                }
            }
        }
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let set = load_inputs(&args.inputs)?;
    let count = set.len();
    let package = set.into_package(PACKAGE_VERSION);

    let errors = validate_package(&package, &ValueTypeTable::with_builtins());
    for err in &errors {
        eprintln!("  {err}");
    }
    if !errors.is_empty() {
        return Err(format!("{} schema error(s) found", errors.len()));
    }

    println!(
        "Validated {} input(s) for {} command(s).",
        args.inputs.len(),
        count
    );
    Ok(())
}

fn run_bundle(args: BundleArgs) -> Result<(), String> {
    let format = FileFormat::from_path(&args.output).map_err(|e| e.to_string())?;
    let set = load_inputs(&args.inputs)?;

    let mut package = set.into_package(PACKAGE_VERSION);
    package.name = args.name;
    package.description = args.description;

    let errors = validate_package(&package, &ValueTypeTable::with_builtins());
    if let Some(err) = errors.first() {
        return Err(format!(
            "Refusing to bundle invalid schemas ({} error(s)): {err}",
            errors.len()
        ));
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                format!(
                    "Failed to create output directory '{}': {err}",
                    parent.display()
                )
            })?;
        }
    }

    let raw = match format {
        FileFormat::Json => serde_json::to_string_pretty(&package).map_err(|e| e.to_string()),
        FileFormat::Yaml => serde_yaml::to_string(&package).map_err(|e| e.to_string()),
    }
    .map_err(|err| format!("Failed to serialize schema bundle: {err}"))?;
    fs::write(&args.output, raw)
        .map_err(|err| format!("Failed to write '{}': {err}", args.output.display()))?;

    println!(
        "Bundled {} schema(s) into '{}'.",
        package.schema_count(),
        args.output.display()
    );

    Ok(())
}
