//! `zonecfg`: read, patch and re-emit zone configuration documents

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use tracing_subscriber::EnvFilter;
use zone_config::{decode, encode, DocumentFormat, ZoneConfig};

fn main() {
    init_tracing();

    if let Err(err) = run(cli().get_matches()) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn format_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .value_parser(value_parser!(DocumentFormat))
        .help(help)
}

fn cli() -> Command {
    Command::new("zonecfg")
        .version(zone_config::VERSION)
        .about("Read, patch and re-emit zone configuration documents")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("show")
                .about("Decode a zone config document and print it in canonical form")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Zone config document"),
                )
                .arg(format_arg("format", "Input format (default: from file extension)"))
                .arg(format_arg("output", "Output format (default: yaml)")),
        )
        .subcommand(
            Command::new("set")
                .about("Apply a partial zone config document on top of an existing config")
                .arg(
                    Arg::new("patch")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Partial zone config document to apply"),
                )
                .arg(
                    Arg::new("existing")
                        .long("existing")
                        .value_parser(value_parser!(PathBuf))
                        .help("Current zone config (default: built-in defaults)"),
                )
                .arg(format_arg(
                    "existing-format",
                    "Format of --existing (default: from its file extension)",
                ))
                .arg(format_arg("format", "Patch format (default: from file extension)"))
                .arg(format_arg("output", "Output format (default: yaml)")),
        )
        .subcommand(
            Command::new("default")
                .about("Print the default zone config")
                .arg(format_arg("output", "Output format (default: yaml)")),
        )
}

fn run(matches: ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", args)) => {
            let file = required_path(args, "file")?;
            let config = read_config(&ZoneConfig::new(), file, input_format(args))?;
            print_config(&config, output_format(args))
        }
        Some(("set", args)) => {
            let patch = required_path(args, "patch")?;
            let existing = load_existing(args)?;
            let merged = read_config(&existing, patch, input_format(args))?;
            tracing::info!(patch = %patch.display(), "applied zone config patch");
            print_config(&merged, output_format(args))
        }
        Some(("default", args)) => {
            print_config(&ZoneConfig::default_zone_config(), output_format(args))
        }
        _ => Ok(()),
    }
}

fn required_path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing argument <{name}>"))
}

fn input_format(args: &ArgMatches) -> Option<DocumentFormat> {
    args.get_one::<DocumentFormat>("format").copied()
}

// `--format` only describes the patch.
fn load_existing(args: &ArgMatches) -> Result<ZoneConfig> {
    match args.get_one::<PathBuf>("existing") {
        Some(path) => {
            let format = args.get_one::<DocumentFormat>("existing-format").copied();
            read_config(&ZoneConfig::new(), path, format)
        }
        None => Ok(ZoneConfig::default_zone_config()),
    }
}

fn output_format(args: &ArgMatches) -> DocumentFormat {
    args.get_one::<DocumentFormat>("output")
        .copied()
        .unwrap_or_default()
}

fn read_config(
    existing: &ZoneConfig,
    path: &Path,
    format: Option<DocumentFormat>,
) -> Result<ZoneConfig> {
    let format = format
        .or_else(|| DocumentFormat::from_path(path))
        .unwrap_or_default();
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    decode(existing, &text, format)
        .with_context(|| format!("failed to decode {} as {format}", path.display()))
}

fn print_config(config: &ZoneConfig, format: DocumentFormat) -> Result<()> {
    let text = encode(config, format).context("failed to encode zone config")?;
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}
