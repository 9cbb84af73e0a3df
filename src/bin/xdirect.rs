//! Command-line interface for xdirect
//! This binary runs directive scripts against XML documents and checks script syntax.
//!
//! Usage:
//!   xdirect apply `<script>` [--input `<xml>`] [--indent `<n>`] [--no-declaration] [--encoding]
//!   xdirect check `<script>` [--emit canonical|json|yaml]
//!
//! Both commands accept `--config <file>` (layered over the built-in defaults)
//! and `--verbose`. `RUST_LOG` takes precedence over `--verbose`.

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs;
use std::path::PathBuf;
use sxd_document::Package;
use tracing::info;
use tracing_subscriber::EnvFilter;
use xdirect::config::{EmitFormat, Loader, XdirectConfig};
use xdirect::error::XdResult;
use xdirect::xml::{parse_package, render, XmlDocument};
use xdirect::{Runner, Script};

fn cli() -> Command {
    Command::new("xdirect")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build and edit XML documents with directive scripts")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log every executed directive to stderr"),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply a script to a document and print the result")
                .arg(
                    Arg::new("script")
                        .help("Path to the directive script")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .short('i')
                        .value_parser(clap::value_parser!(PathBuf))
                        .help("XML document to modify (defaults to an empty document)"),
                )
                .arg(
                    Arg::new("indent")
                        .long("indent")
                        .value_parser(clap::value_parser!(u16))
                        .help("Indent nested elements by this many spaces"),
                )
                .arg(
                    Arg::new("no-declaration")
                        .long("no-declaration")
                        .action(ArgAction::SetTrue)
                        .help("Omit the <?xml ...?> prolog"),
                )
                .arg(
                    Arg::new("encoding")
                        .long("encoding")
                        .action(ArgAction::SetTrue)
                        .help("Name the encoding in the prolog"),
                ),
        )
        .subcommand(
            Command::new("check")
                .about("Parse a script and print it back")
                .arg(
                    Arg::new("script")
                        .help("Path to the directive script")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .index(1),
                )
                .arg(
                    Arg::new("emit")
                        .long("emit")
                        .short('e')
                        .value_parser(["canonical", "json", "yaml"])
                        .help("Output format"),
                ),
        )
}

fn main() {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    if let Err(e) = run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "xdirect=debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(matches: &ArgMatches) -> XdResult<()> {
    match matches.subcommand() {
        Some(("apply", apply_matches)) => {
            let config = load_config(matches, apply_matches)?;
            handle_apply_command(apply_matches, &config)
        }
        Some(("check", check_matches)) => {
            let config = load_config(matches, check_matches)?;
            handle_check_command(check_matches, &config)
        }
        _ => unreachable!("a subcommand is required"),
    }
}

/// Layer the `--config` file and the subcommand's flags over the defaults.
fn load_config(matches: &ArgMatches, sub_matches: &ArgMatches) -> XdResult<XdirectConfig> {
    let mut loader = Loader::new();
    if let Some(path) = sub_matches
        .get_one::<PathBuf>("config")
        .or_else(|| matches.get_one::<PathBuf>("config"))
    {
        loader = loader.with_file(path);
    }

    let flag = |name: &str| {
        sub_matches
            .try_get_one::<bool>(name)
            .ok()
            .flatten()
            .copied()
            .unwrap_or(false)
    };
    if let Ok(Some(indent)) = sub_matches.try_get_one::<u16>("indent") {
        loader = loader.set_override("render.indent", i64::from(*indent))?;
    }
    if flag("no-declaration") {
        loader = loader.set_override("render.declaration", false)?;
    }
    if flag("encoding") {
        loader = loader.set_override("render.encoding", true)?;
    }
    if let Ok(Some(emit)) = sub_matches.try_get_one::<String>("emit") {
        loader = loader.set_override("check.emit", emit.as_str())?;
    }

    Ok(loader.build()?)
}

fn read_script(matches: &ArgMatches) -> XdResult<Script> {
    let path = matches
        .get_one::<PathBuf>("script")
        .expect("script is a required argument");
    let source = fs::read_to_string(path)?;
    let script = Script::parse(&source)?;
    info!(path = %path.display(), directives = script.len(), "parsed script");
    Ok(script)
}

/// Handle the apply command
fn handle_apply_command(matches: &ArgMatches, config: &XdirectConfig) -> XdResult<()> {
    let script = read_script(matches)?;
    let package = match matches.get_one::<PathBuf>("input") {
        Some(path) => parse_package(&fs::read_to_string(path)?)?,
        None => Package::new(),
    };
    let mut document = XmlDocument::new(package.as_document());
    Runner::new(script).apply(&mut document)?;
    println!("{}", render(&document, &config.render)?);
    Ok(())
}

/// Handle the check command
fn handle_check_command(matches: &ArgMatches, config: &XdirectConfig) -> XdResult<()> {
    let script = read_script(matches)?;
    let output = match config.check.emit {
        EmitFormat::Canonical => script.to_string(),
        EmitFormat::Json => serde_json::to_string_pretty(&script)?,
        EmitFormat::Yaml => serde_yaml::to_string(&script)?,
    };
    println!("{}", output.trim_end());
    Ok(())
}
