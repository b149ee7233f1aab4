//! ndtips - registry, inspection and serving tools for Natural Docs
//! tooltip data.

mod cli;
mod config;
mod payload;
mod registry;
mod scan;
mod serve;
mod utils;
mod watch;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands};
use config::{TipsConfig, cfg, init_config};
use registry::{TooltipRegistry, TopicId};
use serve::serve_registry;
use std::{fs, io::Write, path::Path};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    config.validate()?;
    init_config(config);

    match &cli.command {
        Commands::Scan => run_scan(),
        Commands::Check => run_check(),
        Commands::Get { namespace, id } => run_get(namespace, *id),
        Commands::Export { output, compact } => run_export(output.as_deref(), *compact),
        Commands::Serve { .. } => {
            let (registry, _) = scan::load_registry(&cfg())?;
            serve_registry(registry)
        }
    }
}

/// Load configuration from CLI arguments.
///
/// The config file is optional; defaults apply when it is absent so the
/// tool works zero-config against an existing docs tree.
fn load_config(cli: &Cli) -> Result<TipsConfig> {
    let root = cli.root.as_deref().unwrap_or(Path::new("./"));
    let config_path = root.join(&cli.config);

    let mut config = if config_path.exists() {
        TipsConfig::from_path(&config_path)?
    } else {
        TipsConfig::default()
    };
    config.update_with_cli(cli);

    Ok(config)
}

/// Load the registry and print a summary.
fn run_scan() -> Result<()> {
    let c = cfg();
    let (registry, report) = scan::load_registry(&c)?;

    log!(
        "scan";
        "{}: {} files, {} namespaces, {} tooltips",
        c.base.title,
        report.files,
        registry.namespace_count(),
        registry.entry_count()
    );
    if !report.errors.is_empty() {
        log!("scan"; "{} file(s) skipped, run `ndtips check` for details", report.errors.len());
    }

    Ok(())
}

/// Validate every payload file; nonzero exit on any problem.
fn run_check() -> Result<()> {
    let c = cfg();
    let (registry, report) = scan::load_registry(&c)?;

    for (path, err) in &report.errors {
        log!("check"; "{}: {err}", path.display());
    }
    for namespace in &report.replaced {
        log!("check"; "namespace `{namespace}` is registered by more than one file");
    }

    if report.has_problems() {
        bail!(
            "{} problem(s) in {} payload file(s)",
            report.errors.len() + report.replaced.len(),
            report.files
        );
    }

    log!(
        "check";
        "ok: {} files, {} namespaces, {} tooltips",
        report.files,
        registry.namespace_count(),
        registry.entry_count()
    );
    Ok(())
}

/// Look up one fragment and print it.
fn run_get(namespace: &str, id: TopicId) -> Result<()> {
    let (registry, _) = scan::load_registry(&cfg())?;

    match registry.lookup(namespace, id) {
        Some(fragment) => {
            println!("{fragment}");
            Ok(())
        }
        None => bail!("no tooltip registered for `{namespace}` id {id}"),
    }
}

/// Dump the registry as JSON to a file or stdout.
fn run_export(output: Option<&Path>, compact: bool) -> Result<()> {
    let (registry, _) = scan::load_registry(&cfg())?;
    let json = to_json(&registry, compact)?;

    match output {
        Some(path) => {
            fs::write(path, json)?;
            log!(
                "scan";
                "exported {} namespaces to {}",
                registry.namespace_count(),
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}

fn to_json(registry: &TooltipRegistry, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(registry)?
    } else {
        serde_json::to_string_pretty(registry)?
    };
    Ok(json)
}
