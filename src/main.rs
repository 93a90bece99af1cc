mod cli;
mod output;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use quickclean::disk_info::get_disk_info;
use quickclean::utils::display_path;
use quickclean::{Catalog, CleanEvent, Config, EngineError, Orchestrator, PlatformDirs};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let fallback = if cli.verbose { "quickclean=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), EngineError> {
    let config = Config::load(cli.config.as_deref())?;
    let dirs = PlatformDirs::resolve(&config.paths)?;
    let catalog = Catalog::standard(&dirs)?;

    for key in config.browsers.keys() {
        if !catalog.families().any(|(known, _)| known == key) {
            output::print_warning(&format!("config names unknown browser family {key:?}"));
        }
    }

    match cli.command {
        Command::List => {
            list(&catalog);
            Ok(())
        }
        Command::Paths => {
            paths(&dirs);
            Ok(())
        }
        Command::Clean {
            only,
            skip,
            no_browsers,
        } => {
            let families = chosen_families(&catalog, &config, only.as_deref(), &skip, no_browsers)?;
            clean(catalog, &dirs, &families)
        }
    }
}

fn list(catalog: &Catalog) {
    output::print_banner();
    let presence = catalog.presence();

    output::print_section("Always run");
    for entry in catalog.entries().iter().filter(|e| e.family.is_none()) {
        output::print_base_task(entry.name);
    }
    println!();

    output::print_section("Browser caches");
    for entry in catalog.entries() {
        if let Some(key) = entry.family {
            let present = presence.get(key).copied().unwrap_or(false);
            output::print_family_task(entry.name, key, present);
        }
    }
}

fn paths(dirs: &PlatformDirs) {
    output::print_section("Directories");
    let home = dirs.home.as_path();
    output::print_dir("home", &dirs.home.display().to_string());
    output::print_dir("temp", &display_path(&dirs.temp, home));
    output::print_dir("roaming", &display_path(&dirs.roaming, home));
    output::print_dir("local", &display_path(&dirs.local, home));
    output::print_dir("cache", &display_path(&dirs.cache, home));
    output::print_dir("os root", &dirs.os_root.display().to_string());
}

fn clean(catalog: Catalog, dirs: &PlatformDirs, families: &[String]) -> Result<(), EngineError> {
    let selection = catalog.select(families.iter().map(String::as_str))?;
    let orchestrator = Orchestrator::new(catalog);

    output::print_banner();
    if families.is_empty() {
        output::print_info("No browser caches selected.");
    }

    let disk_before = get_disk_info(&dirs.home);
    let handle = orchestrator.start(selection)?;

    for event in handle.events() {
        match event {
            CleanEvent::Stage { name, step, total } => output::print_stage(&name, step, total),
            CleanEvent::Progress { freed } => output::print_progress(freed),
            CleanEvent::Done { freed } => {
                let gain = disk_before
                    .zip(get_disk_info(&dirs.home))
                    .map(|(before, after)| after.gained_since(&before));
                output::print_separator();
                output::print_done(freed, gain);
            }
        }
    }

    let totals = handle.wait();
    if totals.suppressed > 0 {
        output::print_info(&format!(
            "{} item(s) could not be removed (in use or access denied).",
            totals.suppressed
        ));
    }
    Ok(())
}

/// Families to clean: `--only` replaces the config table, then `--skip`
/// and `--no-browsers` take families away.
fn chosen_families(
    catalog: &Catalog,
    config: &Config,
    only: Option<&[String]>,
    skip: &[String],
    no_browsers: bool,
) -> Result<Vec<String>, EngineError> {
    let known: Vec<&str> = catalog.families().map(|(key, _)| key).collect();
    for key in only.into_iter().flatten().chain(skip) {
        if !known.contains(&key.as_str()) {
            return Err(EngineError::UnknownFamily(key.clone()));
        }
    }
    if no_browsers {
        return Ok(Vec::new());
    }

    Ok(known
        .into_iter()
        .filter(|key| match only {
            Some(list) => list.iter().any(|o| o == key),
            None => config.browser_enabled(key),
        })
        .filter(|key| !skip.iter().any(|s| s == key))
        .map(String::from)
        .collect())
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(&format!(": {cause}"));
        source = cause.source();
    }
    message
}
