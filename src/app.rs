//! Application orchestrator.
//! Loads/merges config, initializes logging, installs the signal handler,
//! compiles run options, and invokes the rename.

use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

use smart_rename::cli::Args;
use smart_rename::config::{create_template_config, load_config_from_xml, CONFIG_ENV};
use smart_rename::output as out;
use smart_rename::{
    default_config_path, shutdown, smart_rename_with, Config, RenameReport, SmartRenameError,
    StdFileSystem,
};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    // Handle --print-config / --init-config before logging init
    if args.print_config {
        print_config_location();
        return Ok(());
    }
    if args.init_config {
        let path = default_config_path()?;
        create_template_config(&path)?;
        out::print_success(&format!("A template smart_rename config was written to: {}", path.display()));
        out::print_info(&format!("Edit it to set default patterns; set {CONFIG_ENV} to use another file."));
        return Ok(());
    }

    // Defaults < XML < CLI
    let mut cfg = load_config_from_xml()?.unwrap_or_default();
    args.apply_overrides(&mut cfg);

    let guard_opt = init_tracing(&cfg.log_level, cfg.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    // Guard needs to be dropped on SIGINT to flush logs
    let guard_slot = Arc::new(Mutex::new(guard_opt));
    {
        let guard_slot = Arc::clone(&guard_slot);
        ctrlc::set_handler(move || {
            shutdown::request();
            out::print_warn("Received interrupt; stopping before the next directory...");
            if let Ok(mut g) = guard_slot.lock() {
                let _ = g.take();
            }
        })
        .map_err(|e| anyhow!("failed to install signal handler: {e}"))?;
    }

    debug!("Starting smart_rename: {:?}", args);

    let result = execute(&args, &cfg);
    if let Err(e) = &result {
        log_failure(e);
    }

    // Ensure logs are flushed before exit
    if let Ok(mut g) = guard_slot.lock() {
        let _ = g.take();
    }
    result
}

fn execute(args: &Args, cfg: &Config) -> Result<()> {
    let input = args
        .input_dir
        .as_deref()
        .ok_or_else(|| anyhow!("missing INPUT_DIR"))?;
    let options = cfg.to_options()?;
    let fs = StdFileSystem::new(cfg.preserve_metadata);
    let report = smart_rename_with(&fs, input, &options)?;
    print_report(&report, cfg.dry_run);
    info!(input = %input.display(), "Rename completed");
    Ok(())
}

/// One line per changed file (scriptable), then a summary.
fn print_report(report: &RenameReport, dry_run: bool) {
    for dir in &report.directories {
        for entry in dir.mapping.iter().filter(|e| e.is_rename()) {
            let prefix = if dry_run { "would rename" } else { "renamed" };
            out::print_user(&format!(
                "{prefix}: '{}' -> '{}'",
                entry.source.display(),
                dir.destination.join(entry.destination.file_name().unwrap_or_default()).display()
            ));
        }
    }
    let summary = format!(
        "{} file(s) in {} director{}: {} renamed, {} duplicate name(s) resolved",
        report.files_processed(),
        report.directories.len(),
        if report.directories.len() == 1 { "y" } else { "ies" },
        report.files_renamed(),
        report.collisions_resolved()
    );
    if dry_run {
        out::print_info(&format!("Dry-run: {summary}"));
    } else {
        out::print_success(&summary);
    }
}

fn print_config_location() {
    if let Ok(cfg_env) = std::env::var(CONFIG_ENV) {
        out::print_info(&format!("Using {CONFIG_ENV} (explicit):\n  {}\n", cfg_env));
        out::print_info(&format!("To override, unset {CONFIG_ENV} or set it to another file."));
        return;
    }
    match default_config_path() {
        Ok(p) => {
            out::print_info(&format!("Default smart_rename config path:\n  {}\n", p.display()));
            if p.exists() {
                out::print_info("A config file already exists at that location.");
            } else {
                out::print_info("No config file exists there yet. Run with --init-config to create a template.");
            }
        }
        Err(e) => {
            out::print_error(&format!("Could not determine a default config path: {e}"));
        }
    }
}

fn log_failure(e: &anyhow::Error) {
    let Some(sr) = e.downcast_ref::<SmartRenameError>() else {
        error!(error = %format!("{e:#}"), "Rename failed");
        return;
    };
    let code = sr.code();
    let kind = sr.kind();
    match sr {
        SmartRenameError::InputNotFound(path) | SmartRenameError::NotADirectory(path) => {
            error!(code, kind, path = %path.display(), "Invalid input directory")
        }
        SmartRenameError::StagingNotEmpty(path) => {
            error!(code, kind, path = %path.display(), "Remove or inspect the leftover staging directory, then re-run")
        }
        SmartRenameError::InvalidName { source_path, name } => {
            error!(code, kind, path = %source_path.display(), %name, "Rename aborted before any copy")
        }
        SmartRenameError::Interrupted => error!(code, kind, "Rename aborted by user"),
        _ => error!(code, kind, error = %sr, "Rename failed"),
    }
}
