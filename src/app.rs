// Declare modules
pub mod cli;
pub mod config;
pub mod formatter;
pub mod glob;
pub mod ignore_file;
pub mod models;
pub mod paths;
pub mod rules;
pub mod scanner;
pub mod walker;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::fs;

use self::cli::Cli;
use self::config::resolve_config;
use self::formatter::{format_size, relative_path, OutputGenerator};
use self::models::Report;
use self::paths::absolutize;
use self::scanner::Scanner;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();
    init_logging(args.verbose);

    // 2. Identify Project Root & Name
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let project_name = current_dir.file_name().and_then(|n| n.to_str());

    // 3. Resolve Configuration
    let config = resolve_config(args, &current_dir, project_name)?;

    if config.rules.include.is_empty() {
        log::warn!("💡 Tip: No include patterns found. Add `++ <path>` lines to the rule file.");
    }

    // 4. Select Files
    let mut report = Report::default();
    let scanner = Scanner::new(current_dir.clone(), &config.rules)?;
    let mut files = scanner.scan(&mut report)?;

    // Never feed a previous run's output back in
    let output_path = absolutize(&config.output.to_string_lossy(), &current_dir);
    files.retain(|f| f != &output_path);

    if files.is_empty() {
        log::warn!("⚠️ No files matched the rule set.");
        return Ok(());
    }

    if config.list_only {
        for file in &files {
            println!("{}", relative_path(file, &current_dir));
        }
        return Ok(());
    }

    // 5. Generate Output
    let tree_str = OutputGenerator::generate_tree(&files, &current_dir);

    let final_output = if config.tree_only_output {
        OutputGenerator::format_tree_output(&tree_str)
    } else {
        let content_str = OutputGenerator::generate_content(&files, &current_dir, &mut report);
        OutputGenerator::format_full_output(&tree_str, &content_str)
    };

    // 6. Write or print
    if config.to_stdout {
        println!("{}", final_output);
    } else {
        fs::write(&output_path, &final_output)
            .with_context(|| format!("Failed to write output file {}", output_path.display()))?;
        log::info!("📄 Wrote {}", output_path.display());
    }

    if !config.tree_only_output {
        log_summary(&report);
    }

    Ok(())
}

fn log_summary(report: &Report) {
    log::info!(
        "✅ Processed {}/{} files ({})",
        report.processed_files,
        report.total_files,
        format_size(report.total_bytes)
    );
    if !report.skipped.is_empty() {
        log::warn!("Skipped {} files:", report.skipped.len());
        for skipped in &report.skipped {
            log::warn!("  {} ({})", skipped.path, skipped.reason);
        }
    }
}
