//! `report` - run the Portico e2e suite and render the PDF report
//!
//! Exit code 0 means a report was produced, even when tests inside the
//! suite failed; 1 means a fatal pipeline condition (no runner, missing
//! metadata, unwritable output). Cleanup of run artifacts happens on every
//! exit path.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};
use std::time::Instant;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use portico_harness::registry;
use portico_report::{cleanup, organize, pdf, ModuleStats, OrganizedRun, ReportConfig, RunnerDriver};

#[derive(Parser, Debug)]
#[command(name = "report")]
#[command(about = "Run the Portico e2e suite and render the PDF test report")]
#[command(version)]
struct Args {
    /// Path to the configuration file (defaults apply when absent)
    #[arg(long, default_value = "report.toml")]
    config: PathBuf,

    /// Do not ask the OS to open the finished report
    #[arg(long)]
    no_open: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = match ReportConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // Interrupts must scrub run artifacts just like normal exits
    install_interrupt_scrub(config.runner.clone());

    banner(&config);
    let outcome = run(&args, &config);

    // Scrub the result log and caches no matter how the run ended
    cleanup::scrub(&config.runner);

    match outcome {
        Ok(path) => {
            println!("Report written to {}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("report generation failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args, config: &ReportConfig) -> anyhow::Result<PathBuf> {
    let started = Instant::now();

    println!("[1/3] Running test suite...");
    let extractor = portico_harness::Extractor::new(&config.report.registry_file, ".");
    let driver = RunnerDriver::new(config.runner.clone(), extractor);
    let parsed = driver.run_all()?;

    println!("[2/3] Organizing results...");
    let organized = organize(parsed.tests);
    print_module_table(&organized);

    println!("[3/3] Rendering PDF...");
    fs::create_dir_all(&config.report.output_dir).with_context(|| {
        format!(
            "cannot create output directory {}",
            config.report.output_dir.display()
        )
    })?;
    let filename = pdf::report_filename(&config.project.name, Local::now());
    let output_path = config.report.output_dir.join(filename);
    pdf::render(&organized, config, &output_path)?;

    finalize_registry(&config.report.registry_file);
    print_summary(&organized, started.elapsed().as_secs_f64());

    if config.report.open_when_done && !args.no_open {
        open_in_viewer(&output_path);
    }
    Ok(output_path)
}

/// SIGINT/SIGTERM still leave the filesystem clean: scrub the result log
/// and caches, then exit with the conventional interrupt code.
fn install_interrupt_scrub(runner: portico_report::config::RunnerConfig) {
    if let Err(e) = ctrlc::set_handler(move || {
        cleanup::scrub(&runner);
        std::process::exit(130);
    }) {
        warn!("could not install interrupt cleanup: {e}");
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

fn banner(config: &ReportConfig) {
    println!("==================================================");
    println!(
        " Portico end-to-end test report ({} / {})",
        config.project.name, config.project.environment
    );
    println!("==================================================");
}

fn print_module_table(run: &OrganizedRun) {
    if run.is_empty() {
        println!("No tests were reported.");
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Module", "Total", "Passed", "Failed", "Success %"]);
    for (module, tests) in run.iter() {
        let stats = ModuleStats::from_tests(tests);
        table.add_row(vec![
            module.to_string(),
            stats.total.to_string(),
            stats.passed.to_string(),
            stats.failed.to_string(),
            stats.success_percent(),
        ]);
    }
    println!("{table}");
}

fn print_summary(run: &OrganizedRun, elapsed_seconds: f64) {
    let totals = run.totals();
    println!(
        "Totals: {} tests, {} passed, {} failed, {} skipped ({})",
        totals.total,
        totals.passed,
        totals.failed,
        totals.skipped,
        totals.success_percent()
    );
    let order: Vec<&str> = run.module_names().collect();
    println!("Page order: cover, {}", order.join(", "));
    info!("pipeline finished in {:.1}s", elapsed_seconds);
}

/// The registry snapshot is finalized once per run. When this process
/// never loaded the suites (results came from a separate runner process)
/// the in-memory registry is empty; skipping the write keeps the previous
/// run's file usable as a fallback.
fn finalize_registry(path: &Path) {
    let reg = registry::global();
    if reg.is_empty() {
        return;
    }
    if let Err(e) = reg.finalize(path) {
        warn!("could not finalize metadata registry: {e}");
    }
}

/// Best-effort: a failure to open the viewer never fails the run.
fn open_in_viewer(path: &Path) {
    match open_command(path) {
        Ok(_) => info!("opening {}", path.display()),
        Err(e) => warn!("could not open report: {e}"),
    }
}

#[cfg(target_os = "macos")]
fn open_command(path: &Path) -> std::io::Result<std::process::Child> {
    Command::new("open").arg(path).spawn()
}

#[cfg(target_os = "windows")]
fn open_command(path: &Path) -> std::io::Result<std::process::Child> {
    Command::new("cmd").args(["/C", "start", ""]).arg(path).spawn()
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn open_command(path: &Path) -> std::io::Result<std::process::Child> {
    Command::new("xdg-open").arg(path).spawn()
}
