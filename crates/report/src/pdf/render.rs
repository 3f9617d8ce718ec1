//! PDF report composition
//!
//! One portrait cover page (header block plus executive summary), then one
//! landscape page per module in organized order. All layout goes through
//! [`PageBuilder`]; this module only decides what appears where.

use chrono::{DateTime, Local};
use printpdf::PdfDocument;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

use portico_harness::types::{EnrichedTest, TestOutcome};

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::organize::OrganizedRun;
use crate::pdf::layout::{
    Cell, Fonts, PageBuilder, TableStyle, FAIL_RED, LETTER_LANDSCAPE, LETTER_PORTRAIT,
    PASS_GREEN,
};
use crate::stats::ModuleStats;

/// Column widths of the executive summary table, inches.
const SUMMARY_WIDTHS_IN: [f64; 5] = [2.5, 0.8, 0.8, 0.8, 1.0];

/// Column widths of the per-module details table, inches.
const DETAILS_WIDTHS_IN: [f64; 7] = [0.6, 1.5, 2.8, 2.0, 2.0, 0.8, 0.6];

/// Output filename: `report_tests_<project>_<YYYYMMDD_HHMMSS>.pdf`.
/// Second resolution by contract; same-second invocations collide and the
/// later one overwrites.
pub fn report_filename(project: &str, now: DateTime<Local>) -> String {
    format!("report_tests_{}_{}.pdf", project, now.format("%Y%m%d_%H%M%S"))
}

/// Render `run` to `output_path`.
pub fn render(run: &OrganizedRun, config: &ReportConfig, output_path: &Path) -> Result<()> {
    render_at(run, config, output_path, Local::now())
}

/// Same as [`render`] with an explicit timestamp, for reproducible tests.
pub fn render_at(
    run: &OrganizedRun,
    config: &ReportConfig,
    output_path: &Path,
    generated_at: DateTime<Local>,
) -> Result<()> {
    let title = format!("Test Report — {}", config.project.name);
    let (doc, cover_page, cover_layer) = PdfDocument::new(
        &title,
        printpdf::Mm(LETTER_PORTRAIT.width),
        printpdf::Mm(LETTER_PORTRAIT.height),
        "content",
    );
    let fonts = Fonts::load(&doc)?;
    let style = TableStyle::default();

    let cover = PageBuilder::on_layer(
        doc.get_page(cover_page).get_layer(cover_layer),
        &fonts,
        LETTER_PORTRAIT,
    );
    draw_cover(cover, run, config, &style, &title, generated_at);

    // Template switch: every page after the cover is landscape.
    for (module, tests) in run.iter() {
        let page = PageBuilder::add_page(&doc, &fonts, LETTER_LANDSCAPE);
        draw_module_page(page, module, tests, &style);
    }

    let file = File::create(output_path).map_err(|e| {
        ReportError::Render(format!("cannot create {}: {}", output_path.display(), e))
    })?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ReportError::Render(e.to_string()))?;

    info!(
        "rendered {} module page(s) to {}",
        run.module_count(),
        output_path.display()
    );
    Ok(())
}

fn draw_cover(
    mut page: PageBuilder<'_>,
    run: &OrganizedRun,
    config: &ReportConfig,
    style: &TableStyle,
    title: &str,
    generated_at: DateTime<Local>,
) {
    page.spacer(8.0);
    page.centered(title, 20.0, true);
    page.spacer(8.0);

    page.line(
        &format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        10.0,
        false,
    );
    page.line(&format!("Project: {}", config.project.name), 10.0, false);
    page.line(&format!("Version: {}", config.project.version), 10.0, false);
    page.line(
        &format!("Environment: {}", config.project.environment),
        10.0,
        false,
    );
    page.line(
        &format!("Services covered: {}", config.project.services.join(", ")),
        10.0,
        false,
    );
    page.line(
        "Metadata extracted statically from test annotations",
        10.0,
        false,
    );
    page.spacer(10.0);

    page.centered("Executive Summary", 14.0, true);
    page.spacer(4.0);

    let rows: Vec<Vec<Cell>> = run
        .iter()
        .map(|(module, tests)| summary_row(module, &ModuleStats::from_tests(tests)))
        .collect();
    let totals = run.totals();
    let footer: Vec<Cell> = summary_row("TOTAL", &totals)
        .into_iter()
        .map(|cell| Cell::bold(cell.text))
        .collect();

    page.table(
        &SUMMARY_WIDTHS_IN,
        &["Module", "Total", "Passed", "Failed", "Success %"],
        &rows,
        Some(&footer),
        style,
    );
}

fn summary_row(module: &str, stats: &ModuleStats) -> Vec<Cell> {
    vec![
        Cell::new(module),
        Cell::new(stats.total.to_string()),
        Cell::new(stats.passed.to_string()),
        Cell::new(stats.failed.to_string()),
        Cell::new(stats.success_percent()),
    ]
}

fn draw_module_page(
    mut page: PageBuilder<'_>,
    module: &str,
    tests: &[EnrichedTest],
    style: &TableStyle,
) {
    let stats = ModuleStats::from_tests(tests);

    page.line(&format!("Module: {module}"), 16.0, true);
    page.spacer(2.0);
    page.paragraph(
        &format!(
            "Total: {}   Passed: {}   Failed: {}   Success rate: {}",
            stats.total,
            stats.passed,
            stats.failed,
            stats.success_percent()
        ),
        10.0,
    );
    page.spacer(4.0);

    let rows: Vec<Vec<Cell>> = tests.iter().map(details_row).collect();
    page.table(
        &DETAILS_WIDTHS_IN,
        &[
            "ID",
            "Test",
            "Description",
            "Expected Result",
            "Actual Result",
            "Status",
            "Duration(s)",
        ],
        &rows,
        None,
        style,
    );
}

fn details_row(test: &EnrichedTest) -> Vec<Cell> {
    vec![
        Cell::new(&test.metadata.test_id),
        Cell::new(&test.name),
        Cell::new(&test.metadata.description),
        Cell::new(&test.metadata.expected_result),
        Cell::new(&test.actual_result_text),
        status_cell(test.outcome),
        Cell::new(format!("{:.3}", test.duration_seconds)),
    ]
}

fn status_cell(outcome: TestOutcome) -> Cell {
    match outcome {
        TestOutcome::Passed => Cell::colored("\u{2713} PASS", PASS_GREEN),
        TestOutcome::Failed => Cell::colored("\u{2717} FAIL", FAIL_RED),
        other => Cell::new(other.as_str()),
    }
}
