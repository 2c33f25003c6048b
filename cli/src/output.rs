// cli/src/output.rs
// Output utilities for the CLI
// description: styles, progress bars and tables used to present lowering
// results and failures.

use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use sil2cast_core::bridge::EngineDescriptor;
use sil2cast_core::lower::InstBreakdown;
use sil2cast_core::{EngineReceipt, Level, LoweringStats, Sil2CastErrorExt};

/// Styles for different output elements
pub struct FormatStyle {
    pub title: Style,
    pub info: Style,
    pub warning: Style,
    pub error: Style,
    pub success: Style,
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle {
            title: Style::new().bold().underlined(),
            info: Style::new().cyan(),
            warning: Style::new().yellow(),
            error: Style::new().red().bold(),
            success: Style::new().green().bold(),
        }
    }
}

impl FormatStyle {
    pub fn for_level(&self, level: Level) -> &Style {
        match level {
            Level::Info => &self.info,
            Level::Warning => &self.warning,
            Level::Error | Level::Critical => &self.error,
        }
    }
}

// ====================================================================
// Progress

pub fn module_progress(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}") {
        bar.set_style(style.progress_chars("#>-"));
    }
    bar
}

// ====================================================================
// Tables

pub fn summary_table(module: &str, stats: &LoweringStats, receipt: Option<&EngineReceipt>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["module", "functions", "blocks", "instructions", "unsupported", "nodes"]);
    table.add_row(vec![
        module.to_string(),
        stats.functions.to_string(),
        stats.blocks.to_string(),
        stats.instructions.to_string(),
        stats.unsupported.to_string(),
        stats.nodes.to_string(),
    ]);
    if let Some(r) = receipt {
        table.add_row(vec![
            format!("engine: {}", r.engine),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            r.nodes.to_string(),
        ]);
    }
    table
}

pub fn breakdown_table(entries: &[InstBreakdown]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["function", "block", "#", "op", "source", "mem", "rel", "operands"]);
    for e in entries {
        table.add_row(vec![
            e.function.clone(),
            e.block.clone(),
            e.index.to_string(),
            e.op.clone(),
            e.location.clone(),
            e.memory.unwrap_or("-").to_string(),
            e.releasing.to_string(),
            e.operands.join(", "),
        ]);
    }
    table
}

pub fn engines_table(descriptors: &[&EngineDescriptor], registered: &[String]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["name", "version", "kind", "loaded", "description"]);
    for d in descriptors {
        let loaded = registered.iter().any(|n| *n == d.manifest.name);
        table.add_row(vec![
            d.manifest.name.clone(),
            d.manifest.version.clone(),
            d.manifest.kind_label().to_string(),
            if loaded { "yes" } else { "no" }.to_string(),
            d.manifest.description.clone(),
        ]);
    }
    table
}

// ====================================================================
// Reports

pub fn report_error(style: &FormatStyle, context: &str, error: &dyn Sil2CastErrorExt) {
    let report = sil2cast_core::generate_error_report(error);
    eprintln!("{} {}", style.for_level(error.level()).apply_to(format!("{}:", context)), report);
}

pub fn report_diagnostics(style: &FormatStyle, diagnostics: &[Box<dyn Sil2CastErrorExt>]) {
    for d in diagnostics {
        let report = sil2cast_core::generate_error_report(d.as_ref());
        eprintln!("{}", style.for_level(d.level()).apply_to(report));
    }
}
