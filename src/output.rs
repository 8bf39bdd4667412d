use clap::ValueEnum;
use prettytable::{format, Cell, Row, Table};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CliResult;
use crate::table::{project, RenderSpec};

/// Output format for the rendering commands. Configurable per profile,
/// overridable per command with `-o`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Renders records in the requested format. Table output goes through the
/// RenderSpec; JSON output is the records exactly as the server sent them.
pub fn print_output(
    records: &[Value],
    spec: &RenderSpec,
    output: OutputFormat,
    wide: bool,
) -> CliResult<()> {
    match output {
        OutputFormat::Table => print_table(records, spec, wide),
        OutputFormat::Json => print_json(&records)?,
    }
    Ok(())
}

pub fn print_table(records: &[Value], spec: &RenderSpec, wide: bool) {
    build_table(records, spec, wide).printstd();
}

pub fn build_table(records: &[Value], spec: &RenderSpec, wide: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table.set_titles(Row::new(
        spec.headers(wide).iter().map(|header| Cell::new(header)).collect(),
    ));
    for cells in project(records, spec, wide) {
        table.add_row(Row::new(cells.iter().map(|cell| Cell::new(cell)).collect()));
    }
    table
}

pub fn print_json<T: Serialize>(data: &T) -> CliResult<()> {
    println!("{}", json_string(data)?);
    Ok(())
}

pub fn json_string<T: Serialize>(data: &T) -> CliResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

pub fn print_error(message: &str) {
    eprintln!("\x1b[31m❌ Error: {}\x1b[0m", message);
}

pub fn print_info(message: &str) {
    println!("ℹ️  {}", message);
}
