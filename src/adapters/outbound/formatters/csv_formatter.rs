use crate::application::read_models::{ReportReadModel, ReportTable};
use crate::ports::outbound::{RenderedFile, ReportFormatter};
use crate::shared::Result;
use anyhow::Context;

/// CsvFormatter adapter writing one `<prefix>.<table>.csv` per table
///
/// Tables whose stage did not run are skipped; plugin tables are written
/// as `<prefix>.plugin-<name>.csv`.
pub struct CsvFormatter;

impl CsvFormatter {
    pub fn new() -> Self {
        Self
    }

    fn write_table(table: &ReportTable) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&table.headers)
            .with_context(|| format!("Failed to write CSV header for {}", table.key))?;
        for row in &table.rows {
            writer
                .write_record(row)
                .with_context(|| format!("Failed to write CSV row for {}", table.key))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV table {}: {}", table.key, e))?;
        Ok(String::from_utf8(bytes)?)
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for CsvFormatter {
    fn format(&self, model: &ReportReadModel, output_name: &str) -> Result<Vec<RenderedFile>> {
        model
            .enabled_tables()
            .into_iter()
            .map(|table| {
                Ok(RenderedFile {
                    file_name: format!("{}.{}.csv", output_name, table.key),
                    contents: Self::write_table(table)?,
                })
            })
            .collect()
    }
}
