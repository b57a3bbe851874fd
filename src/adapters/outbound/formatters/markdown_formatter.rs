use crate::application::read_models::{ReportMetadataView, ReportReadModel, ReportTable};
use crate::ports::outbound::{RenderedFile, ReportFormatter};
use crate::shared::Result;

/// Columns of the recommendation table, in document order
const DOCUMENT_COLUMNS: [&str; 7] = [
    "Impact",
    "Category",
    "Recommendation",
    "Resource Type",
    "Resource Name",
    "Subscription Name",
    "Source",
];

/// MarkdownFormatter adapter producing `<prefix>.md`
///
/// The document is a short masthead followed by a single table of
/// recommendation rows, highest impact first.
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    pub fn new() -> Self {
        Self
    }

    /// Escapes pipe characters and newlines for safe Markdown table rendering
    fn escape_markdown_table_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }

    fn render_header(&self, output: &mut String, metadata: &ReportMetadataView) {
        output.push_str("# Azure Quick Review\n\n");
        output.push_str(&format!(
            "- Generated: {}\n- Tool: {} {}\n- Scan: {}\n- Subscriptions: {}\n\n",
            metadata.generated_at,
            metadata.tool_name,
            metadata.tool_version,
            metadata.scan_id,
            metadata.subscriptions
        ));
    }

    fn render_recommendations(&self, output: &mut String, table: &ReportTable) {
        output.push_str("## Recommendations\n\n");
        if table.is_empty() {
            output.push_str("No recommendations were raised for the scanned resources.\n");
            return;
        }

        let columns: Vec<Option<usize>> =
            DOCUMENT_COLUMNS.iter().map(|h| table.column(h)).collect();
        let impact = table.column("Impact");

        let mut rows: Vec<&Vec<String>> = table.rows.iter().collect();
        if let Some(i) = impact {
            // stable: ties keep report order
            rows.sort_by_key(|row| impact_rank(row.get(i).map(String::as_str).unwrap_or("")));
        }

        output.push_str(&format!("| {} |\n", DOCUMENT_COLUMNS.join(" | ")));
        output.push_str(&format!(
            "|{}\n",
            DOCUMENT_COLUMNS.iter().map(|_| "---|").collect::<String>()
        ));
        for row in rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|c| {
                    c.and_then(|i| row.get(i))
                        .map(|v| Self::escape_markdown_table_cell(v))
                        .unwrap_or_default()
                })
                .collect();
            output.push_str(&format!("| {} |\n", cells.join(" | ")));
        }
    }
}

fn impact_rank(impact: &str) -> u8 {
    match impact {
        "High" => 0,
        "Medium" => 1,
        "Low" => 2,
        _ => 3,
    }
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, model: &ReportReadModel, output_name: &str) -> Result<Vec<RenderedFile>> {
        let mut output = String::new();
        self.render_header(&mut output, &model.metadata);
        self.render_recommendations(&mut output, &model.recommendations);

        Ok(vec![RenderedFile {
            file_name: format!("{}.md", output_name),
            contents: output,
        }])
    }
}
