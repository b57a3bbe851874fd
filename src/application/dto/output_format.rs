/// Output format enumeration for report rendering
///
/// Shared by the CLI, which parses `--format`, and the renderer factory,
/// which maps each format to a formatter adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Single JSON document with every table
    Json,
    /// One CSV file per table
    Csv,
    /// Markdown document with the recommendation table
    Markdown,
}

impl OutputFormat {
    /// Every format, in the order reports are written
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Json, OutputFormat::Csv, OutputFormat::Markdown];

    /// Parses a comma separated list such as `json,csv`. Duplicates collapse.
    pub fn parse_list(value: &str) -> Result<Vec<Self>, String> {
        let mut formats = Vec::new();
        for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let format: OutputFormat = part.parse()?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        if formats.is_empty() {
            return Err("No output format given. Please specify 'json', 'csv' or 'md'".to_string());
        }
        Ok(formats)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            _ => Err(format!(
                "Invalid format: {}. Please specify 'json', 'csv' or 'md'",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Markdown => write!(f, "md"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_output_format_from_str_case_insensitive() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("Csv").unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str("md").unwrap(), OutputFormat::Markdown);
        assert_eq!(
            OutputFormat::from_str("MARKDOWN").unwrap(),
            OutputFormat::Markdown
        );
    }

    #[test]
    fn test_output_format_from_str_invalid() {
        let error = OutputFormat::from_str("xlsx").unwrap_err();
        assert!(error.contains("Invalid format"));
        assert!(error.contains("xlsx"));
    }

    #[test]
    fn test_parse_list_keeps_order_and_drops_duplicates() {
        let formats = OutputFormat::parse_list("csv, json,csv").unwrap();
        assert_eq!(formats, vec![OutputFormat::Csv, OutputFormat::Json]);
    }

    #[test]
    fn test_parse_list_rejects_empty_and_unknown() {
        assert!(OutputFormat::parse_list("").is_err());
        assert!(OutputFormat::parse_list("json,pdf").is_err());
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
        assert_eq!(OutputFormat::Markdown.to_string(), "md");
    }
}
