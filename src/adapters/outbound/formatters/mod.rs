/// Formatter adapters for the report output formats
mod csv_formatter;
#[cfg(test)]
mod fixtures;
mod json_formatter;
mod markdown_formatter;

pub use csv_formatter::CsvFormatter;
pub use json_formatter::JsonFormatter;
pub use markdown_formatter::MarkdownFormatter;
