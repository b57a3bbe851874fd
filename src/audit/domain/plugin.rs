use super::Recommendation;

/// A loaded YAML plugin: metadata plus graph recommendations tagged with
/// the plugin's name as their source.
#[derive(Debug, Clone)]
pub struct PluginDefinition {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub recommendations: Vec<Recommendation>,
}

/// One table emitted by a plugin during plugin-scan
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PluginOutput {
    pub plugin_name: String,
    pub description: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}
