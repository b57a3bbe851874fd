use crate::application::read_models::{ReportReadModel, ReportTable};
use crate::ports::outbound::{RenderedFile, ReportFormatter};
use crate::shared::Result;
use serde::Serialize;
use serde_json::Value;

/// Top-level JSON document. Every table is a list of row objects keyed by
/// camel-cased header names.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport {
    recommendations: Vec<Value>,
    impacted: Vec<Value>,
    resource_type: Vec<Value>,
    inventory: Vec<Value>,
    advisor: Vec<Value>,
    azure_policy: Vec<Value>,
    #[serde(rename = "arcSQL")]
    arc_sql: Vec<Value>,
    defender: Vec<Value>,
    defender_recommendations: Vec<Value>,
    costs: Vec<Value>,
    out_of_scope: Vec<Value>,
    external_plugins: Vec<PluginSection>,
    carbon: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct PluginSection {
    name: String,
    description: String,
    results: Vec<Value>,
}

/// JsonFormatter adapter writing the whole report as `<prefix>.json`
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn rows(table: &ReportTable) -> Vec<Value> {
        table.to_json_rows()
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, model: &ReportReadModel, output_name: &str) -> Result<Vec<RenderedFile>> {
        let document = JsonReport {
            recommendations: Self::rows(&model.recommendations),
            impacted: Self::rows(&model.impacted),
            resource_type: Self::rows(&model.resource_types),
            inventory: Self::rows(&model.inventory),
            advisor: Self::rows(&model.advisor),
            azure_policy: Self::rows(&model.azure_policy),
            arc_sql: Self::rows(&model.arc_sql),
            defender: Self::rows(&model.defender),
            defender_recommendations: Self::rows(&model.defender_recommendations),
            costs: Self::rows(&model.costs),
            out_of_scope: Self::rows(&model.out_of_scope),
            external_plugins: model
                .plugins
                .iter()
                .map(|table| PluginSection {
                    name: table
                        .key
                        .strip_prefix("plugin-")
                        .unwrap_or(&table.key)
                        .to_string(),
                    description: table.title.clone(),
                    results: Self::rows(table),
                })
                .collect(),
            carbon: Self::rows(&model.carbon),
        };

        let contents = serde_json::to_string_pretty(&document)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON report: {}", e))?;

        Ok(vec![RenderedFile {
            file_name: format!("{}.json", output_name),
            contents,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::formatters::fixtures;

    fn render() -> (String, Value) {
        let files = JsonFormatter::new()
            .format(&fixtures::report(), "azqr_action_plan")
            .unwrap();
        assert_eq!(files.len(), 1);
        let parsed = serde_json::from_str(&files[0].contents).unwrap();
        (files[0].file_name.clone(), parsed)
    }

    #[test]
    fn test_single_file_named_after_prefix() {
        let (name, _) = render();
        assert_eq!(name, "azqr_action_plan.json");
    }

    #[test]
    fn test_top_level_keys() {
        let (_, json) = render();
        let object = json.as_object().unwrap();
        for key in [
            "recommendations",
            "impacted",
            "resourceType",
            "inventory",
            "advisor",
            "azurePolicy",
            "arcSQL",
            "defender",
            "defenderRecommendations",
            "costs",
            "outOfScope",
            "externalPlugins",
            "carbon",
        ] {
            assert!(object.contains_key(key), "missing key {}", key);
        }
        assert_eq!(object.len(), 13);
    }

    #[test]
    fn test_rows_use_camel_case_keys() {
        let (_, json) = render();
        let first = &json["recommendations"][0];
        assert_eq!(first["recommendationId"], "st-001");
        assert_eq!(first["subscriptionName"], "Production");
        assert_eq!(first["impact"], "High");
        assert_eq!(json["inventory"][0]["location"], "westeurope");
        assert_eq!(json["advisor"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_plugin_sections() {
        let (_, json) = render();
        let plugin = &json["externalPlugins"][0];
        assert_eq!(plugin["name"], "contoso");
        assert_eq!(plugin["description"], "Contoso checks");
        assert_eq!(plugin["results"][0]["resourceName"], "data|prod");
    }
}
