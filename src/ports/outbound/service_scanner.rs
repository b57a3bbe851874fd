use crate::audit::domain::Recommendation;

/// ServiceScanner port - the capability set of a per-type scanner
///
/// Scanners are registered by abbreviation (`st`, `kv`, ...). They own the
/// code rules for their resource types and the query used to hydrate
/// instances; the code-scan stage does the listing and evaluation.
pub trait ServiceScanner: Send + Sync {
    /// Short key used by `--scanners`
    fn abbreviation(&self) -> &'static str;

    /// Lower-cased resource types this scanner covers
    fn resource_types(&self) -> &'static [&'static str];

    /// Code rules, tagged with the code-rule source
    fn recommendations(&self) -> Vec<Recommendation>;

    /// Query that returns full instances (with `properties`, `sku`, `tags`,
    /// `zones`) of `resource_type`
    fn listing_query(&self, resource_type: &str) -> String {
        format!(
            "resources | where type =~ '{}' | project id, name, type, location, resourceGroup, subscriptionId, kind, sku, tags, zones, properties",
            resource_type
        )
    }
}
