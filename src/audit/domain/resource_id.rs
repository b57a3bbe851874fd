//! Helpers for slicing fully qualified resource identifiers.
//!
//! A resource id has the shape
//! `/subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}[/...]`.
//! Every helper is total: malformed input yields an empty string rather than
//! an error, because ids come straight from provider rows.

fn segments(resource_id: &str) -> Vec<&str> {
    resource_id.split('/').collect()
}

/// Subscription id (third segment)
pub fn subscription_from_resource_id(resource_id: &str) -> String {
    segments(resource_id)
        .get(2)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Resource group name (fifth segment)
pub fn resource_group_from_resource_id(resource_id: &str) -> String {
    segments(resource_id)
        .get(4)
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// `/subscriptions/{sub}/resourceGroups/{rg}` prefix of a resource id
pub fn resource_group_id_from_resource_id(resource_id: &str) -> String {
    let parts = segments(resource_id);
    if parts.len() < 5 {
        return String::new();
    }
    parts[..5].join("/")
}

/// Canonical lower-cased `{namespace}/{type}`
pub fn resource_type_from_resource_id(resource_id: &str) -> String {
    let parts = segments(resource_id);
    if parts.len() < 8 {
        return String::new();
    }
    format!("{}/{}", parts[6], parts[7]).to_lowercase()
}

/// Last non-empty segment
pub fn resource_name_from_resource_id(resource_id: &str) -> String {
    resource_id
        .split('/')
        .rfind(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Checks the `/subscriptions/{id}/resourceGroups/{name}` form used by
/// include lists and `--resource-groups`.
pub fn is_valid_resource_group_id(id: &str) -> bool {
    let parts = segments(id);
    parts.len() == 5
        && parts[0].is_empty()
        && parts[1].eq_ignore_ascii_case("subscriptions")
        && !parts[2].is_empty()
        && parts[3].eq_ignore_ascii_case("resourcegroups")
        && !parts[4].is_empty()
}
