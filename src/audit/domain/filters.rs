use super::resource_id::{
    resource_group_id_from_resource_id, resource_type_from_resource_id,
    subscription_from_resource_id,
};
use std::collections::HashSet;

/// Include/exclude membership policy for a scan.
///
/// Every set stores lower-cased values and every predicate lower-cases its
/// argument, so callers may pass ids in whatever casing the provider used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    include_subscriptions: HashSet<String>,
    include_resource_groups: HashSet<String>,
    include_resource_types: HashSet<String>,
    exclude_subscriptions: HashSet<String>,
    exclude_resource_groups: HashSet<String>,
    exclude_services: HashSet<String>,
    exclude_recommendations: HashSet<String>,
}

fn lowered<I, S>(values: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_subscriptions<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, v: I) -> Self {
        self.include_subscriptions.extend(lowered(v));
        self
    }

    pub fn include_resource_groups<I: IntoIterator<Item = S>, S: AsRef<str>>(
        mut self,
        v: I,
    ) -> Self {
        self.include_resource_groups.extend(lowered(v));
        self
    }

    pub fn include_resource_types<I: IntoIterator<Item = S>, S: AsRef<str>>(
        mut self,
        v: I,
    ) -> Self {
        self.include_resource_types.extend(lowered(v));
        self
    }

    pub fn exclude_subscriptions<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, v: I) -> Self {
        self.exclude_subscriptions.extend(lowered(v));
        self
    }

    pub fn exclude_resource_groups<I: IntoIterator<Item = S>, S: AsRef<str>>(
        mut self,
        v: I,
    ) -> Self {
        self.exclude_resource_groups.extend(lowered(v));
        self
    }

    pub fn exclude_services<I: IntoIterator<Item = S>, S: AsRef<str>>(mut self, v: I) -> Self {
        self.exclude_services.extend(lowered(v));
        self
    }

    pub fn exclude_recommendations<I: IntoIterator<Item = S>, S: AsRef<str>>(
        mut self,
        v: I,
    ) -> Self {
        self.exclude_recommendations.extend(lowered(v));
        self
    }

    /// Narrows include-resource-types to `types`. When include-types is
    /// already non-empty the result is the intersection, otherwise `types`.
    pub fn restrict_resource_types<I: IntoIterator<Item = S>, S: AsRef<str>>(
        mut self,
        types: I,
    ) -> Self {
        let types = lowered(types);
        if self.include_resource_types.is_empty() {
            self.include_resource_types = types;
        } else {
            self.include_resource_types.retain(|t| types.contains(t));
        }
        self
    }

    /// Exclude wins; otherwise a non-empty include set requires membership.
    pub fn is_subscription_excluded(&self, subscription_id: &str) -> bool {
        let id = subscription_id.to_lowercase();
        if self.exclude_subscriptions.contains(&id) {
            return true;
        }
        !self.include_subscriptions.is_empty() && !self.include_subscriptions.contains(&id)
    }

    /// Takes a resource-group id (`/subscriptions/{id}/resourceGroups/{name}`).
    pub fn is_resource_group_excluded(&self, resource_group_id: &str) -> bool {
        let id = resource_group_id.to_lowercase();
        if self.include_resource_groups.contains(&id) {
            return false;
        }
        if !self.include_resource_groups.is_empty() {
            return true;
        }
        self.exclude_resource_groups.contains(&id)
    }

    pub fn is_resource_type_excluded(&self, resource_type: &str) -> bool {
        !self.include_resource_types.is_empty()
            && !self
                .include_resource_types
                .contains(&resource_type.to_lowercase())
    }

    /// Composite check: type gate, subscription, resource group, then the
    /// explicit services list.
    pub fn is_resource_excluded(&self, resource_id: &str) -> bool {
        let resource_type = resource_type_from_resource_id(resource_id);
        if !resource_type.is_empty() && self.is_resource_type_excluded(&resource_type) {
            return true;
        }
        if self.is_subscription_excluded(&subscription_from_resource_id(resource_id)) {
            return true;
        }
        let group_id = resource_group_id_from_resource_id(resource_id);
        if !group_id.is_empty() && self.is_resource_group_excluded(&group_id) {
            return true;
        }
        self.is_service_excluded(resource_id)
    }

    /// Like [`Filters::is_resource_excluded`] but with the resource type
    /// supplied by the caller, for ids whose type segment is nested.
    pub fn is_typed_resource_excluded(&self, resource_id: &str, resource_type: &str) -> bool {
        self.is_resource_type_excluded(resource_type) || self.is_resource_excluded(resource_id)
    }

    /// Only the explicit services list; used by provider-native projections
    pub fn is_service_excluded(&self, resource_id: &str) -> bool {
        self.exclude_services.contains(&resource_id.to_lowercase())
    }

    pub fn is_recommendation_excluded(&self, recommendation_id: &str) -> bool {
        self.exclude_recommendations
            .contains(&recommendation_id.to_lowercase())
    }

    pub fn included_subscriptions(&self) -> &HashSet<String> {
        &self.include_subscriptions
    }

    pub fn included_resource_types(&self) -> &HashSet<String> {
        &self.include_resource_types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SA: &str =
        "/subscriptions/S1/resourceGroups/rg-a/providers/Microsoft.Storage/storageAccounts/sa1";
    const VM: &str =
        "/subscriptions/S1/resourceGroups/rg-a/providers/Microsoft.Compute/virtualMachines/vm1";

    #[test]
    fn test_empty_filters_include_everything() {
        let filters = Filters::new();
        assert!(!filters.is_subscription_excluded("S1"));
        assert!(!filters.is_resource_group_excluded("/subscriptions/S1/resourceGroups/rg-a"));
        assert!(!filters.is_resource_type_excluded("microsoft.storage/storageaccounts"));
        assert!(!filters.is_resource_excluded(SA));
        assert!(!filters.is_recommendation_excluded("st-001"));
    }

    #[test]
    fn test_subscription_exclude_wins_over_include() {
        let filters = Filters::new()
            .include_subscriptions(["S1"])
            .exclude_subscriptions(["S1", "S2"]);
        let active: Vec<&str> = ["S1", "S2", "S3"]
            .into_iter()
            .filter(|s| !filters.is_subscription_excluded(s))
            .collect();
        assert!(active.is_empty());
    }

    #[test]
    fn test_subscription_include_requires_membership() {
        let filters = Filters::new().include_subscriptions(["S1"]);
        assert!(!filters.is_subscription_excluded("s1"));
        assert!(filters.is_subscription_excluded("S3"));
    }

    #[test]
    fn test_resource_group_include_beats_exclude() {
        let rg = "/subscriptions/S1/resourceGroups/rg-a";
        let filters = Filters::new()
            .include_resource_groups([rg])
            .exclude_resource_groups([rg]);
        assert!(!filters.is_resource_group_excluded(rg));
        assert!(filters.is_resource_group_excluded("/subscriptions/S1/resourceGroups/rg-b"));

        let exclude_only = Filters::new().exclude_resource_groups([rg]);
        assert!(exclude_only.is_resource_group_excluded(&rg.to_uppercase()));
        assert!(!exclude_only.is_resource_group_excluded("/subscriptions/S1/resourceGroups/rg-b"));
    }

    #[test]
    fn test_resource_type_gating() {
        let filters = Filters::new().include_resource_types(["microsoft.storage/storageaccounts"]);
        assert!(!filters.is_resource_excluded(SA));
        assert!(filters.is_resource_excluded(VM));
    }

    #[test]
    fn test_resource_excluded_by_service_list_case_insensitive() {
        let filters = Filters::new().exclude_services([SA.to_uppercase()]);
        assert!(filters.is_resource_excluded(SA));
        assert!(!filters.is_resource_excluded(VM));
    }

    #[test]
    fn test_resource_excluded_by_subscription_or_group() {
        let by_sub = Filters::new().exclude_subscriptions(["s1"]);
        assert!(by_sub.is_resource_excluded(SA));

        let by_group = Filters::new().exclude_resource_groups(["/subscriptions/s1/resourcegroups/rg-a"]);
        assert!(by_group.is_resource_excluded(VM));
    }

    #[test]
    fn test_recommendation_exclusion() {
        let filters = Filters::new().exclude_recommendations(["ST-001"]);
        assert!(filters.is_recommendation_excluded("st-001"));
        assert!(!filters.is_recommendation_excluded("st-002"));
    }

    #[test]
    fn test_restrict_resource_types_intersects() {
        let filters = Filters::new()
            .include_resource_types(["a/b", "c/d"])
            .restrict_resource_types(["c/d", "e/f"]);
        assert!(filters.is_resource_type_excluded("a/b"));
        assert!(!filters.is_resource_type_excluded("c/d"));
        assert!(filters.is_resource_type_excluded("e/f"));

        let from_empty = Filters::new().restrict_resource_types(["e/f"]);
        assert!(!from_empty.is_resource_type_excluded("E/F"));
        assert!(from_empty.is_resource_type_excluded("a/b"));
    }

    #[test]
    fn test_blank_entries_are_ignored() {
        let filters = Filters::new().include_subscriptions(["", "  "]);
        assert!(filters.included_subscriptions().is_empty());
        assert!(!filters.is_subscription_excluded("anything"));
    }
}
