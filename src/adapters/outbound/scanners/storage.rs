use super::rules::{
    code_rule, lacks_prefix, missing_diagnostics, missing_private_endpoint, missing_tags,
    NAMING_URL, TAGS_URL,
};
use crate::audit::domain::{
    AuxiliaryIndexes, Category, Impact, Recommendation, RecommendationType, ResourceInstance,
    RuleOutcome,
};
use crate::ports::outbound::ServiceScanner;

const STORAGE: &str = "microsoft.storage/storageaccounts";

/// Storage accounts (`st`)
pub struct StorageScanner;

fn sla(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    let sku = r.resource.sku_name.as_str();
    let hot = r.property_str("accessTier").unwrap_or_default().contains("Hot");
    let sla = if sku.contains("RAGRS") && hot {
        "99.99%"
    } else if sku.contains("RAGRS") {
        "99.9%"
    } else if (sku.contains("LRS") || sku.contains("ZRS") || sku.contains("GRS")) && hot {
        "99.9%"
    } else {
        "99%"
    };
    RuleOutcome::new(false, sla)
}

fn naming(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    lacks_prefix(r, "st")
}

fn https_only(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    RuleOutcome::new(!r.property_bool("supportsHttpsTrafficOnly").unwrap_or(false), "")
}

fn minimum_tls(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    let version = r.property_str("minimumTlsVersion").unwrap_or_default();
    RuleOutcome::new(version != "TLS1_2" && version != "TLS1_3", version)
}

impl ServiceScanner for StorageScanner {
    fn abbreviation(&self) -> &'static str {
        "st"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &[STORAGE]
    }

    fn recommendations(&self) -> Vec<Recommendation> {
        vec![
            code_rule(
                "st-001",
                STORAGE,
                Category::MonitoringAndAlerting,
                Impact::Low,
                "Storage should have diagnostic settings enabled",
                "https://learn.microsoft.com/azure/storage/blobs/monitor-blob-storage",
                missing_diagnostics,
            ),
            code_rule(
                "st-002",
                STORAGE,
                Category::Security,
                Impact::High,
                "Storage should have private endpoints enabled",
                "https://learn.microsoft.com/azure/storage/common/storage-private-endpoints",
                missing_private_endpoint,
            ),
            code_rule(
                "st-003",
                STORAGE,
                Category::HighAvailability,
                Impact::High,
                "Storage should have a SLA",
                "https://www.microsoft.com/licensing/docs/view/Service-Level-Agreements-SLA-for-Online-Services",
                sla,
            )
            .with_type(RecommendationType::Sla),
            code_rule(
                "st-006",
                STORAGE,
                Category::Governance,
                Impact::Low,
                "Storage Name should comply with naming conventions",
                NAMING_URL,
                naming,
            ),
            code_rule(
                "st-007",
                STORAGE,
                Category::Security,
                Impact::High,
                "Storage Account should use HTTPS only",
                "https://learn.microsoft.com/azure/storage/common/storage-require-secure-transfer",
                https_only,
            ),
            code_rule(
                "st-008",
                STORAGE,
                Category::Governance,
                Impact::Low,
                "Storage Account should have tags",
                TAGS_URL,
                missing_tags,
            ),
            code_rule(
                "st-009",
                STORAGE,
                Category::Security,
                Impact::Low,
                "Storage Account should enforce TLS >= 1.2",
                "https://learn.microsoft.com/azure/storage/common/transport-layer-security-configure-minimum-version",
                minimum_tls,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::services::RuleEngine;
    use crate::audit::domain::Filters;
    use serde_json::json;

    fn account(sku: &str, properties: serde_json::Value) -> ResourceInstance {
        let row = json!({
            "id": "/subscriptions/s1/resourceGroups/rg/providers/Microsoft.Storage/storageAccounts/stapp01",
            "name": "stapp01",
            "type": "Microsoft.Storage/storageAccounts",
            "sku": {"name": sku},
            "tags": {"env": "prod"},
            "properties": properties,
        });
        ResourceInstance::from_graph_row(row.as_object().unwrap()).unwrap()
    }

    fn outcomes(instance: &ResourceInstance, indexes: &AuxiliaryIndexes) -> std::collections::BTreeMap<String, RuleOutcome> {
        let rules = StorageScanner.recommendations();
        RuleEngine::evaluate(&rules, instance, indexes, &Filters::new())
    }

    #[test]
    fn test_sla_tiers() {
        let idx = AuxiliaryIndexes::new();
        assert_eq!(sla(&account("Standard_RAGRS", json!({"accessTier": "Hot"})), &idx).note, "99.99%");
        assert_eq!(sla(&account("Standard_RAGRS", json!({"accessTier": "Cool"})), &idx).note, "99.9%");
        assert_eq!(sla(&account("Standard_LRS", json!({"accessTier": "Hot"})), &idx).note, "99.9%");
        assert_eq!(sla(&account("Premium_LRS", json!({})), &idx).note, "99%");
    }

    #[test]
    fn test_well_configured_account_passes_security_rules() {
        let mut idx = AuxiliaryIndexes::new();
        let instance = account(
            "Standard_ZRS",
            json!({"supportsHttpsTrafficOnly": true, "minimumTlsVersion": "TLS1_2"}),
        );
        idx.record_diagnostics(instance.id());
        idx.record_private_endpoint(instance.id());

        let out = outcomes(&instance, &idx);
        for id in ["st-001", "st-002", "st-006", "st-007", "st-008", "st-009"] {
            assert!(!out[id].broken, "{} should pass", id);
        }
    }

    #[test]
    fn test_insecure_account_is_flagged() {
        let instance = account("Standard_LRS", json!({"minimumTlsVersion": "TLS1_0"}));
        let out = outcomes(&instance, &AuxiliaryIndexes::new());
        assert!(out["st-001"].broken);
        assert!(out["st-002"].broken);
        assert!(out["st-007"].broken);
        assert!(out["st-009"].broken);
        assert_eq!(out["st-009"].note, "TLS1_0");
    }
}
