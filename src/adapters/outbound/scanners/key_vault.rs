use super::rules::{
    code_rule, lacks_prefix, missing_diagnostics, missing_private_endpoint, missing_tags,
    NAMING_URL, TAGS_URL,
};
use crate::audit::domain::{
    AuxiliaryIndexes, Category, Impact, Recommendation, RecommendationType, ResourceInstance,
    RuleOutcome,
};
use crate::ports::outbound::ServiceScanner;

const KEY_VAULT: &str = "microsoft.keyvault/vaults";

/// Key vaults (`kv`)
pub struct KeyVaultScanner;

fn sla(_: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    RuleOutcome::new(false, "99.99%")
}

fn naming(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    lacks_prefix(r, "kv")
}

fn soft_delete(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    // Soft delete is on unless explicitly disabled
    RuleOutcome::new(r.property_bool("enableSoftDelete") == Some(false), "")
}

fn purge_protection(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    RuleOutcome::new(!r.property_bool("enablePurgeProtection").unwrap_or(false), "")
}

impl ServiceScanner for KeyVaultScanner {
    fn abbreviation(&self) -> &'static str {
        "kv"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &[KEY_VAULT]
    }

    fn recommendations(&self) -> Vec<Recommendation> {
        vec![
            code_rule(
                "kv-001",
                KEY_VAULT,
                Category::MonitoringAndAlerting,
                Impact::Low,
                "Key Vault should have diagnostic settings enabled",
                "https://learn.microsoft.com/azure/key-vault/general/monitor-key-vault",
                missing_diagnostics,
            ),
            code_rule(
                "kv-002",
                KEY_VAULT,
                Category::Security,
                Impact::High,
                "Key Vault should have private endpoints enabled",
                "https://learn.microsoft.com/azure/key-vault/general/private-link-service",
                missing_private_endpoint,
            ),
            code_rule(
                "kv-003",
                KEY_VAULT,
                Category::HighAvailability,
                Impact::High,
                "Key Vault should have a SLA",
                "https://www.microsoft.com/licensing/docs/view/Service-Level-Agreements-SLA-for-Online-Services",
                sla,
            )
            .with_type(RecommendationType::Sla),
            code_rule(
                "kv-006",
                KEY_VAULT,
                Category::Governance,
                Impact::Low,
                "Key Vault Name should comply with naming conventions",
                NAMING_URL,
                naming,
            ),
            code_rule(
                "kv-007",
                KEY_VAULT,
                Category::Governance,
                Impact::Low,
                "Key Vault should have tags",
                TAGS_URL,
                missing_tags,
            ),
            code_rule(
                "kv-008",
                KEY_VAULT,
                Category::HighAvailability,
                Impact::Medium,
                "Key Vault should have soft delete enabled",
                "https://learn.microsoft.com/azure/key-vault/general/soft-delete-overview",
                soft_delete,
            ),
            code_rule(
                "kv-009",
                KEY_VAULT,
                Category::HighAvailability,
                Impact::Medium,
                "Key Vault should have purge protection enabled",
                "https://learn.microsoft.com/azure/key-vault/general/soft-delete-overview#purge-protection",
                purge_protection,
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vault(name: &str, properties: serde_json::Value) -> ResourceInstance {
        let row = json!({
            "id": format!("/subscriptions/s1/resourceGroups/rg/providers/Microsoft.KeyVault/vaults/{}", name),
            "name": name,
            "type": "Microsoft.KeyVault/vaults",
            "properties": properties,
        });
        ResourceInstance::from_graph_row(row.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_sla_is_note_only() {
        let outcome = sla(&vault("kv-app", json!({})), &AuxiliaryIndexes::new());
        assert!(!outcome.broken);
        assert_eq!(outcome.note, "99.99%");
    }

    #[test]
    fn test_soft_delete_and_purge_protection() {
        let idx = AuxiliaryIndexes::new();
        let protected = vault(
            "kv-app",
            json!({"enableSoftDelete": true, "enablePurgeProtection": true}),
        );
        assert!(!soft_delete(&protected, &idx).broken);
        assert!(!purge_protection(&protected, &idx).broken);

        let exposed = vault("kv-app", json!({"enableSoftDelete": false}));
        assert!(soft_delete(&exposed, &idx).broken);
        assert!(purge_protection(&exposed, &idx).broken);
    }

    #[test]
    fn test_naming_prefix() {
        let idx = AuxiliaryIndexes::new();
        assert!(!naming(&vault("kv-payments", json!({})), &idx).broken);
        assert!(naming(&vault("payments-vault", json!({})), &idx).broken);
    }
}
