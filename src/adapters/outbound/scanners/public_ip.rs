use super::rules::{code_rule, lacks_prefix, missing_tags, NAMING_URL, TAGS_URL};
use crate::audit::domain::{
    AuxiliaryIndexes, Category, Impact, Recommendation, RecommendationType, ResourceInstance,
    RuleOutcome,
};
use crate::ports::outbound::ServiceScanner;

const PUBLIC_IP: &str = "microsoft.network/publicipaddresses";

/// Public IP addresses (`pip`)
pub struct PublicIpScanner;

fn sla(_: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    RuleOutcome::new(false, "99.99%")
}

fn naming(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    lacks_prefix(r, "pip")
}

fn basic_sku(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    RuleOutcome::new(r.resource.sku_name.eq_ignore_ascii_case("basic"), "")
}

fn idle(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    let attached = r.property("ipConfiguration").is_some_and(|v| !v.is_null())
        || r.property("natGateway").is_some_and(|v| !v.is_null());
    RuleOutcome::new(!attached, "")
}

impl ServiceScanner for PublicIpScanner {
    fn abbreviation(&self) -> &'static str {
        "pip"
    }

    fn resource_types(&self) -> &'static [&'static str] {
        &[PUBLIC_IP]
    }

    fn recommendations(&self) -> Vec<Recommendation> {
        vec![
            code_rule(
                "pip-001",
                PUBLIC_IP,
                Category::Governance,
                Impact::High,
                "Public IP should use the Standard SKU",
                "https://learn.microsoft.com/azure/virtual-network/ip-services/public-ip-basic-upgrade-guidance",
                basic_sku,
            ),
            code_rule(
                "pip-003",
                PUBLIC_IP,
                Category::HighAvailability,
                Impact::High,
                "Public IP SLA",
                "https://www.microsoft.com/licensing/docs/view/Service-Level-Agreements-SLA-for-Online-Services",
                sla,
            )
            .with_type(RecommendationType::Sla),
            code_rule(
                "pip-006",
                PUBLIC_IP,
                Category::Governance,
                Impact::Low,
                "Public IP Name should comply with naming conventions",
                NAMING_URL,
                naming,
            ),
            code_rule(
                "pip-007",
                PUBLIC_IP,
                Category::Governance,
                Impact::Low,
                "Public IP should have tags",
                TAGS_URL,
                missing_tags,
            ),
            code_rule(
                "pip-008",
                PUBLIC_IP,
                Category::Cost,
                Impact::Low,
                "Public IP should be associated with a resource",
                "https://learn.microsoft.com/azure/virtual-network/ip-services/public-ip-addresses#pricing",
                idle,
            ),
        ]
    }
}
