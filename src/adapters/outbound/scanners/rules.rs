use crate::audit::domain::{
    AuxiliaryIndexes, Category, EvalFn, Impact, Recommendation, ResourceInstance, RuleKind,
    RuleOutcome, Source,
};

pub const TAGS_URL: &str =
    "https://learn.microsoft.com/azure/azure-resource-manager/management/tag-resources";
pub const NAMING_URL: &str = "https://learn.microsoft.com/azure/cloud-adoption-framework/ready/azure-best-practices/resource-abbreviations";

pub fn code_rule(
    id: &str,
    resource_type: &str,
    category: Category,
    impact: Impact,
    text: &str,
    learn_more_url: &str,
    eval: EvalFn,
) -> Recommendation {
    Recommendation::new(
        id,
        resource_type,
        category,
        impact,
        text,
        Source::Azqr,
        RuleKind::Code { eval },
    )
    .with_learn_more(learn_more_url)
}

pub fn missing_diagnostics(r: &ResourceInstance, idx: &AuxiliaryIndexes) -> RuleOutcome {
    RuleOutcome::new(!idx.has_diagnostics(r.id()), "")
}

pub fn missing_private_endpoint(r: &ResourceInstance, idx: &AuxiliaryIndexes) -> RuleOutcome {
    RuleOutcome::new(!idx.has_private_endpoint(r.id()), "")
}

pub fn missing_tags(r: &ResourceInstance, _: &AuxiliaryIndexes) -> RuleOutcome {
    RuleOutcome::new(r.tags.is_empty(), "")
}

/// Broken when the name lacks the naming-convention prefix
pub fn lacks_prefix(r: &ResourceInstance, prefix: &str) -> RuleOutcome {
    RuleOutcome::new(!r.name().to_lowercase().starts_with(prefix), "")
}
