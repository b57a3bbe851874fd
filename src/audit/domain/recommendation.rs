use super::{AuxiliaryIndexes, ResourceInstance};
use serde::Serialize;
use std::fmt;

/// Query-text markers for rules the catalog cannot evaluate through the graph.
pub const DEVELOPMENT_SENTINELS: [&str; 3] = [
    "cannot-be-validated-with-arg",
    "under-development",
    "under development",
];

/// Well-Architected area a recommendation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    HighAvailability,
    Security,
    Governance,
    MonitoringAndAlerting,
    Scalability,
    Cost,
    Performance,
}

impl Category {
    /// Parses catalog, plugin and advisor spellings.
    ///
    /// Areas the report does not distinguish are folded into their closest
    /// bucket (disaster recovery counts as high availability, retirement
    /// notices as governance).
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "highavailability" | "reliability" | "businesscontinuity" | "disasterrecovery" => {
                Some(Category::HighAvailability)
            }
            "security" => Some(Category::Security),
            "governance" | "otherbestpractices" | "serviceupgradeandretirement"
            | "operationalexcellence" => Some(Category::Governance),
            "monitoringandalerting" | "monitoring" => Some(Category::MonitoringAndAlerting),
            "scalability" => Some(Category::Scalability),
            "cost" | "costoptimization" => Some(Category::Cost),
            "performance" | "performanceefficiency" => Some(Category::Performance),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::HighAvailability => "High Availability",
            Category::Security => "Security",
            Category::Governance => "Governance",
            Category::MonitoringAndAlerting => "Monitoring and Alerting",
            Category::Scalability => "Scalability",
            Category::Cost => "Cost",
            Category::Performance => "Performance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Impact level. Ordering is `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Impact {
    Low,
    Medium,
    High,
}

impl Impact {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "low" => Some(Impact::Low),
            "medium" | "moderate" => Some(Impact::Medium),
            "high" => Some(Impact::High),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Impact::Low => "Low",
            Impact::Medium => "Medium",
            Impact::High => "High",
        }
    }
}

impl fmt::Display for Impact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RecommendationType {
    #[default]
    BestPractice,
    Sla,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MetadataState {
    #[default]
    Active,
    Disabled,
}

impl MetadataState {
    /// Anything other than "disabled" keeps the rule active.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("disabled") {
            MetadataState::Disabled
        } else {
            MetadataState::Active
        }
    }
}

/// Provenance tag carried by recommendations and their results
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Source {
    /// Curated catalog tree
    Aprl,
    /// Orphan/cleanup catalog tree
    Orphan,
    /// Code rules shipped with the per-type scanners
    Azqr,
    /// A YAML plugin, by name
    Plugin(String),
    Advisor,
    Policy,
}

impl Source {
    pub fn label(&self) -> &str {
        match self {
            Source::Aprl => "APRL",
            Source::Orphan => "AOR",
            Source::Azqr => "AZQR",
            Source::Plugin(name) => name,
            Source::Advisor => "Advisor",
            Source::Policy => "Policy",
        }
    }

    /// Catalog-backed sources (curated, orphan and code rules)
    pub fn is_catalog(&self) -> bool {
        matches!(self, Source::Aprl | Source::Orphan | Source::Azqr)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one code rule against one resource
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleOutcome {
    pub broken: bool,
    pub note: String,
}

impl RuleOutcome {
    pub fn new(broken: bool, note: impl Into<String>) -> Self {
        Self {
            broken,
            note: note.into(),
        }
    }

    pub fn passed() -> Self {
        Self::default()
    }

    pub fn failed() -> Self {
        Self::new(true, "")
    }
}

/// Code-rule evaluation function. Must not perform I/O.
pub type EvalFn = fn(&ResourceInstance, &AuxiliaryIndexes) -> RuleOutcome;

/// How a recommendation is evaluated
#[derive(Clone)]
pub enum RuleKind {
    /// Provider-side query against the resource graph
    Graph { query: String },
    /// In-process function over a hydrated resource
    Code { eval: EvalFn },
    /// Catalog entry without query text; listed but never dispatched
    Manual,
}

impl fmt::Debug for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Graph { query } => f.debug_struct("Graph").field("query", query).finish(),
            RuleKind::Code { .. } => f.write_str("Code"),
            RuleKind::Manual => f.write_str("Manual"),
        }
    }
}

/// A catalog entry
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub id: String,
    /// Lower-cased resource type
    pub resource_type: String,
    pub category: Category,
    pub impact: Impact,
    pub recommendation_type: RecommendationType,
    pub text: String,
    pub long_description: String,
    pub potential_benefits: String,
    pub learn_more_url: String,
    pub automation_available: bool,
    pub source: Source,
    pub metadata_state: MetadataState,
    pub kind: RuleKind,
}

impl Recommendation {
    /// Minimal constructor; descriptive fields default to empty.
    pub fn new(
        id: impl Into<String>,
        resource_type: impl AsRef<str>,
        category: Category,
        impact: Impact,
        text: impl Into<String>,
        source: Source,
        kind: RuleKind,
    ) -> Self {
        Self {
            id: id.into(),
            resource_type: resource_type.as_ref().to_lowercase(),
            category,
            impact,
            recommendation_type: RecommendationType::BestPractice,
            text: text.into(),
            long_description: String::new(),
            potential_benefits: String::new(),
            learn_more_url: String::new(),
            automation_available: matches!(kind, RuleKind::Graph { .. } | RuleKind::Code { .. }),
            source,
            metadata_state: MetadataState::Active,
            kind,
        }
    }

    pub fn with_type(mut self, recommendation_type: RecommendationType) -> Self {
        self.recommendation_type = recommendation_type;
        self
    }

    pub fn with_learn_more(mut self, url: impl Into<String>) -> Self {
        self.learn_more_url = url.into();
        self
    }

    pub fn with_metadata_state(mut self, state: MetadataState) -> Self {
        self.metadata_state = state;
        self
    }

    /// Graph query text, if this is a graph rule
    pub fn query(&self) -> Option<&str> {
        match &self.kind {
            RuleKind::Graph { query } => Some(query),
            _ => None,
        }
    }

    pub fn eval_fn(&self) -> Option<EvalFn> {
        match &self.kind {
            RuleKind::Code { eval } => Some(*eval),
            _ => None,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.metadata_state == MetadataState::Disabled
    }

    /// True when the query text carries one of the development sentinels
    pub fn is_under_development(&self) -> bool {
        self.query()
            .map(|q| DEVELOPMENT_SENTINELS.iter().any(|s| q.contains(s)))
            .unwrap_or(false)
    }

    /// Whether the graph-scan stage may dispatch this rule
    pub fn is_dispatchable_graph_rule(&self) -> bool {
        matches!(self.kind, RuleKind::Graph { .. })
            && !self.is_disabled()
            && !self.is_under_development()
    }
}
