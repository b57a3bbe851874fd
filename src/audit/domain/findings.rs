//! Straight projections produced by the provider-native stages
//! (advisor, policy, defender, arc, cost, carbon).

use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdvisorRecord {
    pub subscription_id: String,
    pub subscription_name: String,
    pub resource_id: String,
    pub name: String,
    pub resource_type: String,
    pub category: String,
    pub impact: String,
    pub description: String,
    pub recommendation_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PolicyRecord {
    pub subscription_id: String,
    pub subscription_name: String,
    pub resource_id: String,
    pub resource_type: String,
    pub resource_group: String,
    pub name: String,
    pub policy_display_name: String,
    pub policy_description: String,
    pub policy_definition_name: String,
    pub policy_definition_id: String,
    pub policy_assignment_name: String,
    pub policy_assignment_id: String,
    pub compliance_state: String,
    pub timestamp: String,
}

/// Defender for Cloud plan on one subscription
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefenderPlan {
    pub subscription_id: String,
    pub subscription_name: String,
    pub name: String,
    pub tier: String,
    pub deprecated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DefenderRecommendation {
    pub subscription_id: String,
    pub subscription_name: String,
    pub resource_group: String,
    pub resource_type: String,
    pub resource_name: String,
    pub category: String,
    pub severity: String,
    pub recommendation_name: String,
    pub action_description: String,
    pub remediation_description: String,
    pub portal_link: String,
    pub resource_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArcSqlInstance {
    pub subscription_id: String,
    pub subscription_name: String,
    pub status: String,
    pub arc_server: String,
    pub sql_instance: String,
    pub resource_group: String,
    pub version: String,
    pub build: String,
    pub patch_level: String,
    pub edition: String,
    pub vcores: String,
    pub license: String,
    pub dps_status: String,
    pub tel_status: String,
    pub defender_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CostItem {
    pub subscription_id: String,
    pub subscription_name: String,
    pub service_name: String,
    pub value: String,
    pub currency: String,
}

/// Cost rows plus the window they were queried for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CostReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub items: Vec<CostItem>,
}

/// Emissions aggregated per resource type, in kgCO2e
#[derive(Debug, Clone, PartialEq)]
pub struct CarbonEmission {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub resource_type: String,
    pub latest_month: f64,
    pub previous_month: f64,
    pub monthly_change_value: f64,
    pub unit: String,
}

impl CarbonEmission {
    /// `(latest - previous) / previous`, absent when there is no baseline
    pub fn month_over_month_ratio(&self) -> Option<f64> {
        if self.previous_month == 0.0 {
            None
        } else {
            Some((self.latest_month - self.previous_month) / self.previous_month)
        }
    }
}
