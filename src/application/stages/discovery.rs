use super::names::SUBSCRIPTION_DISCOVERY;
use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::resource::string_field;
use crate::ports::outbound::SubscriptionInfo;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const MANAGEMENT_GROUP_SUBSCRIPTIONS: &str = "resourcecontainers \
| where type == 'microsoft.resources/subscriptions' \
| project subscriptionId, name, state = tostring(properties.state)";

/// Root stage: resolves the active subscription set
pub struct SubscriptionDiscovery;

impl SubscriptionDiscovery {
    async fn candidates(ctx: &ScanContext) -> Result<Vec<SubscriptionInfo>> {
        let services = &ctx.services;
        if ctx.management_groups.is_empty() {
            return services
                .management
                .list_subscriptions(&ctx.cancel)
                .await
                .context("Failed to list subscriptions");
        }

        debug!(query = MANAGEMENT_GROUP_SUBSCRIPTIONS, "listing subscriptions by management group");
        let rows = services
            .graph_rows_for_management_groups(
                MANAGEMENT_GROUP_SUBSCRIPTIONS,
                &ctx.management_groups,
                &ctx.cancel,
            )
            .await
            .context("Failed to list subscriptions of the management groups")?;
        Ok(rows
            .iter()
            .map(|row| SubscriptionInfo {
                id: string_field(row, "subscriptionId"),
                name: string_field(row, "name"),
                state: string_field(row, "state"),
            })
            .filter(|s| !s.id.is_empty())
            .collect())
    }
}

#[async_trait]
impl StageAction for SubscriptionDiscovery {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let candidates = Self::candidates(ctx).await?;
        let discovered = candidates.len();

        let mut active: BTreeMap<String, String> = BTreeMap::new();
        for subscription in candidates {
            if !subscription.is_enabled() {
                debug!(subscription = %subscription.id, state = %subscription.state, "skipping subscription that is not enabled");
                continue;
            }
            if ctx.filters.is_subscription_excluded(&subscription.id) {
                debug!(subscription = %subscription.id, "subscription excluded by filters");
                continue;
            }
            active.entry(subscription.id).or_insert(subscription.name);
        }

        if active.is_empty() {
            warn!(stage = SUBSCRIPTION_DISCOVERY, discovered, "no subscriptions left to scan");
        } else {
            info!(discovered, active = active.len(), "subscriptions resolved");
        }
        ctx.set_subscriptions(active);
        Ok(())
    }
}
