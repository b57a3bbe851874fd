use super::names::ARC_SCAN;
use super::tolerate_capability;
use crate::application::pipeline::StageAction;
use crate::application::scan_context::ScanContext;
use crate::audit::domain::resource::string_field;
use crate::audit::domain::ArcSqlInstance;
use crate::shared::Result;
use anyhow::Context;
use async_trait::async_trait;
use tracing::debug;

const ARC_SQL_QUERY: &str = "resources \
| where type =~ 'microsoft.azurearcdata/sqlserverinstances' \
| extend sqlInstance = id, arcServer = tolower(tostring(properties.containerResourceId)), \
version = tostring(properties.version), edition = tostring(properties.edition), \
build = tostring(properties.currentVersion), defenderStatus = tostring(properties.azureDefenderStatus), \
patchLevel = tostring(properties.patchLevel), vcores = tostring(properties.vCore) \
| join kind=inner (resources \
| where type == 'microsoft.hybridcompute/machines/extensions' \
| where properties.type == 'WindowsAgent.SqlServer' \
| extend license = case(properties.settings.LicenseType == 'Paid', 'SA', properties.settings.LicenseType == 'PAYG', 'PAYG', 'unset') \
| extend serverId = tolower(tostring(split(id, '/extensions/WindowsAgent.SqlServer')[0])) \
| parse properties with * 'uploadStatus : ' dpsStatus ';' * \
| parse properties with * 'telemetryUploadStatus : ' telStatus ';' * \
| extend dpsStatus = iff(dpsStatus == '', 'No Data', dpsStatus), telStatus = iff(telStatus == '', 'No Data', telStatus) \
) on $left.arcServer == $right.serverId \
| join kind=inner (resources \
| where type == 'microsoft.hybridcompute/machines' \
| project machineId = tolower(id), status = tostring(properties.status) \
) on $left.arcServer == $right.machineId \
| project subscriptionId, status, arcServer, sqlInstance, resourceGroup, version, build, \
patchLevel, edition, vcores, license, dpsStatus, telStatus, defenderStatus";

/// Arc-enabled SQL Server instances
pub struct ArcSqlScan;

#[async_trait]
impl StageAction for ArcSqlScan {
    async fn run(&self, ctx: &mut ScanContext) -> Result<()> {
        let subscriptions = ctx.subscription_ids();
        if subscriptions.is_empty() {
            return Ok(());
        }

        debug!(query = ARC_SQL_QUERY, "querying arc-enabled sql servers");
        let rows = tolerate_capability(
            ARC_SCAN,
            ctx.services
                .graph_rows(ARC_SQL_QUERY, &subscriptions, &ctx.cancel)
                .await,
        )
        .context("Failed to query Arc-enabled SQL Server instances")?;

        for row in &rows {
            let subscription_id = string_field(row, "subscriptionId");
            let sql_instance = string_field(row, "sqlInstance");
            if ctx.filters.is_subscription_excluded(&subscription_id)
                || ctx.filters.is_service_excluded(&sql_instance)
            {
                continue;
            }
            let instance = ArcSqlInstance {
                subscription_name: ctx.subscription_name(&subscription_id).to_string(),
                subscription_id,
                status: string_field(row, "status"),
                arc_server: string_field(row, "arcServer"),
                sql_instance,
                resource_group: string_field(row, "resourceGroup"),
                version: string_field(row, "version"),
                build: string_field(row, "build"),
                patch_level: string_field(row, "patchLevel"),
                edition: string_field(row, "edition"),
                vcores: string_field(row, "vcores"),
                license: string_field(row, "license"),
                dps_status: string_field(row, "dpsStatus"),
                tel_status: string_field(row, "telStatus"),
                defender_status: string_field(row, "defenderStatus"),
            };
            ctx.report.arc_sql.push(instance);
        }
        Ok(())
    }
}
