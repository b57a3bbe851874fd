use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::application::dto::{OutputFormat, ScanRequest};
use crate::application::stages::StageSelection;
use crate::audit::domain::resource_id::subscription_from_resource_id;
use crate::audit::domain::Filters;
use crate::config::{load_filter_file, validate_resource_groups};
use crate::shared::error::AuditError;

/// Scan cloud subscriptions against a best-practice catalog
#[derive(Parser, Debug)]
#[command(name = "azqr")]
#[command(version)]
#[command(about = "Scan cloud subscriptions against a best-practice catalog and write consolidated reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a scan and write the reports
    Scan(ScanArgs),
    /// Print the supported resource types
    Types(CatalogArgs),
    /// Print the full recommendation catalog as JSON
    Recommendations(CatalogArgs),
}

/// Options shared by the catalog listing commands
#[derive(Args, Debug, Clone, Default)]
pub struct CatalogArgs {
    /// Replace the embedded curated catalog with this directory tree
    #[arg(long, value_name = "DIR")]
    pub catalog_dir: Option<PathBuf>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Subscription ids to scan (comma separated)
    #[arg(short, long, value_delimiter = ',', value_name = "ID")]
    pub subscriptions: Vec<String>,

    /// Management groups whose subscriptions are scanned
    #[arg(long, value_delimiter = ',', value_name = "NAME")]
    pub management_groups: Vec<String>,

    /// Resource-group ids: /subscriptions/<id>/resourceGroups/<name>
    #[arg(short = 'g', long, value_delimiter = ',', value_name = "ID")]
    pub resource_groups: Vec<String>,

    /// Prefix for every report file name
    #[arg(short, long, value_name = "PREFIX")]
    pub output_name: Option<String>,

    /// Directory the reports are written into
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// YAML filter file rooted at `azqr`
    #[arg(short, long, value_name = "PATH")]
    pub filter_file: Option<PathBuf>,

    /// Scanner abbreviations restricting code rules (e.g. st,kv)
    #[arg(long, value_delimiter = ',', value_name = "ABBR")]
    pub scanners: Vec<String>,

    /// Plugins to enable from the plugin directory
    #[arg(long, value_delimiter = ',', value_name = "NAME")]
    pub enable_plugins: Vec<String>,

    /// Directory holding plugin YAML files
    #[arg(long, default_value = "./plugins", value_name = "DIR")]
    pub plugin_dir: PathBuf,

    #[command(flatten)]
    pub catalog: CatalogArgs,

    /// Report formats: json, csv, md (comma separated)
    #[arg(long, default_value = "json,csv,md")]
    pub format: String,

    /// Stage overrides, e.g. `cost-scan,-preflight`
    #[arg(long, value_name = "LIST", allow_hyphen_values = true)]
    pub stages: Option<String>,

    /// Run only subscription discovery and the enabled plugins
    #[arg(long)]
    pub plugin_only: bool,

    /// Mask subscription ids in every report
    #[arg(long)]
    pub mask: bool,

    /// Debug logging
    #[arg(long)]
    pub debug: bool,

    /// Write reports to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Include the defender plans and recommendations
    #[arg(long)]
    pub defender: bool,

    /// Include advisor recommendations
    #[arg(long)]
    pub advisor: bool,

    /// Include costs of the last three months
    #[arg(long)]
    pub cost: bool,

    /// Include non-compliant policy states
    #[arg(long)]
    pub policy: bool,

    /// Include Arc-enabled SQL servers
    #[arg(long)]
    pub arc: bool,

    /// Include last month's carbon emissions
    #[arg(long)]
    pub carbon: bool,
}

impl ScanArgs {
    /// Validates the scope flags, loads the filter file and builds the
    /// request for the scan use case.
    ///
    /// # Errors
    /// `AuditError` for conflicting scope flags, malformed resource-group
    /// ids, an unreadable or malformed filter file, or an unknown format.
    pub fn to_request(&self) -> Result<ScanRequest, AuditError> {
        self.validate_scope()?;
        self.formats()?;

        Ok(ScanRequest {
            filters: self.filters()?,
            management_groups: self.management_groups.clone(),
            scanners: self.scanners.clone(),
            stages: self.stage_selection(),
            enabled_plugins: self.enable_plugins.clone(),
            mask: self.mask,
        })
    }

    fn validate_scope(&self) -> Result<(), AuditError> {
        if !self.management_groups.is_empty()
            && (!self.subscriptions.is_empty() || !self.resource_groups.is_empty())
        {
            return Err(AuditError::InvalidArguments {
                message: "--management-groups cannot be combined with --subscriptions or --resource-groups".to_string(),
                hint: "Scope the scan by management group or by subscription, not both".to_string(),
            });
        }
        validate_resource_groups(&self.resource_groups)
    }

    /// Filter file (if any) merged with the scope flags
    fn filters(&self) -> Result<Filters, AuditError> {
        let filters = match &self.filter_file {
            Some(path) => load_filter_file(path)?,
            None => Filters::new(),
        };
        let rg_subscriptions: Vec<String> = self
            .resource_groups
            .iter()
            .map(|id| subscription_from_resource_id(id))
            .collect();

        Ok(filters
            .include_subscriptions(self.subscriptions.iter().chain(rg_subscriptions.iter()))
            .include_resource_groups(&self.resource_groups))
    }

    pub fn stage_selection(&self) -> StageSelection {
        StageSelection {
            advisor: self.advisor,
            policy: self.policy,
            defender: self.defender,
            arc: self.arc,
            cost: self.cost,
            carbon: self.carbon,
            plugins: !self.enable_plugins.is_empty(),
            plugin_only: self.plugin_only,
            overrides: self
                .stages
                .as_deref()
                .map(StageSelection::parse_overrides)
                .unwrap_or_default(),
        }
    }

    pub fn formats(&self) -> Result<Vec<OutputFormat>, AuditError> {
        OutputFormat::parse_list(&self.format).map_err(|message| AuditError::InvalidArguments {
            message,
            hint: "Use --format json,csv,md".to_string(),
        })
    }

    /// `--output-name`, or a timestamped default
    pub fn output_prefix(&self) -> String {
        self.output_name
            .clone()
            .unwrap_or_else(|| default_output_name(Utc::now()))
    }
}

/// `azqr_action_plan_YYYY_MM_DD_THHMMSS` in UTC
pub fn default_output_name(now: DateTime<Utc>) -> String {
    format!("azqr_action_plan_{}", now.format("%Y_%m_%d_T%H%M%S"))
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
