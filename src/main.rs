use azqr::adapters::outbound::catalog::{DirectoryCatalog, EmbeddedCatalog};
use azqr::adapters::outbound::console::StderrProgressReporter;
use azqr::adapters::outbound::credentials::CliTokenProvider;
use azqr::adapters::outbound::network::{ManagementClient, ResourceGraphClient};
use azqr::adapters::outbound::plugins::YamlPluginRepository;
use azqr::adapters::outbound::scanners::builtin_scanners;
use azqr::application::factories::{CatalogFactory, PresenterFactory, PresenterType, RendererFactory};
use azqr::application::pipeline::PipelineError;
use azqr::application::read_models::{CatalogEntryView, ReportMetadataView};
use azqr::application::scanner_registry::ScannerRegistry;
use azqr::application::use_cases::RunScanUseCase;
use azqr::audit::domain::Source;
use azqr::cli::{CatalogArgs, Cli, Command, ScanArgs};
use azqr::ports::outbound::{CatalogSource, ProgressReporter, TokenProvider};
use azqr::shared::error::{AuditError, ExitCode};
use azqr::shared::Result;
use clap::Parser;
use owo_colors::OwoColorize;
use std::collections::BTreeSet;
use std::path::Path;
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version land here too
            let code = if e.use_stderr() {
                ExitCode::ConfigurationError
            } else {
                ExitCode::Success
            };
            let _ = e.print();
            process::exit(code.as_i32());
        }
    };

    init_logging(matches!(&cli.command, Command::Scan(args) if args.debug));

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(anyhow::Error::from)
        .and_then(|runtime| runtime.block_on(run(cli)));

    if let Err(e) = result {
        for (depth, cause) in e.chain().enumerate() {
            debug!(depth, cause = %cause, "error chain");
        }
        eprintln!("{}", error_line(&e));
        process::exit(exit_code_for(&e).as_i32());
    }
}

/// `RUST_LOG` wins; otherwise `info`, or `debug` with `--debug`
fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The whole error chain folded onto one line
fn error_line(error: &anyhow::Error) -> String {
    let message = format!("{:#}", error);
    format!("❌ {}", message.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Classifies the error chain into the process exit code
fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    for cause in error.chain() {
        if let Some(audit) = cause.downcast_ref::<AuditError>() {
            return audit.exit_code();
        }
        if let Some(pipeline) = cause.downcast_ref::<PipelineError>() {
            return match pipeline {
                PipelineError::StageFailed { .. } | PipelineError::Cancelled { .. } => {
                    ExitCode::ScanError
                }
                _ => ExitCode::ConfigurationError,
            };
        }
    }
    ExitCode::InternalError
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Scan(args) => scan(args).await,
        Command::Types(args) => list_types(&args),
        Command::Recommendations(args) => list_recommendations(&args),
    }
}

async fn scan(args: ScanArgs) -> Result<()> {
    // Configuration errors surface before any network call
    let request = args.to_request()?;
    let formats = args.formats()?;
    let output_name = args.output_prefix();
    if !args.stdout {
        validate_output_dir(&args.output_dir)?;
    }

    // Create adapters (Dependency Injection)
    let tokens: Arc<dyn TokenProvider> = Arc::new(CliTokenProvider::from_env());
    let graph = Arc::new(ResourceGraphClient::new(Arc::clone(&tokens))?);
    let management = Arc::new(ManagementClient::new(tokens)?);
    let progress_reporter: Arc<dyn ProgressReporter> = Arc::new(StderrProgressReporter::new());

    let use_case = RunScanUseCase::new(
        graph,
        management,
        catalog_sources(args.catalog.catalog_dir.as_deref()),
        YamlPluginRepository::new(&args.plugin_dir),
        ScannerRegistry::new(builtin_scanners()),
        Arc::clone(&progress_reporter),
    );

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling scan");
            interrupt.cancel();
        }
    });

    let response = use_case.execute(request, cancel).await?;

    // Render every requested format, then write them all
    let mut files = Vec::new();
    for format in formats {
        progress_reporter.report(RendererFactory::progress_message(format));
        let formatter = RendererFactory::create(format);
        files.extend(formatter.format(&response.report, &output_name)?);
    }

    let presenter_type = if args.stdout {
        PresenterType::Stdout
    } else {
        PresenterType::Directory(args.output_dir.clone())
    };
    let written = PresenterFactory::create(presenter_type).present(&files)?;
    for path in &written {
        progress_reporter.report_completion(&format!("Report written to {}", path.display()));
    }

    print_stage_summary(&response.report.metadata);
    Ok(())
}

fn validate_output_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(AuditError::InvalidArguments {
            message: format!("Output directory does not exist: {}", dir.display()),
            hint: "Create the directory or pass an existing one with --output-dir".to_string(),
        }
        .into());
    }
    Ok(())
}

/// `--catalog-dir` replaces the embedded curated tree; the orphan tree
/// always comes from the binary.
fn catalog_sources(catalog_dir: Option<&Path>) -> Vec<Box<dyn CatalogSource>> {
    match catalog_dir {
        Some(dir) => vec![
            Box::new(DirectoryCatalog::new(dir, Source::Aprl)) as Box<dyn CatalogSource>,
            Box::new(EmbeddedCatalog::Orphan),
        ],
        None => EmbeddedCatalog::all()
            .into_iter()
            .map(|tree| Box::new(tree) as Box<dyn CatalogSource>)
            .collect(),
    }
}

fn list_types(args: &CatalogArgs) -> Result<()> {
    let scanners = ScannerRegistry::new(builtin_scanners());
    let catalog = CatalogFactory::build(&catalog_sources(args.catalog_dir.as_deref()), &scanners)?;

    let types: BTreeSet<String> = catalog
        .resource_types()
        .into_iter()
        .map(str::to_string)
        .chain(scanners.resource_types().into_iter().map(str::to_string))
        .collect();
    for resource_type in types {
        println!("{}", resource_type);
    }
    Ok(())
}

fn list_recommendations(args: &CatalogArgs) -> Result<()> {
    let scanners = ScannerRegistry::new(builtin_scanners());
    let catalog = CatalogFactory::build(&catalog_sources(args.catalog_dir.as_deref()), &scanners)?;

    let entries: Vec<CatalogEntryView> = catalog
        .all_recommendations()
        .into_iter()
        .map(CatalogEntryView::from)
        .collect();
    let json = serde_json::to_string_pretty(&entries)?;
    println!("{}", json);
    Ok(())
}

fn print_stage_summary(metadata: &ReportMetadataView) {
    eprintln!();
    eprintln!(
        "{} scan {} over {} subscription(s)",
        "✅".green(),
        metadata.scan_id.dimmed(),
        metadata.subscriptions
    );
    eprintln!("{}", "Stage summary".bold());
    for stage in &metadata.stages {
        eprintln!(
            "  {:<22} {:>8} ms {:>8} record(s)",
            stage.name.cyan(),
            stage.elapsed_ms,
            stage.records
        );
    }
}
