//! sheetfill CLI - render, reconcile and fill workbooks

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sheetfill::{
    apply_all, reconcile_all, render_all, run, Layout, OpenAiBackend, OpenAiConfig,
    ReconcileOptions, StageReport, UpdateStatus, WorkbookUpdate,
};
use sheetfill_reconcile::openai::{DEFAULT_ENDPOINT, DEFAULT_MAX_COMPLETION_TOKENS, DEFAULT_MODEL};
use sheetfill_reconcile::DEFAULT_CHUNK_SIZE;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sheetfill")]
#[command(
    author,
    version,
    about = "Fill spreadsheets from source text through a language model"
)]
struct Cli {
    #[command(flatten)]
    layout: LayoutArgs,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render every worksheet of every workbook to an HTML page
    Render,

    /// Reconcile rendered pages against their source text
    Reconcile(BackendArgs),

    /// Write reconciled values back into the workbooks
    Apply,

    /// Render, reconcile and apply in one go
    Run(BackendArgs),
}

#[derive(Args)]
struct LayoutArgs {
    /// Folder holding the input workbooks
    #[arg(long, global = true, default_value = "Input_Folder")]
    workbooks: PathBuf,

    /// Folder holding the source texts
    #[arg(long, global = true, default_value = "DATA_SOURCES")]
    sources: PathBuf,

    /// Folder for rendered HTML pages
    #[arg(long, global = true, default_value = "html_outputs")]
    markup: PathBuf,

    /// Folder for reconciliation artifacts
    #[arg(long, global = true, default_value = "Output_folder")]
    output: PathBuf,

    /// Folder for updated workbooks
    #[arg(long, global = true, default_value = "Updated_excel_workbooks")]
    updated: PathBuf,
}

impl From<LayoutArgs> for Layout {
    fn from(args: LayoutArgs) -> Self {
        Layout {
            workbooks: args.workbooks,
            sources: args.sources,
            markup: args.markup,
            output: args.output,
            updated: args.updated,
        }
    }
}

#[derive(Args)]
struct BackendArgs {
    /// API key for the chat-completions endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name
    #[arg(long, env = "SHEETFILL_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Chat-completions endpoint
    #[arg(long, env = "SHEETFILL_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Rows per request
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: u32,

    /// Completion token limit per request
    #[arg(long, default_value_t = DEFAULT_MAX_COMPLETION_TOKENS)]
    max_tokens: u32,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,
}

impl BackendArgs {
    fn backend(&self) -> Result<OpenAiBackend> {
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .context("No API key: set OPENAI_API_KEY or pass --api-key")?;
        let config = OpenAiConfig {
            api_key,
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
            max_completion_tokens: self.max_tokens,
            timeout: Duration::from_secs(self.timeout_secs),
        };
        OpenAiBackend::new(config).context("Failed to set up the reasoning backend")
    }

    fn options(&self) -> Result<ReconcileOptions> {
        anyhow::ensure!(self.chunk_size > 0, "--chunk-size must be at least 1");
        Ok(ReconcileOptions {
            chunk_size: self.chunk_size,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let layout = Layout::from(cli.layout);

    match cli.command {
        Commands::Render => {
            let pages = render_all(&layout).context("Render stage failed")?;
            println!("Rendered {} worksheet page(s) into '{}'", pages.len(), layout.markup.display());
        }
        Commands::Reconcile(args) => {
            let backend = args.backend()?;
            let report = reconcile_all(&layout, backend, args.options()?)
                .context("Reconcile stage failed")?;
            print_stage(&report, &layout);
        }
        Commands::Apply => {
            let updates = apply_all(&layout).context("Apply stage failed")?;
            print_updates(&updates);
        }
        Commands::Run(args) => {
            let backend = args.backend()?;
            let report = run(&layout, backend, args.options()?).context("Run failed")?;
            println!("Rendered {} worksheet page(s)", report.rendered.len());
            print_stage(&report.reconcile, &layout);
            print_updates(&report.updates);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_stage(report: &StageReport, layout: &Layout) {
    println!(
        "Reconciled {} of {} page(s), {} failed; artifacts in '{}'",
        report.succeeded,
        report.total(),
        report.failed,
        layout.output.display()
    );
    if report.total() > 0 && !report.passed() {
        println!("No page was reconciled");
    }
}

fn print_updates(updates: &[WorkbookUpdate]) {
    for update in updates {
        let name = update.workbook.display();
        match &update.status {
            UpdateStatus::Updated {
                output,
                sheets,
                cells,
            } => {
                println!("{}: {} cell(s) in {} sheet(s) -> {}", name, cells, sheets, output.display());
            }
            UpdateStatus::Skipped => println!("{}: no updates", name),
            UpdateStatus::Failed(reason) => println!("{}: failed: {}", name, reason),
        }
    }
    let updated = updates.iter().filter(|u| u.status.is_updated()).count();
    if updated == 0 && !updates.is_empty() {
        println!("No workbook was updated");
    }
    println!("Updated {} of {} workbook(s)", updated, updates.len());
}
