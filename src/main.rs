use std::net::SocketAddr;
use std::process;

use clap::{Args, Parser, Subcommand};
use comfy_table::{modifiers, presets, ContentArrangement, Table};
use serde_json::{json, Value};
use terminal_size::{terminal_size, Width};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use yansi::Paint;

use trainboard::api::{Backend, DataSource, RunCatalog};
use trainboard::config::{self, AppConfig, DataMode};
use trainboard::models::{AppState, ArtifactType, QualityFlag, RunFilters, RunStatus, Tenant};
use trainboard::routes::build_app;
use trainboard::utils::non_blank;
use trainboard::wizard::dataset::DatasetEdit;
use trainboard::wizard::training::TrainingEdit;
use trainboard::wizard::{DatasetWizard, Notice, NoticeLevel, TrainingWizard};

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{} {}", "error:".red().bold(), message);
    process::exit(1);
}

fn load_config(env_file: Option<&str>, mode: Option<DataMode>) -> AppConfig {
    config::load_env_file(env_file);
    let cfg = match AppConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => fail(e),
    };
    match mode {
        Some(m) => cfg.with_data_mode(m),
        None => cfg,
    }
}

fn build_backend(cfg: &AppConfig) -> Backend {
    match Backend::from_config(cfg) {
        Ok(b) => b,
        Err(e) => fail(format!("Failed to set up the {} backend: {}", cfg.data_mode.as_str(), e)),
    }
}

async fn start_server(state: AppState, host: &str, port: u16) {
    let addr: SocketAddr = match format!("{}:{}", host, port).parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(%e, "Invalid host/port format");
            fail(format!("Invalid host/port format: {}", e));
        }
    };
    let mode = state.config.data_mode;
    let app = build_app(state);
    tracing::info!(%addr, mode = mode.as_str(), "Starting trainboard server");
    println!(
        "{} {} ({} data)",
        "API server running on".green(),
        format!("http://{}", addr).cyan(),
        mode.as_str()
    );
    match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(%e, "Server encountered an error while running");
                fail(format!("Server error: {}", e));
            }
        }
        Err(e) => {
            tracing::error!(%e, "Failed to bind to address");
            eprintln!(
                "{}: {}\n{}",
                format!("Failed to bind to {}", addr).red(),
                e,
                "Stop whatever is using this port, or pass a different --port.".yellow()
            );
            process::exit(1);
        }
    }
}

fn json_value_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(json_value_to_string).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(v).unwrap_or_default(),
    }
}

/// Render rows (objects sharing the given columns) as a table sized to the
/// terminal.
fn print_table(columns: &[&str], rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty list)");
        return;
    }
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL);
    table.apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if let Some((Width(w), _)) = terminal_size() {
        table.set_width(w.saturating_sub(4));
    }
    table.set_header(columns.to_vec());
    for row in rows {
        table.add_row(
            columns
                .iter()
                .map(|c| row.get(*c).map(json_value_to_string).unwrap_or_default())
                .collect::<Vec<_>>(),
        );
    }
    println!("\n{table}\n");
}

fn print_notices(notices: Vec<Notice>) {
    for n in notices {
        match n.level {
            NoticeLevel::Success => println!("{}", n.message.green()),
            NoticeLevel::Info => println!("{}", n.message.cyan()),
            NoticeLevel::Error => eprintln!("{}", n.message.red()),
        }
    }
}

#[derive(Parser)]
#[command(
    name = "trainboard",
    author,
    version,
    about = "Training dashboard backend and command-line tool",
    long_about = r#"trainboard - curate datasets and launch training runs.

Serves the JSON API behind the training dashboard (dataset and training-run
wizards, tenant catalogues) and exposes the same operations on the command
line. Use `--mode dummy` to work against built-in fixtures, or `--mode live`
with API_BASE_URL / API_TOKEN pointing at the training backend.

Examples:
  trainboard serve --port 8080
  trainboard tenants list
  trainboard datasets create --tenant tenant_001 --name "Q4 English" --language English
  trainboard training create --tenant tenant_001 --dataset 660e8400-e29b-41d4-a716-446655440003 --base-model base_003
"#,
    after_help = "Use `trainboard <subcommand> --help` for subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Data backing: dummy (fixtures) or live (HTTP); overrides DATA_MODE
    #[arg(long, global = true)]
    mode: Option<DataMode>,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the JSON API server
    Serve {
        /// Host to bind to (defaults to HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (defaults to PORT or 8080)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Validate configuration and, in live mode, backend connectivity
    CheckConfig,
    /// Customer tenants
    Tenants {
        #[command(subcommand)]
        sub: TenantCommands,
    },
    /// Workflows of a tenant
    Workflows {
        #[command(subcommand)]
        sub: WorkflowCommands,
    },
    /// Model artifacts available to a tenant
    Models {
        #[command(subcommand)]
        sub: ModelCommands,
    },
    /// Dataset preparations
    Datasets {
        #[command(subcommand)]
        sub: DatasetCommands,
    },
    /// Training runs
    Training {
        #[command(subcommand)]
        sub: TrainingCommands,
    },
}

#[derive(Subcommand)]
enum TenantCommands {
    List,
}

#[derive(Subcommand)]
enum WorkflowCommands {
    List { tenant_id: String },
}

#[derive(Subcommand)]
enum ModelCommands {
    List {
        tenant_id: String,
        /// TRTLLM or RAW_WEIGHT
        #[arg(long, default_value = "TRTLLM")]
        kind: ArtifactType,
    },
}

#[derive(Subcommand)]
enum DatasetCommands {
    #[command(about = "List dataset preparations")]
    List {
        #[arg(long)]
        tenant: Option<String>,
    },
    #[command(
        about = "Pull, preview and save a new dataset",
        long_about = "Runs the dataset wizard end to end: selects the tenant, applies the filters, previews the record count and saves the dataset if the preview is not empty."
    )]
    Create(DatasetCreateArgs),
    #[command(about = "Show one dataset preparation and its files")]
    Show { id: String },
    #[command(about = "Delete a dataset preparation")]
    Delete { id: String },
}

#[derive(Args)]
struct DatasetCreateArgs {
    #[arg(long)]
    tenant: String,
    #[arg(long)]
    name: String,
    /// First day of the range (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,
    /// Last day of the range (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,
    #[arg(long = "language")]
    languages: Vec<String>,
    #[arg(long = "workflow")]
    workflows: Vec<String>,
    #[arg(long = "asr-version")]
    asr_versions: Vec<String>,
    /// Quality flag constraint, e.g. `is_noisy=false`
    #[arg(long = "flag")]
    flags: Vec<String>,
}

#[derive(Subcommand)]
enum TrainingCommands {
    #[command(about = "List training runs")]
    List {
        #[arg(long)]
        tenant: Vec<String>,
        #[arg(long)]
        status: Option<RunStatus>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    #[command(
        about = "Configure and start a training run",
        long_about = "Runs the training wizard end to end. Hidden hyperparameters are always sent with their defaults; visible ones may be overridden with --set name=value."
    )]
    Create(TrainingCreateArgs),
    #[command(about = "Show one training run")]
    Show { id: String },
    #[command(about = "Abort an active training run")]
    Abort {
        id: String,
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Args)]
struct TrainingCreateArgs {
    #[arg(long)]
    tenant: String,
    /// Dataset preparation id (repeatable)
    #[arg(long = "dataset", required = true)]
    datasets: Vec<String>,
    #[arg(long)]
    base_model: String,
    /// Run name (defaults to <tenant>-training-<date>)
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    /// Hyperparameter override, `name=value` (repeatable)
    #[arg(long = "set")]
    overrides: Vec<String>,
    #[arg(long)]
    gpu: Option<String>,
    #[arg(long)]
    instance: Option<String>,
    #[arg(long)]
    memory_gb: Option<u32>,
    #[arg(long)]
    timeout_secs: Option<u32>,
    #[arg(long)]
    retries: Option<u32>,
}

fn split_assignment(raw: &str) -> (String, String) {
    match raw.split_once('=') {
        Some((k, v)) => (k.trim().to_string(), v.trim().to_string()),
        None => fail(format!("expected name=value, got '{}'", raw)),
    }
}

async fn find_tenant(backend: &Backend, tenant_id: &str) -> Tenant {
    let tenants = match backend.list_tenants().await {
        Ok(t) => t,
        Err(e) => fail(format!("Failed to load tenants: {}", e)),
    };
    match tenants.into_iter().find(|t| t.tenant_id == tenant_id.trim()) {
        Some(t) => t,
        None => fail(format!("Unknown tenant '{}'", tenant_id)),
    }
}

async fn create_dataset(backend: &Backend, args: DatasetCreateArgs) {
    let mut wizard = DatasetWizard::new();
    let tenant = find_tenant(backend, &args.tenant).await;
    wizard.select_tenant_with(&tenant, backend).await;

    let mut edits = vec![DatasetEdit::SetDateRange {
        start: args.start,
        end: args.end,
    }];
    edits.extend(args.languages.into_iter().map(|language| DatasetEdit::ToggleLanguage { language }));
    edits.extend(args.workflows.into_iter().map(|workflow_id| DatasetEdit::AddWorkflow { workflow_id }));
    edits.extend(args.asr_versions.into_iter().map(|version| DatasetEdit::AddAsrVersion { version }));
    for raw in &args.flags {
        let (name, value) = split_assignment(raw);
        let flag: QualityFlag = match serde_json::from_value(json!(name)) {
            Ok(f) => f,
            Err(_) => fail(format!("Unknown quality flag '{}'", name)),
        };
        let value = match value.to_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            "any" | "" => None,
            other => fail(format!("Flag value must be true, false or any, got '{}'", other)),
        };
        edits.push(DatasetEdit::SetFlag { flag, value });
    }
    edits.push(DatasetEdit::SetName { name: args.name });
    for edit in edits {
        if let Err(e) = wizard.apply_edit(edit) {
            fail(e);
        }
    }

    // Customer -> Filters -> Preview
    for _ in 0..2 {
        if let Err(e) = wizard.advance_with(backend).await {
            print_notices(wizard.notices_mut().drain());
            fail(e);
        }
    }
    print_notices(wizard.notices_mut().drain());
    if let Some(preview) = &wizard.form().preview {
        println!(
            "{} {} records (fetch {})",
            "Preview:".bold(),
            preview.record_count,
            preview.fetch_id
        );
    }
    if wizard.advance().is_err() {
        fail("Preview is empty; nothing to save");
    }
    let result = wizard.submit(backend).await;
    print_notices(wizard.notices_mut().drain());
    match result {
        Ok(saved) => print_table(
            &["training_data_preparation_id", "s3_root_path", "record_count"],
            &[json!(saved)],
        ),
        Err(e) => fail(e),
    }
}

async fn create_training(backend: &Backend, args: TrainingCreateArgs) {
    let mut wizard = TrainingWizard::new();
    let tenant = find_tenant(backend, &args.tenant).await;
    wizard.select_tenant_with(&tenant, backend).await;
    print_notices(wizard.notices_mut().drain());

    let mut edits = Vec::new();
    if let Some(name) = args.name.as_deref().and_then(non_blank) {
        edits.push(TrainingEdit::SetName { name });
    }
    if let Some(description) = args.description {
        edits.push(TrainingEdit::SetDescription { description });
    }
    edits.extend(args.datasets.into_iter().map(|id| TrainingEdit::TogglePreparation { id }));
    edits.push(TrainingEdit::SetBaseModel {
        artifact_id: args.base_model,
    });
    for raw in &args.overrides {
        let (name, value) = split_assignment(raw);
        edits.push(TrainingEdit::SetHyperparameter { name, value });
    }
    let execution = [
        ("gpu_type", args.gpu),
        ("instance_type", args.instance),
        ("memory_gb", args.memory_gb.map(|v| v.to_string())),
        ("timeout_secs", args.timeout_secs.map(|v| v.to_string())),
        ("retry_attempts", args.retries.map(|v| v.to_string())),
    ];
    for (field, value) in execution {
        if let Some(value) = value {
            edits.push(TrainingEdit::SetExecution {
                field: field.to_string(),
                value,
            });
        }
    }
    for edit in edits {
        if let Err(e) = wizard.apply_edit(edit) {
            fail(e);
        }
    }

    while !wizard.navigator().is_last() {
        if let Err(e) = wizard.advance() {
            fail(e);
        }
    }
    let result = wizard.submit(backend).await;
    print_notices(wizard.notices_mut().drain());
    match result {
        Ok(created) => print_table(
            &["training_execution_id", "training_execution_name", "status"],
            &[json!(created)],
        ),
        Err(e) => fail(e),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }

    let cfg = load_config(cli.env_file.as_deref(), cli.mode);

    let command = match cli.command {
        Some(c) => c,
        None => {
            let state = AppState::new(cfg.clone(), build_backend(&cfg));
            start_server(state, &config::get_host(), config::get_port()).await;
            return;
        }
    };

    match command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(config::get_host);
            let port = port.unwrap_or_else(config::get_port);
            let state = AppState::new(cfg.clone(), build_backend(&cfg));
            start_server(state, &host, port).await;
        }
        Commands::CheckConfig => {
            println!("{:<22}{}", "DATA_MODE", cfg.data_mode.as_str());
            println!("{:<22}{}", "API_BASE_URL", cfg.api_base_url);
            println!(
                "{:<22}{}",
                "API_TOKEN",
                if cfg.api_token.is_empty() { "(not set)" } else { "***" }
            );
            println!("{:<22}{}s", "REQUEST_TIMEOUT_SECS", cfg.request_timeout.as_secs());
            if cfg.data_mode == DataMode::Dummy {
                println!("{}", "Configuration is valid (fixture data, no backend contacted)".green());
                return;
            }
            if cfg.api_token.is_empty() {
                fail("API_TOKEN is not configured");
            }
            let backend = build_backend(&cfg);
            match backend.list_tenants().await {
                Ok(tenants) => println!(
                    "{}",
                    format!("Configuration looks valid ({} tenants returned)", tenants.len()).green()
                ),
                Err(e) => fail(format!("Configuration appears invalid: {}", e)),
            }
        }
        Commands::Tenants { sub: TenantCommands::List } => {
            let backend = build_backend(&cfg);
            match backend.list_tenants().await {
                Ok(list) => print_table(
                    &["tenant_id", "tenant_name", "region"],
                    &list.iter().map(|t| json!(t)).collect::<Vec<_>>(),
                ),
                Err(e) => fail(e),
            }
        }
        Commands::Workflows { sub: WorkflowCommands::List { tenant_id } } => {
            let backend = build_backend(&cfg);
            match backend.list_workflows(&tenant_id).await {
                Ok(list) => print_table(
                    &["workflow_id", "workflow_name"],
                    &list.iter().map(|w| json!(w)).collect::<Vec<_>>(),
                ),
                Err(e) => fail(e),
            }
        }
        Commands::Models { sub: ModelCommands::List { tenant_id, kind } } => {
            let backend = build_backend(&cfg);
            match backend.list_models(&tenant_id, kind).await {
                Ok(list) => print_table(
                    &["artifact_id", "model_artifact_name", "artifact_type", "published", "created_at"],
                    &list.iter().map(|m| json!(m)).collect::<Vec<_>>(),
                ),
                Err(e) => fail(e),
            }
        }
        Commands::Datasets { sub } => {
            let backend = build_backend(&cfg);
            match sub {
                DatasetCommands::List { tenant } => match backend.list_datasets(tenant.as_deref()).await {
                    Ok(list) => {
                        let rows: Vec<Value> = list
                            .iter()
                            .map(|d| {
                                json!({
                                    "id": d.training_data_preparation_id,
                                    "name": d.dataset_name,
                                    "tenant": d.tenant_id,
                                    "records": d.total_records(),
                                    "created_at": d.created_at,
                                })
                            })
                            .collect();
                        print_table(&["id", "name", "tenant", "records", "created_at"], &rows);
                    }
                    Err(e) => fail(e),
                },
                DatasetCommands::Create(args) => create_dataset(&backend, args).await,
                DatasetCommands::Show { id } => match backend.get_dataset(&id).await {
                    Ok(d) => {
                        println!("{} {}", d.dataset_name.bold(), d.training_data_preparation_id.dim());
                        println!("  tenant:   {}", d.tenant_id.as_deref().unwrap_or("-"));
                        println!("  root:     {}", d.s3_root_path);
                        println!(
                            "  range:    {} .. {}",
                            d.date_range_start.as_deref().unwrap_or("-"),
                            d.date_range_end.as_deref().unwrap_or("-")
                        );
                        println!("  records:  {}", d.total_records());
                        print_table(
                            &["file_id", "file_type", "file_name", "record_count", "s3_path"],
                            &d.files.iter().map(|f| json!(f)).collect::<Vec<_>>(),
                        );
                    }
                    Err(e) => fail(e),
                },
                DatasetCommands::Delete { id } => match backend.delete_dataset(&id).await {
                    Ok(()) => println!("{} {}", "Deleted dataset".green(), id),
                    Err(e) => fail(e),
                },
            }
        }
        Commands::Training { sub } => {
            let backend = build_backend(&cfg);
            match sub {
                TrainingCommands::List {
                    tenant,
                    status,
                    name,
                    start,
                    end,
                } => {
                    let filters = RunFilters {
                        start_date: start,
                        end_date: end,
                        created_by: Vec::new(),
                        tenant_id: tenant,
                        status,
                        training_execution_name: name,
                    };
                    match backend.list_training_runs(&filters).await {
                        Ok(list) => print_table(
                            &["training_execution_id", "training_execution_name", "status", "tenant_id", "created_at"],
                            &list.iter().map(|r| json!(r)).collect::<Vec<_>>(),
                        ),
                        Err(e) => fail(e),
                    }
                }
                TrainingCommands::Create(args) => create_training(&backend, args).await,
                TrainingCommands::Show { id } => match backend.get_training_run(&id).await {
                    Ok(run) => print_table(
                        &["field", "value"],
                        &[
                            json!({"field": "id", "value": run.training_execution_id}),
                            json!({"field": "name", "value": run.training_execution_name}),
                            json!({"field": "status", "value": run.status.as_str()}),
                            json!({"field": "tenant", "value": run.tenant_id}),
                            json!({"field": "customer", "value": run.customer_name}),
                            json!({"field": "started_at", "value": run.started_at}),
                            json!({"field": "completed_at", "value": run.completed_at}),
                            json!({"field": "error", "value": run.error_message}),
                        ],
                    ),
                    Err(e) => fail(e),
                },
                TrainingCommands::Abort { id, reason } => {
                    match backend.abort_training_run(&id, reason.as_deref()).await {
                        Ok(()) => println!("{} {}", "Abort requested for".yellow(), id),
                        Err(e) => fail(e),
                    }
                }
            }
        }
    }
}
