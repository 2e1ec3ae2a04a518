use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokenhub::config::Config;
use tokenhub::error::Result;
use tokenhub::provision::{
    missing_count, ProvisionOptions, ProvisionStatus, Provisioner, ScriptConverter,
};
use tokenhub::registry::ModelRegistry;
use tokenhub::serve::{self, AppState, TokenizerRegistry};

#[derive(Parser)]
#[command(name = "tokenhub")]
#[command(about = "Tokenizer provisioning and serving for ONNX classification models", long_about = None)]
struct Cli {
    /// Path to the service config file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision model artifacts declared in the registry
    Provision {
        /// Re-provision every model even if artifacts exist
        #[arg(long)]
        force: bool,
        /// Base directory for models (overrides config)
        #[arg(long)]
        models_dir: Option<PathBuf>,
        /// Only report how many models are missing, download nothing
        #[arg(long)]
        check_only: bool,
        /// Path to the JSON model registry (overrides config)
        #[arg(long)]
        registry: Option<PathBuf>,
    },
    /// Load all tokenizers and serve them over HTTP
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Provision {
            force,
            models_dir,
            check_only,
            registry,
        } => run_provision(&config, force, models_dir, check_only, registry),
        Commands::Serve { host, port } => run_serve(&config, host, port).await,
    }
}

fn run_provision(
    config: &Config,
    force: bool,
    models_dir: Option<PathBuf>,
    check_only: bool,
    registry_path: Option<PathBuf>,
) -> Result<()> {
    let registry_path = registry_path.unwrap_or_else(|| config.models.registry_file.clone());
    let models_dir = models_dir.unwrap_or_else(|| config.models.models_dir.clone());

    let registry = ModelRegistry::load(&registry_path)?;

    if check_only {
        let missing = missing_count(&registry, &models_dir);
        println!("Models to download: {missing}");
        return Ok(());
    }

    if registry.is_empty() {
        println!("No models configured, nothing to do");
        return Ok(());
    }

    let converter = ScriptConverter::new(
        &config.models.scripts_dir,
        &registry.config.conversion_script,
    )?;

    let provisioner = Provisioner::new(
        converter,
        ProvisionOptions {
            force,
            models_dir,
            working_dir: config.models.working_dir.clone(),
        },
    );

    let report = provisioner.run(&registry);

    println!("Provisioning run started at {}", report.started_at);
    println!(
        "  Already present: {}",
        report.count(&ProvisionStatus::AlreadyPresent)
    );
    println!(
        "  Downloaded: {}",
        report.count(&ProvisionStatus::Downloaded)
    );
    println!("  Relocated: {}", report.count(&ProvisionStatus::Moved));

    let failed = report.failed();
    if !failed.is_empty() {
        println!("  Failed: {}", failed.len());
        for outcome in failed {
            println!("    - {}", outcome.name);
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run_serve(config: &Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let registry = ModelRegistry::load(&config.models.registry_file)?;

    // Every declared tokenizer must load before traffic is accepted; any
    // failure here is fatal for the whole service.
    let tokenizers = TokenizerRegistry::load(&registry, &config.models.models_dir).await?;

    let state = AppState {
        registry: Arc::new(tokenizers),
        default_model: config.tokenize.default_model.clone(),
        default_max_length: config.tokenize.default_max_length,
    };

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    serve::serve(state, &host, port).await
}
