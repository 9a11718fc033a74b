use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing_subscriber::{fmt, EnvFilter};

use tessera::context::schema_definitions;
use tessera::permissions::CapabilityRegistry;
use tessera::schema::interface::render_module;
use tessera::settings::Settings;
use tessera::storage::{self, SeaOrmCapabilityStore};
use tessera::{web, CmsContext};

#[derive(Parser, Debug)]
#[command(name = "tessera", version, about = "Headless CMS backend")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register the schema and serve the HTTP API (default)
    Serve,
    /// Write TypeScript interfaces for every exposed collection
    GenerateTypes {
        /// JSON file with additional record-type definitions
        #[arg(long)]
        schema: Option<PathBuf>,
        /// Output file (defaults to schema.types_output)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Administer custom capabilities
    Capabilities {
        #[command(subcommand)]
        action: CapabilityAction,
    },
}

#[derive(Subcommand, Debug)]
enum CapabilityAction {
    /// List every capability with its bit position
    List,
    /// Register a custom capability
    Register {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    /// Unregister a custom capability
    Unregister { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    // logging
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    // load settings
    let settings = Settings::load(&cli.config)?;
    tracing::info!(?settings, "Loaded configuration");

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(settings).await,
        Command::GenerateTypes { schema, output } => generate_types(&settings, schema, output),
        Command::Capabilities { action } => capabilities(&settings, action).await,
    }
}

async fn serve(settings: Settings) -> Result<()> {
    let ctx = CmsContext::bootstrap(&settings).await?;
    web::serve(&settings, ctx).await
}

fn generate_types(
    settings: &Settings,
    schema: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let defs = schema_definitions(schema.as_deref().or(settings.schema.definitions.as_deref()))?;
    let ctx = CmsContext::with_definitions(&defs);

    let output = output.unwrap_or_else(|| settings.schema.types_output.clone());
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    std::fs::write(&output, render_module(&ctx.schema.describe_all_as_interfaces()))
        .into_diagnostic()?;

    tracing::info!(
        collections = ctx.schema.len(),
        output = %output.display(),
        "Generated TypeScript interfaces"
    );
    Ok(())
}

async fn capabilities(settings: &Settings, action: CapabilityAction) -> Result<()> {
    let db = storage::init(&settings.database).await?;
    let registry = CapabilityRegistry::new();
    registry
        .initialize(Arc::new(SeaOrmCapabilityStore::new(db)))
        .await?;

    match action {
        CapabilityAction::List => {
            for cap in registry.capabilities() {
                let kind = if cap.is_builtin() { "builtin" } else { "custom" };
                println!("{:>2}  {:<24} {}", cap.bit, cap.name, kind);
            }
        }
        CapabilityAction::Register { name, description } => {
            let cap = registry
                .register_with_description(&name, &description)
                .await?;
            tracing::info!(name = %cap.name, bit = cap.bit, "Registered capability");
        }
        CapabilityAction::Unregister { name } => {
            registry.unregister(&name).await?;
            tracing::info!(%name, "Unregistered capability");
        }
    }
    Ok(())
}
