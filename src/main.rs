//! dpdp-consent CLI
//!
//! One notice-and-consent flow per invocation, driven against the configured
//! text-generation service.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dpdp_consent::catalog::{Catalog, Language, Persona, Purpose};
use dpdp_consent::llm::LlmClient;
use dpdp_consent::logging::init_logging;
use dpdp_consent::workflow::{ConsentSession, CredentialState};
use dpdp_consent::AppConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dpdp-consent")]
#[command(about = "DPDP Act 2023 notice-and-consent workflow", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "DPDP_CONFIG")]
    config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DPDP_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one consent flow and print the resulting session as JSON
    Run {
        /// Persona id (see `catalog`)
        #[arg(short, long)]
        persona: String,

        /// Notice language code; defaults to the configured language
        #[arg(short, long)]
        language: Option<String>,

        /// Translate the notice when the language is not the source language
        #[arg(long)]
        translate: bool,

        /// Optional purpose to grant (repeatable)
        #[arg(short, long = "grant")]
        grants: Vec<String>,

        /// Revoke optional consents after the receipt is issued
        #[arg(long)]
        revoke: bool,
    },
    /// Print the purpose, persona and language catalogs
    Catalog,
    /// Write a sample configuration file
    SampleConfig {
        #[arg(short, long, default_value = "dpdp-consent.toml.example")]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct CatalogView<'a> {
    default_language: &'a str,
    purposes: Vec<&'a Purpose>,
    personas: Vec<&'a Persona>,
    languages: Vec<&'a Language>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Command::SampleConfig { output } = &cli.command {
        AppConfig::generate_sample_config(output)
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!("Sample configuration written to {}", output.display());
        return Ok(());
    }

    let mut config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(Some(path)),
        None => AppConfig::load(),
    }
    .context("failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    let _guard = init_logging(&config.logging)?;

    let catalog = Arc::new(config.build_catalog()?);

    match cli.command {
        Command::Catalog => print_catalog(&catalog),
        Command::Run {
            persona,
            language,
            translate,
            grants,
            revoke,
        } => {
            let language = language.unwrap_or_else(|| config.fiduciary.default_language.clone());
            run_flow(&config, catalog, &persona, &language, translate, &grants, revoke).await
        }
        Command::SampleConfig { .. } => Ok(()),
    }
}

fn print_catalog(catalog: &Catalog) -> Result<()> {
    let view = CatalogView {
        default_language: catalog.languages().default_code(),
        purposes: catalog.purposes().iter().collect(),
        personas: catalog.personas().iter().collect(),
        languages: catalog.languages().iter().collect(),
    };
    println!("{}", serde_json::to_string_pretty(&view)?);
    Ok(())
}

async fn run_flow(
    config: &AppConfig,
    catalog: Arc<Catalog>,
    persona: &str,
    language: &str,
    translate: bool,
    grants: &[String],
    revoke: bool,
) -> Result<()> {
    let client = LlmClient::new(config.llm.clone()).context("failed to create text generator")?;

    let credential = if config.has_api_key() {
        CredentialState::Valid
    } else {
        CredentialState::Invalid
    };
    let mut session =
        ConsentSession::new(catalog, config.fiduciary.name.clone()).with_credential(credential);

    session.select_persona(persona)?;
    session.select_language(language)?;
    session
        .generate_notice(&client)
        .await
        .context("notice generation failed")?;

    if translate && !session.catalog().languages().is_default(language) {
        // the source notice stays displayable when translation fails
        if let Err(e) = session.translate_notice(&client).await {
            tracing::warn!(error = %e, "Translation failed; showing source notice");
        }
    }

    if !session.proceed_to_consent() {
        bail!("cannot proceed to consent without a persona and a notice");
    }

    let mut requested: Vec<&str> = Vec::new();
    for id in grants {
        if !requested.contains(&id.as_str()) {
            requested.push(id);
        }
    }
    for id in requested {
        if session.toggle_consent(id).is_none() {
            tracing::warn!(purpose = %id, "Purpose is required or unknown; grant ignored");
        }
    }

    let receipt_id = session.submit_consent()?.id().to_string();
    if revoke {
        session.revoke_consent()?;
    }

    tracing::info!(receipt_id = %receipt_id, "Consent flow complete");
    println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    Ok(())
}
