// Copyright 2026 The TestCraft Project
// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, Subcommand, ValueEnum};
use testcraft::client::{BackendClient, HttpBackendClient};
use testcraft::feature::{Feature, DEFAULT_BASE_URL};
use testcraft::generate::Generator;
use testcraft::notify::ChannelNotifier;
use testcraft::render::{BufferTarget, RenderTarget};
use testcraft::settings::{self, keys, SettingsStore};
use testcraft::stream::SessionOutcome;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "testcraft", about = "Streaming client for the TestCraft generation service")]
struct Cli {
    /// Backend server URL (overrides the stored custom server URL)
    #[arg(long, env = "TESTCRAFT_SERVER")]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate output for a captured element
    Generate {
        /// Which generation to run
        #[arg(long, value_enum)]
        feature: FeatureArg,

        /// Element source file ("-" for stdin); defaults to the stored capture
        #[arg(long)]
        source: Option<PathBuf>,

        /// Target language for generated tests
        #[arg(long)]
        language: Option<String>,

        /// Target framework for generated tests
        #[arg(long)]
        framework: Option<String>,

        /// Base URL of the site under test
        #[arg(long)]
        base_url: Option<String>,

        /// OpenAI API key forwarded to the backend
        #[arg(long, env = "TESTCRAFT_API_KEY")]
        api_key: Option<String>,

        /// Model override
        #[arg(long)]
        model: Option<String>,
    },
    /// Probe the backend health endpoint
    Ping,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FeatureArg {
    TestIdeas,
    AutomateTests,
    AutomateIdeas,
    CheckAccessibility,
}

impl From<FeatureArg> for Feature {
    fn from(arg: FeatureArg) -> Self {
        match arg {
            FeatureArg::TestIdeas => Feature::TestIdeas,
            FeatureArg::AutomateTests => Feature::AutomateTests,
            FeatureArg::AutomateIdeas => Feature::AutomateFromIdeas,
            FeatureArg::CheckAccessibility => Feature::CheckAccessibility,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = settings::open_default();

    let base_url = match resolve_base_url(cli.server, settings.as_ref()).await {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("failed to read settings: {e}");
            std::process::exit(1);
        }
    };
    let client = Arc::new(HttpBackendClient::new(base_url));

    match cli.command {
        Command::Ping => {
            if let Err(e) = client.ping().await {
                tracing::error!("backend unreachable: {e}");
                std::process::exit(1);
            }
            println!("ok");
        }
        Command::Generate {
            feature,
            source,
            language,
            framework,
            base_url,
            api_key,
            model,
        } => {
            if let Err(e) = store_overrides(
                settings.as_ref(),
                source,
                language,
                framework,
                base_url,
                api_key,
                model,
            )
            .await
            {
                tracing::error!("failed to prepare settings: {e}");
                std::process::exit(1);
            }

            let (notifier, mut lifecycle) = ChannelNotifier::new();
            let generator = Generator::new(client, settings, Arc::new(notifier));

            // The popup analog: log lifecycle messages as they arrive.
            let listener = tokio::spawn(async move {
                while let Some(msg) = lifecycle.recv().await {
                    tracing::info!(status = ?msg.status, message = ?msg.message, "stream lifecycle");
                }
            });

            let target = BufferTarget::new();
            let result = generator.run(feature.into(), &target).await;
            drop(generator);
            let _ = listener.await;

            match result {
                Ok(SessionOutcome::Finished) => {
                    println!("{}", target.contents());
                }
                Ok(SessionOutcome::Aborted) => {
                    tracing::info!("generation aborted");
                }
                Ok(SessionOutcome::Failed(key)) => {
                    tracing::error!(?key, "generation failed");
                    std::process::exit(1);
                }
                Err(e) => {
                    tracing::error!("generation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn resolve_base_url(
    flag: Option<String>,
    settings: &dyn SettingsStore,
) -> Result<String, testcraft::settings::SettingsError> {
    if let Some(server) = flag {
        return Ok(server);
    }
    Ok(settings
        .get_string(keys::CUSTOM_SERVER_URL)
        .await?
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
}

/// Persist command-line overrides so the generator reads one source of
/// truth, exactly like the settings form would have written them.
async fn store_overrides(
    settings: &dyn SettingsStore,
    source: Option<PathBuf>,
    language: Option<String>,
    framework: Option<String>,
    base_url: Option<String>,
    api_key: Option<String>,
    model: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = source {
        let contents = if path.as_os_str() == "-" {
            let mut buf = String::new();
            tokio::io::stdin().read_to_string(&mut buf).await?;
            buf
        } else {
            tokio::fs::read_to_string(&path).await?
        };
        settings.set(keys::ELEMENT_SOURCE, contents.into()).await?;
    }
    if let Some(language) = language {
        settings.set(keys::LANGUAGE_SELECTED, language.into()).await?;
    }
    if let Some(framework) = framework {
        settings.set(keys::FRAMEWORK_SELECTED, framework.into()).await?;
    }
    if let Some(base_url) = base_url {
        settings.set(keys::SITE_URL, base_url.into()).await?;
    }
    if let Some(api_key) = api_key {
        settings.set(keys::OPENAI_API_KEY, api_key.into()).await?;
    }
    if let Some(model) = model {
        settings.set(keys::OPENAI_MODEL, model.into()).await?;
    }
    Ok(())
}
