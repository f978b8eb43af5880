use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use checkpoint_store::{CheckpointRecorder, FsArtifactSink};
use mail_composer::{BackendConfig, ContentGenerator, HttpGenerativeBackend};
use mailwright_cli::{AppConfig, ChromiumLauncher};
use mailwright_core_types::{SessionId, SessionStatus};
use mailwright_event_bus::{ProgressFeed, ProgressNotifier};
use session_flow::{FlowConfig, MailInput, SendRequest, SessionOrchestrator};

#[derive(Parser, Debug)]
#[command(
    name = "mailwright",
    version,
    about = "Compose and send webmail through a driven browser session"
)]
struct Cli {
    /// Account identifier to sign in with.
    #[arg(long)]
    identity: String,

    /// Account secret.
    #[arg(long, env = "MAILWRIGHT_SECRET", hide_env_values = true)]
    secret: String,

    /// Recipient address.
    #[arg(long)]
    recipient: String,

    /// Natural-language instruction for the content generator.
    #[arg(long, conflicts_with_all = ["subject", "body"])]
    instruction: Option<String>,

    /// Pre-composed subject (requires --body).
    #[arg(long, requires = "body")]
    subject: Option<String>,

    /// Pre-composed body (requires --subject).
    #[arg(long, requires = "subject")]
    body: Option<String>,

    /// Optional free-form context passed alongside the instruction.
    #[arg(long)]
    context: Option<String>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run the browser with a visible window.
    #[arg(long)]
    headed: bool,

    /// Generative backend key; enables content generation without a
    /// backend section in the config file.
    #[arg(long, env = "MAILWRIGHT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Stream checkpoints to the log as the session progresses.
    #[arg(long)]
    progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_ref())?;

    let input = match (cli.instruction, cli.subject, cli.body) {
        (Some(instruction), None, None) => MailInput::Instruction(instruction),
        (None, Some(subject), Some(body)) => MailInput::Composed { subject, body },
        _ => bail!("provide either --instruction or both --subject and --body"),
    };

    let generator = build_generator(config.backend.clone(), cli.api_key);

    let sink = Arc::new(FsArtifactSink::new(&config.artifact_dir));
    let recorder = Arc::new(CheckpointRecorder::new(sink));
    let notifier = ProgressNotifier::new();
    let launcher = Arc::new(ChromiumLauncher::new(
        config.headless && !cli.headed,
        config.window,
    ));

    let flow = FlowConfig {
        mail_url: config.mail_url.clone(),
        ..FlowConfig::default()
    };
    let orchestrator =
        SessionOrchestrator::new(launcher, generator, recorder, notifier.clone(), flow);

    let session = SessionId::new();
    if cli.progress {
        // Subscribe before the run so the feed catches every checkpoint.
        let feed = notifier.subscribe(&session);
        tokio::spawn(stream_progress(session.clone(), feed));
    }

    let request = SendRequest {
        credential_identity: cli.identity,
        credential_secret: cli.secret,
        recipient: cli.recipient,
        input,
        session_context: cli.context,
    };

    let result = orchestrator.run_session(session, request).await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if matches!(result.status, SessionStatus::Error) {
        std::process::exit(1);
    }
    Ok(())
}

fn build_generator(
    configured: Option<BackendConfig>,
    api_key: Option<String>,
) -> ContentGenerator {
    let backend_config = match (configured, api_key) {
        (Some(mut config), Some(key)) => {
            config.api_key = key;
            Some(config)
        }
        (Some(config), None) => Some(config),
        (None, Some(key)) => Some(BackendConfig {
            base_url: "https://api.cohere.ai".to_string(),
            api_key: key,
            model: "command".to_string(),
            timeout_secs: 30,
            temperature: 0.7,
        }),
        (None, None) => None,
    };

    match backend_config {
        Some(config) => match HttpGenerativeBackend::new(config) {
            Ok(backend) => ContentGenerator::new(Some(Arc::new(backend))),
            Err(err) => {
                warn!(error = %err, "generative backend unusable, using fallback content");
                ContentGenerator::offline()
            }
        },
        None => {
            info!("no generative backend configured, using fallback content");
            ContentGenerator::offline()
        }
    }
}

/// Log the session's checkpoints live as they fire.
async fn stream_progress(session: SessionId, mut feed: ProgressFeed) {
    while let Some(checkpoint) = feed.recv().await {
        info!(
            session = %session,
            step = checkpoint.step.as_str(),
            artifact = checkpoint.artifact_ref.as_deref().unwrap_or("-"),
            "{}",
            checkpoint.description
        );
    }
}
