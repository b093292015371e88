use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tanit_chat::{ChatPipeline, ConversationHistory};
use tanit_core::{AppConfig, Role, TurnInput};
use tanit_engine::{EngineRegistry, TranscriptionService};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tanit", about = "Multimodal fertility-education chat assistant (prototype)")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "tanit.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Handle a single turn and print the reply
    Ask {
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        audio: Option<PathBuf>,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
    /// Interactive session on stdin
    Chat,
    /// Transcribe a WAV file with the configured engine
    Transcribe { audio: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(false),
    );
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let transcription = Arc::new(
        TranscriptionService::from_config(&config.transcription).with_context(|| {
            format!(
                "failed to set up transcription engine '{}' (available in this build: {})",
                config.transcription.engine,
                EngineRegistry::new().list_engines().join(", ")
            )
        })?,
    );
    tracing::info!(
        engine = %transcription.engine_name(),
        backend = EngineRegistry::new().describe(transcription.engine_name()).unwrap_or("custom"),
        "tanit starting"
    );

    let result = match cli.command {
        Command::Transcribe { audio } => transcribe(&transcription, &audio).await,
        Command::Ask {
            text,
            audio,
            image,
            pdf,
        } => {
            let pipeline = ChatPipeline::from_config(&config, Arc::clone(&transcription))
                .context("failed to build chat pipeline")?;
            let input = TurnInput {
                text,
                audio,
                image,
                pdf,
            };
            let outcome = pipeline
                .handle_turn(&ConversationHistory::new(), &input)
                .await
                .context("turn failed")?;
            print_history(&outcome.history);
            Ok(())
        }
        Command::Chat => {
            let pipeline = ChatPipeline::from_config(&config, Arc::clone(&transcription))
                .context("failed to build chat pipeline")?;
            run_chat(&pipeline).await
        }
    };

    transcription
        .shutdown()
        .await
        .context("failed to shut down transcription engine")?;
    tracing::info!("shutting down");
    result
}

async fn transcribe(service: &TranscriptionService, audio: &Path) -> Result<()> {
    let result = service
        .transcribe_detailed(Some(audio))
        .await
        .with_context(|| format!("failed to transcribe {:?}", audio))?;
    if let Some(result) = result {
        match result.forced_language {
            Some(ref forced) => tracing::info!(
                detected = %result.detected_language,
                forced = %forced,
                "transcribed with fallback language"
            ),
            None => tracing::info!(detected = %result.detected_language, "transcribed"),
        }
        println!("{}", result.text);
    }
    Ok(())
}

fn print_history(history: &ConversationHistory) {
    for turn in history.turns() {
        let label = match turn.role() {
            Role::User => "you",
            Role::Assistant => "tanit",
        };
        println!("[{label}] {}\n", turn.content());
    }
}

const CHAT_HELP: &str = "commands: /audio PATH, /image PATH, /pdf PATH stage a file; \
/send sends staged files without text; /history; /clear; /quit. Any other non-empty line is sent as text.";

/// One line of the interactive session.
#[derive(Debug, PartialEq, Eq)]
enum ChatLine<'a> {
    Blank,
    Quit,
    Help,
    History,
    Clear,
    Usage(&'a str),
    Audio(&'a str),
    Image(&'a str),
    Pdf(&'a str),
    Send,
    Text(&'a str),
}

fn parse_chat_line(line: &str) -> ChatLine<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatLine::Blank;
    }
    let (command, arg) = match line.split_once(' ') {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "/quit" | "/exit" => ChatLine::Quit,
        "/help" => ChatLine::Help,
        "/history" => ChatLine::History,
        "/clear" => ChatLine::Clear,
        "/audio" | "/image" | "/pdf" if arg.is_empty() => ChatLine::Usage(command),
        "/audio" => ChatLine::Audio(arg),
        "/image" => ChatLine::Image(arg),
        "/pdf" => ChatLine::Pdf(arg),
        "/send" => ChatLine::Send,
        _ => ChatLine::Text(line),
    }
}

async fn run_chat(pipeline: &ChatPipeline) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history = ConversationHistory::new();
    let mut staged = TurnInput::default();

    println!("{CHAT_HELP}");
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match parse_chat_line(&line) {
            ChatLine::Blank => continue,
            ChatLine::Quit => break,
            ChatLine::Help => println!("{CHAT_HELP}"),
            ChatLine::History => print_history(&history),
            ChatLine::Clear => {
                let outcome = ChatPipeline::clear();
                history = outcome.history;
                staged = TurnInput::default();
                println!("conversation cleared");
            }
            ChatLine::Usage(command) => println!("usage: {command} PATH"),
            ChatLine::Audio(path) => staged.audio = Some(PathBuf::from(path)),
            ChatLine::Image(path) => staged.image = Some(PathBuf::from(path)),
            ChatLine::Pdf(path) => staged.pdf = Some(PathBuf::from(path)),
            turn @ (ChatLine::Send | ChatLine::Text(_)) => {
                if let ChatLine::Text(text) = turn {
                    staged.text = Some(text.to_string());
                }
                match pipeline.handle_turn(&history, &staged).await {
                    Ok(outcome) => {
                        let before = history.len();
                        history = outcome.history;
                        let resets = outcome.resets;
                        if resets.text {
                            staged.text = None;
                        }
                        if resets.audio {
                            staged.audio = None;
                        }
                        if resets.image {
                            staged.image = None;
                        }
                        if resets.pdf {
                            staged.pdf = None;
                        }
                        for turn in &history.turns()[before..] {
                            if turn.role() == Role::Assistant {
                                println!("[tanit] {}\n", turn.content());
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("turn failed: {e}");
                        println!("error: {e}");
                        staged.text = None;
                    }
                }
            }
        }
    }
    Ok(())
}
