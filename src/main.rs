use std::io::Stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use vortex_breath::config::{OutputFormat, Overrides, VoiceBackend};
use vortex_breath::display::Renderer;
use vortex_breath::{Announcer, Config, SessionController, SessionState, voice};

/// How long to let a final cue finish before exiting
const SPEECH_DRAIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Vortex - Guided vortex breathing meditation
#[derive(Parser)]
#[command(name = "vortex", version, about)]
struct Cli {
    /// Config file (default: ~/.config/vortex-breath/config.toml)
    #[arg(short, long, env = "VORTEX_CONFIG")]
    config: Option<PathBuf>,

    /// Speech backend: auto, system, cloud or none
    #[arg(long)]
    voice: Option<VoiceBackend>,

    /// Disable spoken cues
    #[arg(long)]
    mute: bool,

    /// Output format: text or json
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run one session now; Ctrl-C ends it
    Run,
    /// Start and end sessions from stdin (start, end, quit)
    Interactive,
    /// Show the breathing pattern
    Pattern,
    /// Speak a phrase through the configured voice
    TestVoice {
        /// Text to speak
        #[arg(default_value = "Inhale deeply")]
        text: String,
    },
}

/// A line typed in interactive mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start,
    End,
    Quit,
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "s" | "start" => Ok(Self::Start),
            "e" | "end" | "stop" => Ok(Self::End),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command: {other} (try start, end, quit)")),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout carries only frames
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info,vortex_breath=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let overrides = Overrides {
        config_path: cli.config,
        voice: cli.voice,
        mute: cli.mute,
        format: cli.format,
    };
    let config = Config::load(&overrides)?;
    tracing::debug!(?config, "loaded configuration");

    let renderer = Renderer::new(std::io::stdout(), config.display.format);

    match cli.command.unwrap_or(Command::Run) {
        Command::Pattern => {
            let mut renderer = renderer;
            renderer.render_pattern()?;
            Ok(())
        }
        Command::TestVoice { text } => test_voice(voice::from_config(&config.voice), &text).await,
        Command::Run => run_session(voice::from_config(&config.voice), renderer).await,
        Command::Interactive => {
            run_interactive(voice::from_config(&config.voice), renderer).await
        }
    }
}

/// Run a single session to completion or Ctrl-C
async fn run_session(
    announcer: Arc<dyn Announcer>,
    mut renderer: Renderer<Stdout>,
) -> anyhow::Result<()> {
    let mut controller = SessionController::new(Arc::clone(&announcer));
    let mut updates = controller.subscribe();

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    controller.start();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                renderer.render(&state)?;
                if state.is_complete() {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                controller.stop();
                renderer.render(&controller.snapshot())?;
                break;
            }
        }
    }

    drain_speech(announcer.as_ref()).await;
    Ok(())
}

/// Start and end sessions from stdin until quit, EOF or Ctrl-C
async fn run_interactive(
    announcer: Arc<dyn Announcer>,
    mut renderer: Renderer<Stdout>,
) -> anyhow::Result<()> {
    renderer.render_pattern()?;
    eprintln!("Commands: start, end, quit");

    let mut controller = SessionController::new(Arc::clone(&announcer));
    let mut updates = controller.subscribe();
    let mut was_running = false;
    renderer.render(&controller.snapshot())?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Action>() {
                    Ok(Action::Start) => controller.start(),
                    Ok(Action::End) => controller.stop(),
                    Ok(Action::Quit) => break,
                    Err(e) => eprintln!("{e}"),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                renderer.render(&state)?;
                if session_ended(was_running, &state) {
                    renderer.render_pattern()?;
                }
                was_running = state.running;
            }
            _ = &mut ctrl_c => break,
        }
    }

    if controller.is_running() {
        controller.stop();
        renderer.render(&controller.snapshot())?;
    }
    drain_speech(announcer.as_ref()).await;
    Ok(())
}

/// Whether a snapshot marks the end of a running session, by stop or completion
fn session_ended(was_running: bool, state: &SessionState) -> bool {
    was_running && !state.running
}

/// Speak one phrase and wait for it to finish
async fn test_voice(announcer: Arc<dyn Announcer>, text: &str) -> anyhow::Result<()> {
    println!("Speaking \"{text}\" with the {} voice", announcer.name());
    announcer.announce(text);
    drain_speech(announcer.as_ref()).await;
    Ok(())
}

/// Wait for the current utterance so exiting does not cut it off
async fn drain_speech(announcer: &dyn Announcer) {
    let wait = async {
        // Let the utterance task get scheduled before polling it
        tokio::task::yield_now().await;
        while announcer.is_speaking() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    };
    if tokio::time::timeout(SPEECH_DRAIN_TIMEOUT, wait).await.is_err() {
        tracing::warn!("speech still playing at exit, cutting it off");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_parsing() {
        assert_eq!("start".parse::<Action>(), Ok(Action::Start));
        assert_eq!(" S ".parse::<Action>(), Ok(Action::Start));
        assert_eq!("stop".parse::<Action>(), Ok(Action::End));
        assert_eq!("e".parse::<Action>(), Ok(Action::End));
        assert_eq!("quit".parse::<Action>(), Ok(Action::Quit));
        assert!("pause".parse::<Action>().is_err());
    }

    #[test]
    fn test_pattern_returns_after_session_ends() {
        let running = vortex_breath::session::machine::start().state;
        let stopped = vortex_breath::session::machine::stop().state;
        let mut complete = running.clone();
        complete.phase = vortex_breath::Phase::Complete;
        complete.running = false;

        assert!(session_ended(true, &stopped));
        assert!(session_ended(true, &complete));
        assert!(!session_ended(false, &stopped));
        assert!(!session_ended(true, &running));
        assert!(!session_ended(false, &running));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from(["vortex", "--voice", "none", "--format", "json", "pattern"])
            .unwrap();
        assert_eq!(cli.voice, Some(VoiceBackend::None));
        assert_eq!(cli.format, Some(OutputFormat::Json));
        assert!(matches!(cli.command, Some(Command::Pattern)));
    }
}
