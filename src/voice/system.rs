//! Speech through the platform's text-to-speech capability
//!
//! Linux speaks through a speech command (espeak or speech-dispatcher).
//! Other platforms use the operating system synthesizer, with a speech
//! command available as an explicit override.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use super::announcer::{Announcer, SPEECH_RATE};
#[cfg(not(target_os = "linux"))]
use super::platform::PlatformSpeech;
use super::slot::UtteranceSlot;
use crate::{Error, Result};

/// Words per minute most speech commands use by default
const NORMAL_WORDS_PER_MINUTE: f32 = 175.0;

/// Known speech commands, in discovery order
const CANDIDATES: [&str; 4] = ["espeak-ng", "espeak", "spd-say", "say"];

/// Flavour of speech command, which decides its arguments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechTool {
    /// `espeak` / `espeak-ng`
    Espeak,
    /// speech-dispatcher client
    SpdSay,
    /// macOS `say`
    Say,
    /// Any other program taking the text as its last argument
    Custom,
}

impl SpeechTool {
    /// Classify a program by its file name
    #[must_use]
    pub fn from_program(program: &Path) -> Self {
        let name = program
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        match name {
            "espeak" | "espeak-ng" => Self::Espeak,
            "spd-say" => Self::SpdSay,
            "say" => Self::Say,
            _ => Self::Custom,
        }
    }

    /// Arguments that speak `text` at the fixed slower rate
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn speak_args(self, text: &str) -> Vec<String> {
        let wpm = (NORMAL_WORDS_PER_MINUTE * SPEECH_RATE).round() as i32;
        let mut args = match self {
            Self::Espeak => vec!["-s".to_string(), wpm.to_string()],
            Self::Say => vec!["-r".to_string(), wpm.to_string()],
            // spd-say rate runs -100..100 around a normal of 0; -w keeps
            // the process alive until the speech ends
            Self::SpdSay => {
                let rate = ((SPEECH_RATE - 1.0) * 100.0).round() as i32;
                vec!["-w".to_string(), "-r".to_string(), rate.to_string()]
            }
            Self::Custom => Vec::new(),
        };
        args.push(text.to_string());
        args
    }

    /// Arguments that silence speech the tool handed off to a daemon
    #[must_use]
    pub const fn cancel_args(self) -> Option<&'static [&'static str]> {
        match self {
            Self::SpdSay => Some(&["-C"]),
            _ => None,
        }
    }
}

/// A speech command run once per utterance
#[derive(Debug)]
struct SpeechCommand {
    program: PathBuf,
    tool: SpeechTool,
    slot: UtteranceSlot,
}

impl SpeechCommand {
    fn new(program: PathBuf) -> Self {
        let tool = SpeechTool::from_program(&program);
        tracing::debug!(program = %program.display(), ?tool, "speech command selected");
        Self {
            program,
            tool,
            slot: UtteranceSlot::new(),
        }
    }

    fn command(&self, args: impl IntoIterator<Item = impl AsRef<std::ffi::OsStr>>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        cmd
    }

    fn speak(&self, text: &str) {
        // Daemon-backed tools keep talking after the client dies; silence
        // them in the same task, before the new phrase starts
        let silence = self.tool.cancel_args().map(|args| self.command(args));
        let mut speak = self.command(self.tool.speak_args(text));

        self.slot.replace_with(move |_| async move {
            if let Some(mut silence) = silence {
                let _ = silence.status().await;
            }
            match speak.spawn() {
                Ok(mut child) => {
                    if let Err(e) = child.wait().await {
                        tracing::warn!(error = %e, "speech command failed");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to spawn speech command"),
            }
        });
    }
}

#[derive(Debug)]
enum Engine {
    Command(SpeechCommand),
    #[cfg(not(target_os = "linux"))]
    Platform(PlatformSpeech),
}

/// Announcer backed by the platform's speech synthesis
#[derive(Debug)]
pub struct SystemVoice {
    engine: Engine,
}

impl SystemVoice {
    /// Find the platform synthesizer, or the first known speech command on
    /// `PATH`
    #[must_use]
    pub fn detect() -> Option<Self> {
        #[cfg(not(target_os = "linux"))]
        match PlatformSpeech::new() {
            Ok(speech) => {
                return Some(Self {
                    engine: Engine::Platform(speech),
                });
            }
            Err(e) => tracing::debug!(error = %e, "falling back to speech commands"),
        }

        CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .map(Self::from_path)
    }

    /// Use an explicit speech command
    ///
    /// # Errors
    ///
    /// Returns error if the command cannot be found
    pub fn with_command(command: &str) -> Result<Self> {
        which::which(command)
            .map(Self::from_path)
            .map_err(|e| Error::Voice(format!("speech command '{command}' not found: {e}")))
    }

    fn from_path(program: PathBuf) -> Self {
        Self {
            engine: Engine::Command(SpeechCommand::new(program)),
        }
    }

    /// Path of the speech command, when speaking through one
    #[must_use]
    pub fn program(&self) -> Option<&Path> {
        match &self.engine {
            Engine::Command(cmd) => Some(&cmd.program),
            #[cfg(not(target_os = "linux"))]
            Engine::Platform(_) => None,
        }
    }
}

impl Announcer for SystemVoice {
    fn announce(&self, text: &str) {
        tracing::debug!(text, "speaking");
        match &self.engine {
            Engine::Command(cmd) => cmd.speak(text),
            #[cfg(not(target_os = "linux"))]
            Engine::Platform(speech) => speech.speak(text),
        }
    }

    fn cancel(&self) {
        match &self.engine {
            Engine::Command(cmd) => cmd.slot.clear(),
            #[cfg(not(target_os = "linux"))]
            Engine::Platform(speech) => speech.stop(),
        }
    }

    fn is_speaking(&self) -> bool {
        match &self.engine {
            Engine::Command(cmd) => cmd.slot.is_speaking(),
            #[cfg(not(target_os = "linux"))]
            Engine::Platform(speech) => speech.is_speaking(),
        }
    }

    fn name(&self) -> &'static str {
        "system"
    }
}
