//! On-device speech synthesis through a local speech engine process.
//!
//! Each utterance is one child process (`espeak-ng`, `espeak` or macOS
//! `say`). A watcher thread reaps it and reports `Ended` or `Error`; pause
//! and resume suspend the process with `SIGSTOP` / `SIGCONT`. Like any
//! on-device synthesizer there is no seek and no progress reporting.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use hark_core::{BackendTag, PlaybackError, SignalSender, SpeechEvent, SpeechSynthesizer, Utterance};

/// How often the watcher checks whether the engine process exited.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Words per minute at rate 1.0 (espeak's own default).
const BASE_WORDS_PER_MINUTE: f32 = 175.0;

/// A located speech engine binary and how to drive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechCommand {
    /// `espeak-ng` or classic `espeak` (same CLI).
    Espeak { program: PathBuf },
    /// macOS `say`.
    Say { program: PathBuf },
}

impl SpeechCommand {
    /// Find an engine on `PATH`, preferring `espeak-ng`.
    #[must_use]
    pub fn detect() -> Option<Self> {
        for candidate in ["espeak-ng", "espeak"] {
            if let Ok(program) = which::which(candidate) {
                return Some(Self::Espeak { program });
            }
        }
        which::which("say").ok().map(|program| Self::Say { program })
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        match self {
            Self::Espeak { program } | Self::Say { program } => program,
        }
    }

    /// Command-line arguments speaking `utterance`.
    #[must_use]
    pub fn args(&self, utterance: &Utterance) -> Vec<String> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let wpm = (BASE_WORDS_PER_MINUTE * utterance.rate).round().max(1.0) as u32;

        match self {
            Self::Espeak { .. } => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0) as u32;
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let amplitude = (100.0 * utterance.volume).round().clamp(0.0, 200.0) as u32;
                vec![
                    "-v".to_string(),
                    utterance.locale.to_lowercase(),
                    "-s".to_string(),
                    wpm.to_string(),
                    "-p".to_string(),
                    pitch.to_string(),
                    "-a".to_string(),
                    amplitude.to_string(),
                    "--".to_string(),
                    utterance.text.clone(),
                ]
            }
            Self::Say { .. } => vec![
                "-r".to_string(),
                wpm.to_string(),
                "--".to_string(),
                utterance.text.clone(),
            ],
        }
    }
}

/// The utterance process currently owned by the synthesizer.
struct Running {
    child: Arc<Mutex<Child>>,
    cancelled: Arc<AtomicBool>,
    paused: bool,
    watcher: Option<thread::JoinHandle<()>>,
}

/// [`SpeechSynthesizer`] backed by a local speech engine process.
pub struct ProcessSpeechSynthesizer {
    command: SpeechCommand,
    current: Option<Running>,
    speaking: Arc<AtomicBool>,
}

impl ProcessSpeechSynthesizer {
    #[must_use]
    pub fn new(command: SpeechCommand) -> Self {
        Self {
            command,
            current: None,
            speaking: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use the first speech engine found on `PATH`.
    pub fn detect() -> Result<Self, PlaybackError> {
        let command = SpeechCommand::detect().ok_or(PlaybackError::SynthesisUnsupported)?;
        tracing::info!(program = %command.program().display(), "Using speech engine");
        Ok(Self::new(command))
    }

    #[must_use]
    pub const fn command(&self) -> &SpeechCommand {
        &self.command
    }
}

impl SpeechSynthesizer for ProcessSpeechSynthesizer {
    fn speak(
        &mut self,
        tag: BackendTag,
        utterance: Utterance,
        signals: SignalSender,
    ) -> Result<(), PlaybackError> {
        self.cancel();

        let child = Command::new(self.command.program())
            .args(self.command.args(&utterance))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                PlaybackError::SynthesisRuntime(format!(
                    "failed to start {}: {e}",
                    self.command.program().display()
                ))
            })?;

        tracing::debug!(
            pid = child.id(),
            chars = utterance.text.chars().count(),
            "Speech engine started"
        );

        let child = Arc::new(Mutex::new(child));
        let cancelled = Arc::new(AtomicBool::new(false));
        self.speaking.store(true, Ordering::SeqCst);
        signals.speech(tag, SpeechEvent::Started);

        let watcher = {
            let child = Arc::clone(&child);
            let cancelled = Arc::clone(&cancelled);
            let speaking = Arc::clone(&self.speaking);
            thread::Builder::new()
                .name("hark-speech".into())
                .spawn(move || watch(&child, &cancelled, &speaking, tag, &signals))
                .map_err(|e| {
                    PlaybackError::SynthesisRuntime(format!("failed to spawn speech watcher: {e}"))
                })
        };

        let running = Running {
            child,
            cancelled,
            paused: false,
            watcher: None,
        };
        match watcher {
            Ok(handle) => {
                self.current = Some(Running {
                    watcher: Some(handle),
                    ..running
                });
                Ok(())
            }
            Err(e) => {
                self.current = Some(running);
                self.cancel();
                Err(e)
            }
        }
    }

    fn pause(&mut self) {
        let Some(running) = self.current.as_mut() else {
            return;
        };
        if running.paused {
            return;
        }
        if suspend(&running.child, true) {
            running.paused = true;
            self.speaking.store(false, Ordering::SeqCst);
        }
    }

    fn resume(&mut self) {
        let Some(running) = self.current.as_mut() else {
            return;
        };
        if !running.paused {
            return;
        }
        if suspend(&running.child, false) {
            running.paused = false;
            self.speaking.store(true, Ordering::SeqCst);
        }
    }

    fn cancel(&mut self) {
        let Some(running) = self.current.take() else {
            return;
        };
        running.cancelled.store(true, Ordering::SeqCst);
        {
            let mut child = lock(&running.child);
            // Already exited is fine.
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(watcher) = running.watcher
            && watcher.join().is_err()
        {
            tracing::warn!("Speech watcher thread panicked");
        }
        self.speaking.store(false, Ordering::SeqCst);
        tracing::debug!("Speech cancelled");
    }

    fn is_speaking(&self) -> bool {
        self.current.as_ref().is_some_and(|r| !r.paused) && self.speaking.load(Ordering::SeqCst)
    }
}

impl Drop for ProcessSpeechSynthesizer {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reap the engine process and report how it ended, unless cancelled.
fn watch(
    child: &Mutex<Child>,
    cancelled: &AtomicBool,
    speaking: &AtomicBool,
    tag: BackendTag,
    signals: &SignalSender,
) {
    loop {
        if cancelled.load(Ordering::SeqCst) {
            return;
        }
        let status = lock(child).try_wait();
        match status {
            Ok(None) => thread::sleep(EXIT_POLL_INTERVAL),
            Ok(Some(status)) => {
                speaking.store(false, Ordering::SeqCst);
                if cancelled.load(Ordering::SeqCst) {
                    return;
                }
                if status.success() {
                    signals.speech(tag, SpeechEvent::Ended);
                } else {
                    signals.speech(
                        tag,
                        SpeechEvent::Error(format!("speech engine exited with {status}")),
                    );
                }
                return;
            }
            Err(e) => {
                speaking.store(false, Ordering::SeqCst);
                if !cancelled.load(Ordering::SeqCst) {
                    signals.speech(tag, SpeechEvent::Error(e.to_string()));
                }
                return;
            }
        }
    }
}

/// Stop (`true`) or continue (`false`) the engine process.
#[cfg(unix)]
fn suspend(child: &Mutex<Child>, stop: bool) -> bool {
    let pid = lock(child).id();
    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    let sig = if stop { Signal::SIGSTOP } else { Signal::SIGCONT };
    match signal::kill(Pid::from_raw(raw), sig) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, signal = ?sig, "Could not signal speech engine");
            false
        }
    }
}

#[cfg(not(unix))]
fn suspend(_child: &Mutex<Child>, _stop: bool) -> bool {
    tracing::warn!("Pausing speech is not supported on this platform");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utterance(text: &str) -> Utterance {
        Utterance {
            text: text.to_string(),
            locale: "en-US".to_string(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }

    #[test]
    fn espeak_args_carry_voice_parameters() {
        let command = SpeechCommand::Espeak {
            program: PathBuf::from("espeak-ng"),
        };
        let args = command.args(&utterance("-dash first"));
        assert_eq!(
            args,
            ["-v", "en-us", "-s", "175", "-p", "50", "-a", "100", "--", "-dash first"]
        );
    }

    #[test]
    fn say_args_scale_rate() {
        let command = SpeechCommand::Say {
            program: PathBuf::from("say"),
        };
        let mut u = utterance("hi");
        u.rate = 2.0;
        assert_eq!(command.args(&u), ["-r", "350", "--", "hi"]);
    }

    #[cfg(unix)]
    #[test]
    fn finished_process_reports_ended() {
        use hark_core::{BackendEvent, SessionId, signal_channel};

        let Ok(program) = which::which("true") else {
            return;
        };
        let mut synth = ProcessSpeechSynthesizer::new(SpeechCommand::Espeak { program });
        let (signals, mut rx) = signal_channel();
        let tag = BackendTag {
            session: SessionId::next(),
            generation: 1,
        };

        synth.speak(tag, utterance("hello"), signals).unwrap();

        let started = rx.blocking_recv().unwrap();
        assert_eq!(started.event, BackendEvent::Speech(SpeechEvent::Started));
        let ended = rx.blocking_recv().unwrap();
        assert_eq!(ended.tag, tag);
        assert_eq!(ended.event, BackendEvent::Speech(SpeechEvent::Ended));
    }

    #[test]
    fn cancel_without_utterance_is_noop() {
        let mut synth = ProcessSpeechSynthesizer::new(SpeechCommand::Say {
            program: PathBuf::from("say"),
        });
        synth.cancel();
        assert!(!synth.is_speaking());
    }
}
