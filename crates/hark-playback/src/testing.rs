//! In-memory fake backends for tests.
//!
//! The fakes record every call and emit backend signals on demand, so tests
//! can drive the engine through any interleaving of explicit calls and late
//! completions without audio hardware or a speech engine. Each fake comes
//! with a cloneable handle that stays usable after the fake is boxed into a
//! [`PlaybackEngine`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;

use hark_core::{
    BackendSignal, BackendTag, MediaElement, MediaEvent, PlayRejection, PlaybackError,
    ReaderEvent, SignalSender, SpeechEvent, SpeechSynthesizer, Utterance,
};

use crate::engine::PlaybackEngine;

fn lock<T>(state: &Mutex<T>) -> MutexGuard<'_, T> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Feed every pending backend signal into the engine, including signals
/// produced while handling earlier ones.
pub fn drain_signals(engine: &mut PlaybackEngine, rx: &mut mpsc::UnboundedReceiver<BackendSignal>) {
    while let Ok(signal) = rx.try_recv() {
        engine.handle_signal(signal);
    }
}

/// Collect every pending reader event.
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<ReaderEvent>) -> Vec<ReaderEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

// ── Fake media element ─────────────────────────────────────────────

/// A call made on [`FakeMedia`].
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    Attach(String),
    Retag(BackendTag),
    Play,
    Pause,
    Seek(f64),
    Detach,
}

/// How [`FakeMedia`] answers `play()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOutcome {
    /// Resolve successfully right away.
    Resolve,
    /// Reject right away.
    Reject(PlayRejection),
    /// Leave unresolved until [`FakeMediaHandle::resolve_play`].
    Defer,
}

#[derive(Debug)]
struct MediaState {
    tag: Option<BackendTag>,
    signals: Option<SignalSender>,
    url: Option<String>,
    position: f64,
    duration: Option<f64>,
    playing: bool,
    outcome: PlayOutcome,
    attach_error: Option<PlaybackError>,
    calls: Vec<MediaCall>,
}

impl MediaState {
    fn emit(&self, event: MediaEvent) {
        if let (Some(signals), Some(tag)) = (&self.signals, self.tag) {
            signals.media(tag, event);
        }
    }
}

/// Fake [`MediaElement`].
#[derive(Debug)]
pub struct FakeMedia {
    state: Arc<Mutex<MediaState>>,
}

/// Test-side handle to a [`FakeMedia`].
#[derive(Debug, Clone)]
pub struct FakeMediaHandle {
    state: Arc<Mutex<MediaState>>,
}

impl FakeMedia {
    /// A media element whose files report no duration until
    /// [`FakeMediaHandle::load_metadata`].
    #[must_use]
    pub fn new() -> (Self, FakeMediaHandle) {
        Self::build(None)
    }

    /// A media element whose files report `duration` seconds on attach.
    #[must_use]
    pub fn with_duration(duration: f64) -> (Self, FakeMediaHandle) {
        Self::build(Some(duration))
    }

    fn build(duration: Option<f64>) -> (Self, FakeMediaHandle) {
        let state = Arc::new(Mutex::new(MediaState {
            tag: None,
            signals: None,
            url: None,
            position: 0.0,
            duration,
            playing: false,
            outcome: PlayOutcome::Resolve,
            attach_error: None,
            calls: Vec::new(),
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            FakeMediaHandle { state },
        )
    }
}

impl MediaElement for FakeMedia {
    fn attach(
        &mut self,
        tag: BackendTag,
        url: &str,
        signals: SignalSender,
    ) -> Result<(), PlaybackError> {
        let mut state = lock(&self.state);
        state.calls.push(MediaCall::Attach(url.to_string()));
        if let Some(err) = state.attach_error.take() {
            return Err(err);
        }
        state.tag = Some(tag);
        state.signals = Some(signals);
        state.url = Some(url.to_string());
        state.position = 0.0;
        state.playing = false;
        if let Some(duration) = state.duration {
            state.emit(MediaEvent::LoadedMetadata { duration });
        }
        Ok(())
    }

    fn retag(&mut self, tag: BackendTag) {
        let mut state = lock(&self.state);
        state.calls.push(MediaCall::Retag(tag));
        state.tag = Some(tag);
    }

    fn play(&mut self) {
        let mut state = lock(&self.state);
        state.calls.push(MediaCall::Play);
        match state.outcome.clone() {
            PlayOutcome::Resolve => {
                state.playing = true;
                state.emit(MediaEvent::PlayResolved(Ok(())));
            }
            PlayOutcome::Reject(rejection) => {
                state.emit(MediaEvent::PlayResolved(Err(rejection)));
            }
            PlayOutcome::Defer => {}
        }
    }

    fn pause(&mut self) {
        let mut state = lock(&self.state);
        state.calls.push(MediaCall::Pause);
        state.playing = false;
    }

    fn seek_to(&mut self, seconds: f64) {
        let mut state = lock(&self.state);
        state.calls.push(MediaCall::Seek(seconds));
        let upper = state.duration.unwrap_or(f64::INFINITY);
        state.position = seconds.clamp(0.0, upper);
    }

    fn current_time(&self) -> f64 {
        lock(&self.state).position
    }

    fn duration(&self) -> Option<f64> {
        let state = lock(&self.state);
        state.url.as_ref().and(state.duration)
    }

    fn detach(&mut self) {
        let mut state = lock(&self.state);
        state.calls.push(MediaCall::Detach);
        state.tag = None;
        state.signals = None;
        state.url = None;
        state.playing = false;
        state.position = 0.0;
    }

    fn is_active(&self) -> bool {
        lock(&self.state).playing
    }
}

impl FakeMediaHandle {
    pub fn set_play_outcome(&self, outcome: PlayOutcome) {
        lock(&self.state).outcome = outcome;
    }

    /// Make the next `attach` fail with `error`.
    pub fn fail_next_attach(&self, error: PlaybackError) {
        lock(&self.state).attach_error = Some(error);
    }

    #[must_use]
    pub fn calls(&self) -> Vec<MediaCall> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        lock(&self.state).playing
    }

    #[must_use]
    pub fn position(&self) -> f64 {
        lock(&self.state).position
    }

    #[must_use]
    pub fn url(&self) -> Option<String> {
        lock(&self.state).url.clone()
    }

    #[must_use]
    pub fn current_tag(&self) -> Option<BackendTag> {
        lock(&self.state).tag
    }

    /// Resolve a deferred `play()`.
    pub fn resolve_play(&self, result: Result<(), PlayRejection>) {
        let mut state = lock(&self.state);
        state.playing = result.is_ok();
        state.emit(MediaEvent::PlayResolved(result));
    }

    /// Finish loading the file late: learn its duration and report it.
    pub fn load_metadata(&self, duration: f64) {
        let mut state = lock(&self.state);
        state.duration = Some(duration);
        state.emit(MediaEvent::LoadedMetadata { duration });
    }

    /// Move the playhead without reporting it.
    pub fn set_position(&self, seconds: f64) {
        lock(&self.state).position = seconds;
    }

    /// Report playback at `seconds`.
    pub fn time_update(&self, seconds: f64) {
        let mut state = lock(&self.state);
        state.position = seconds;
        state.emit(MediaEvent::TimeUpdate {
            current_time: seconds,
        });
    }

    /// Play to the end of the file.
    pub fn end(&self) {
        let mut state = lock(&self.state);
        state.playing = false;
        if let Some(duration) = state.duration {
            state.position = duration;
        }
        state.emit(MediaEvent::Ended);
    }

    /// Report a network/decode failure.
    pub fn error(&self, message: &str) {
        let mut state = lock(&self.state);
        state.playing = false;
        state.emit(MediaEvent::Error(message.to_string()));
    }
}

// ── Fake speech synthesizer ────────────────────────────────────────

/// A call made on [`FakeSpeech`].
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechCall {
    Speak(Utterance),
    Pause,
    Resume,
    Cancel,
}

/// How [`FakeSpeech`] answers `speak()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Emit `Started` right away.
    Start,
    /// Stay queued until [`FakeSpeechHandle::start`].
    Defer,
    /// Return a synchronous error.
    Fail,
}

#[derive(Debug)]
struct SpeechState {
    tag: Option<BackendTag>,
    signals: Option<SignalSender>,
    speaking: bool,
    paused: bool,
    outcome: SpeechOutcome,
    calls: Vec<SpeechCall>,
}

impl SpeechState {
    fn emit(&self, event: SpeechEvent) {
        if let (Some(signals), Some(tag)) = (&self.signals, self.tag) {
            signals.speech(tag, event);
        }
    }
}

/// Fake [`SpeechSynthesizer`].
#[derive(Debug)]
pub struct FakeSpeech {
    state: Arc<Mutex<SpeechState>>,
}

/// Test-side handle to a [`FakeSpeech`].
#[derive(Debug, Clone)]
pub struct FakeSpeechHandle {
    state: Arc<Mutex<SpeechState>>,
}

impl FakeSpeech {
    #[must_use]
    pub fn new() -> (Self, FakeSpeechHandle) {
        let state = Arc::new(Mutex::new(SpeechState {
            tag: None,
            signals: None,
            speaking: false,
            paused: false,
            outcome: SpeechOutcome::Start,
            calls: Vec::new(),
        }));
        (
            Self {
                state: Arc::clone(&state),
            },
            FakeSpeechHandle { state },
        )
    }
}

impl SpeechSynthesizer for FakeSpeech {
    fn speak(
        &mut self,
        tag: BackendTag,
        utterance: Utterance,
        signals: SignalSender,
    ) -> Result<(), PlaybackError> {
        let mut state = lock(&self.state);
        state.calls.push(SpeechCall::Speak(utterance));
        if state.outcome == SpeechOutcome::Fail {
            return Err(PlaybackError::SynthesisRuntime("fake speak failure".into()));
        }
        state.tag = Some(tag);
        state.signals = Some(signals);
        state.paused = false;
        if state.outcome == SpeechOutcome::Start {
            state.speaking = true;
            state.emit(SpeechEvent::Started);
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = lock(&self.state);
        state.calls.push(SpeechCall::Pause);
        state.paused = true;
    }

    fn resume(&mut self) {
        let mut state = lock(&self.state);
        state.calls.push(SpeechCall::Resume);
        state.paused = false;
    }

    fn cancel(&mut self) {
        let mut state = lock(&self.state);
        state.calls.push(SpeechCall::Cancel);
        state.tag = None;
        state.speaking = false;
        state.paused = false;
    }

    fn is_speaking(&self) -> bool {
        let state = lock(&self.state);
        state.speaking && !state.paused
    }
}

impl FakeSpeechHandle {
    pub fn set_outcome(&self, outcome: SpeechOutcome) {
        lock(&self.state).outcome = outcome;
    }

    #[must_use]
    pub fn calls(&self) -> Vec<SpeechCall> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    /// Every utterance passed to `speak`, oldest first.
    #[must_use]
    pub fn utterances(&self) -> Vec<Utterance> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|call| match call {
                SpeechCall::Speak(u) => Some(u.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn last_utterance(&self) -> Option<Utterance> {
        self.utterances().pop()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        lock(&self.state).paused
    }

    #[must_use]
    pub fn current_tag(&self) -> Option<BackendTag> {
        lock(&self.state).tag
    }

    /// Start a deferred utterance.
    pub fn start(&self) {
        let mut state = lock(&self.state);
        state.speaking = true;
        state.emit(SpeechEvent::Started);
    }

    /// Finish the current utterance.
    pub fn finish(&self) {
        let mut state = lock(&self.state);
        state.speaking = false;
        state.emit(SpeechEvent::Ended);
    }

    /// Fail the current utterance.
    pub fn error(&self, message: &str) {
        let mut state = lock(&self.state);
        state.speaking = false;
        state.emit(SpeechEvent::Error(message.to_string()));
    }

    /// Emit `event` with an explicit tag (for stale-signal tests).
    pub fn emit_with_tag(&self, tag: BackendTag, event: SpeechEvent) {
        let state = lock(&self.state);
        if let Some(signals) = &state.signals {
            signals.speech(tag, event);
        }
    }
}
