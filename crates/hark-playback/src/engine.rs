//! Playback engine: one control surface over streamed audio and synthesized speech.
//!
//! The engine owns the active [`NarrationSession`], the single media element
//! and the single speech synthesizer. It is the only component allowed to
//! start audio.
//!
//! ```text
//!   Idle → Starting/Unlocking → Playing ⇄ Paused → Stopped
//!                  │                 │
//!                  └──→ Errored      └──→ Stopped (natural end, 100 %)
//! ```
//!
//! Backend completions arrive later as [`BackendSignal`]s. Each carries the
//! [`BackendTag`] of the run that produced it; the generation is bumped on
//! every stop, completion, failure and speech restart, so a late callback
//! from a superseded run is dropped instead of applied. The media element is
//! retagged on every bump so its later signals (metadata in particular)
//! still reach the engine.
//!
//! A streamed seek does not bump the generation, because a `play()` may be in
//! flight. Instead it fences media time updates until the element reports
//! the seek target.

use std::time::Duration;

use tokio::sync::mpsc;

use hark_core::{
    BackendEvent, BackendSignal, BackendTag, EventSink, MediaElement, MediaEvent, NarrationMode,
    NarrationSession, NarrationSource, PlayRejection, PlaybackError, PlaybackState, Progress,
    ReaderEvent, Settings, SignalSender, SpeechEvent, SpeechSettings, SpeechSynthesizer,
    Utterance, signal_channel,
};

use crate::progress::ProgressTimer;
use crate::rate::SpeechRate;

/// How far past a seek target the first accepted media time update may be.
const SEEK_SETTLE_WINDOW_SECS: f64 = 1.0;

/// Rounding slack below a seek target.
const SEEK_TARGET_EPSILON: f64 = 1e-3;

// ── Configuration ──────────────────────────────────────────────────

/// Engine tuning, derived from [`Settings`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Voice parameters and the chars-per-second estimate.
    pub speech: SpeechSettings,

    /// Step of [`PlaybackEngine::seek_forward`] / [`PlaybackEngine::seek_backward`].
    pub seek_step_secs: f64,

    /// Interval at which the caller drives [`PlaybackEngine::tick`].
    pub tick_interval: Duration,
}

impl EngineConfig {
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            speech: settings.speech.clone(),
            seek_step_secs: settings.seek_step_secs,
            tick_interval: Duration::from_millis(settings.tick_interval_ms),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

// ── Active session bookkeeping ─────────────────────────────────────

/// Lifecycle of the current utterance (synthesized speech only).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UtterancePhase {
    /// Nothing queued.
    None,
    /// `speak` issued, `Started` not yet seen.
    Queued,
    /// Audibly speaking (or paused mid-utterance).
    Started,
}

#[derive(Debug)]
struct ActiveSession {
    session: NarrationSession,
    state: PlaybackState,
    generation: u32,
    current_time: f64,
    duration: Option<f64>,
    phase: UtterancePhase,
    /// Characters in the narration text.
    char_count: usize,
    /// The utterance started at char 0 and has not been paused or seeked.
    uninterrupted: bool,
    /// Seconds counted by ticks for the current utterance.
    spoken_secs: f64,
    /// Streamed seek target not yet reported back by the media element.
    seek_fence: Option<f64>,
}

impl ActiveSession {
    fn new(session: NarrationSession) -> Self {
        let char_count = match session.source() {
            NarrationSource::SynthesizedSpeech { text } => text.chars().count(),
            NarrationSource::StreamedAudio { .. } => 0,
        };
        Self {
            session,
            state: PlaybackState::Idle,
            generation: 0,
            current_time: 0.0,
            duration: None,
            phase: UtterancePhase::None,
            char_count,
            uninterrupted: false,
            spoken_secs: 0.0,
            seek_fence: None,
        }
    }

    const fn tag(&self) -> BackendTag {
        BackendTag {
            session: self.session.id(),
            generation: self.generation,
        }
    }

    const fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn progress(&self) -> Progress {
        Progress::new(self.current_time, self.duration)
    }

    /// Whether a media time update may move the position.
    fn accepts_time_update(&mut self, current_time: f64) -> bool {
        if matches!(
            self.state,
            PlaybackState::Idle | PlaybackState::Stopped | PlaybackState::Errored
        ) {
            return false;
        }
        let Some(target) = self.seek_fence else {
            return true;
        };
        if current_time < target - SEEK_TARGET_EPSILON
            || current_time > target + SEEK_SETTLE_WINDOW_SECS
        {
            return false;
        }
        self.seek_fence = None;
        true
    }
}

// ── Engine ─────────────────────────────────────────────────────────

/// Unified narration playback engine.
///
/// Explicit calls (`start`, `pause`, `seek`, `stop`, ...) are applied in call
/// order. Telemetry ([`tick`](Self::tick) and media time updates) is
/// best-effort and never overrides a more recent explicit call.
pub struct PlaybackEngine {
    /// Streamed-audio backend (process-wide, reused across sessions).
    media: Box<dyn MediaElement>,

    /// Speech backend, `None` on devices without a synthesis engine.
    speech: Option<Box<dyn SpeechSynthesizer>>,

    config: EngineConfig,

    rate: SpeechRate,

    /// Drives synthesized-speech progress.
    timer: ProgressTimer,

    events: EventSink,

    /// Handed to backends for their asynchronous completions.
    signals: SignalSender,

    active: Option<ActiveSession>,
}

impl PlaybackEngine {
    /// Create an engine over the given backends.
    ///
    /// Returns the engine and the receiver of backend signals, which the
    /// caller feeds back through [`handle_signal`](Self::handle_signal).
    #[must_use]
    pub fn new(
        media: Box<dyn MediaElement>,
        speech: Option<Box<dyn SpeechSynthesizer>>,
        config: EngineConfig,
        events: EventSink,
    ) -> (Self, mpsc::UnboundedReceiver<BackendSignal>) {
        let (signals, signal_rx) = signal_channel();
        let rate = SpeechRate::new(config.speech.chars_per_second, config.speech.calibrate_rate);
        let timer = ProgressTimer::new(config.tick_interval);

        if speech.is_none() {
            tracing::info!("No speech synthesizer available; text narration disabled");
        }

        let engine = Self {
            media,
            speech,
            config,
            rate,
            timer,
            events,
            signals,
            active: None,
        };

        (engine, signal_rx)
    }

    // ── Queries ────────────────────────────────────────────────────

    /// State of the active session, `None` when nothing is loaded.
    #[must_use]
    pub fn state(&self) -> Option<PlaybackState> {
        self.active.as_ref().map(|a| a.state)
    }

    /// Progress of the active session (zero when nothing is loaded).
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.active
            .as_ref()
            .map_or_else(Progress::default, ActiveSession::progress)
    }

    #[must_use]
    pub fn session(&self) -> Option<&NarrationSession> {
        self.active.as_ref().map(|a| &a.session)
    }

    #[must_use]
    pub fn mode(&self) -> Option<NarrationMode> {
        self.session().map(NarrationSession::mode)
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Current chars-per-second estimate (after any calibration).
    #[must_use]
    pub const fn chars_per_second(&self) -> f64 {
        self.rate.chars_per_second()
    }

    /// Number of backends producing audio right now. Never more than one.
    #[must_use]
    pub fn active_backend_count(&self) -> usize {
        let media = usize::from(self.media.is_active());
        let speech = self
            .speech
            .as_ref()
            .map_or(0, |s| usize::from(s.is_speaking()));
        media + speech
    }

    // ── Session lifecycle ──────────────────────────────────────────

    /// Make `session` the active session, releasing the previous one first.
    pub fn load(&mut self, session: NarrationSession) {
        self.unload();

        tracing::info!(
            session = %session.id(),
            mode = ?session.mode(),
            title = session.title(),
            "Loading narration session"
        );

        let url = match session.source() {
            NarrationSource::StreamedAudio { url } => Some(url.clone()),
            NarrationSource::SynthesizedSpeech { .. } => None,
        };
        let active = ActiveSession::new(session);
        let tag = active.tag();
        let session_id = active.session.id();
        self.active = Some(active);

        self.events.emit(ReaderEvent::StateChanged {
            session: session_id,
            state: PlaybackState::Idle,
        });
        self.emit_progress();

        match url {
            Some(url) => {
                if let Err(e) = self.media.attach(tag, &url, self.signals.clone()) {
                    self.fail(e);
                }
            }
            None if self.speech.is_none() => self.fail(PlaybackError::SynthesisUnsupported),
            None => {}
        }
    }

    /// Tear down the active session: cancel the utterance or detach the
    /// media, clear the timer. Safe to call with nothing loaded.
    pub fn unload(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        self.timer.disarm();
        match active.session.mode() {
            NarrationMode::StreamedAudio => self.media.detach(),
            NarrationMode::SynthesizedSpeech => {
                if let Some(speech) = self.speech.as_mut() {
                    speech.cancel();
                }
            }
        }

        tracing::debug!(session = %active.session.id(), "Unloaded narration session");
    }

    // ── Transport ──────────────────────────────────────────────────

    /// Start the active session at `at` seconds.
    ///
    /// Ignored while already starting or playing, and for errored sessions.
    /// A stopped session is renewed (new id) and started again.
    pub fn start(&mut self, at: f64) {
        self.begin(at, PlaybackState::Starting);
    }

    /// Start or resume from inside a user gesture. Used by the unlock gate.
    ///
    /// Returns the resulting state.
    pub fn start_from_gesture(&mut self) -> Option<PlaybackState> {
        let (state, at) = self.active.as_ref().map(|a| (a.state, a.current_time))?;
        match state {
            PlaybackState::Paused => self.resume_as(PlaybackState::Unlocking),
            PlaybackState::Idle | PlaybackState::Stopped => {
                self.begin(at, PlaybackState::Unlocking);
            }
            _ => {
                tracing::debug!(state = ?state, "Gesture start ignored");
            }
        }
        self.state()
    }

    /// Pause the active session. No-op unless starting or playing.
    pub fn pause(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if !active.state.is_active() {
            tracing::debug!(state = ?active.state, "Pause ignored");
            return;
        }

        let mut moved = false;
        match active.session.mode() {
            NarrationMode::StreamedAudio => {
                self.media.pause();
                // Time updates lag the playhead; pause where the element is.
                let at = self.media.current_time();
                if at.is_finite() && active.seek_fence.is_none() {
                    let at = active.duration.map_or(at.max(0.0), |d| at.clamp(0.0, d));
                    moved = (at - active.current_time).abs() > f64::EPSILON;
                    active.current_time = at;
                }
            }
            NarrationMode::SynthesizedSpeech => {
                if active.phase != UtterancePhase::None
                    && let Some(speech) = self.speech.as_mut()
                {
                    speech.pause();
                }
            }
        }
        active.uninterrupted = false;
        self.timer.disarm();
        self.set_state(PlaybackState::Paused);
        if moved {
            self.emit_progress();
        }
    }

    /// Resume a paused session. No-op in any other state.
    pub fn resume(&mut self) {
        self.resume_as(PlaybackState::Starting);
    }

    /// Halt the backend, rewind to 0 and mark the session `Stopped`.
    ///
    /// Idempotent: stopping a stopped (or errored) session, or stopping with
    /// nothing loaded, emits nothing.
    pub fn stop(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.state.is_terminal() {
            return;
        }

        match active.session.mode() {
            NarrationMode::StreamedAudio => {
                self.media.pause();
                self.media.seek_to(0.0);
            }
            NarrationMode::SynthesizedSpeech => {
                if let Some(speech) = self.speech.as_mut() {
                    speech.cancel();
                }
            }
        }

        active.phase = UtterancePhase::None;
        active.current_time = 0.0;
        active.uninterrupted = false;
        let session = active.session.id();
        self.timer.disarm();
        self.bump_generation();

        tracing::info!(session = %session, "Narration stopped");
        self.set_state(PlaybackState::Stopped);
        self.emit_progress();
    }

    /// Play if paused, idle or stopped; pause if starting or playing.
    pub fn toggle(&mut self) {
        let Some((state, at)) = self.active.as_ref().map(|a| (a.state, a.current_time)) else {
            return;
        };
        match state {
            PlaybackState::Playing | PlaybackState::Starting | PlaybackState::Unlocking => {
                self.pause();
            }
            PlaybackState::Paused => self.resume(),
            PlaybackState::Idle | PlaybackState::Stopped => self.start(at),
            PlaybackState::Errored => {
                tracing::debug!("Toggle ignored on errored session");
            }
        }
    }

    /// Relative seek, clamped to `[0, duration]`.
    ///
    /// Streamed audio seeks natively. Synthesized speech restarts the
    /// utterance from the matching character offset when playing; when
    /// paused or stopped only the position is recorded.
    pub fn seek(&mut self, delta_secs: f64) {
        if !delta_secs.is_finite() {
            return;
        }
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if active.state == PlaybackState::Errored {
            return;
        }

        let state = active.state;
        let phase = active.phase;
        let mode = active.session.mode();
        let duration = self.effective_duration();
        let mut target = (active.current_time + delta_secs).max(0.0);
        if let Some(d) = duration {
            target = target.min(d);
        }

        tracing::debug!(from = active.current_time, to = target, ?state, "Seeking");

        match mode {
            NarrationMode::StreamedAudio => {
                if let Some(active) = self.active.as_mut()
                    && (state.is_active() || state == PlaybackState::Paused)
                {
                    active.seek_fence = Some(target);
                }
                self.media.seek_to(target);
            }
            NarrationMode::SynthesizedSpeech if state.is_active() => {
                if duration.is_some_and(|d| target >= d) {
                    self.complete();
                    return;
                }
                if let Err(e) = self.speak_from(target) {
                    self.fail(e);
                    return;
                }
            }
            NarrationMode::SynthesizedSpeech => {
                if state == PlaybackState::Paused && phase != UtterancePhase::None {
                    if let Some(speech) = self.speech.as_mut() {
                        speech.cancel();
                    }
                    if let Some(active) = self.active.as_mut() {
                        active.bump_generation();
                        active.phase = UtterancePhase::None;
                    }
                }
            }
        }

        if let Some(active) = self.active.as_mut() {
            active.current_time = target;
            active.uninterrupted = false;
        }
        self.emit_progress();
    }

    pub fn seek_forward(&mut self) {
        self.seek(self.config.seek_step_secs);
    }

    pub fn seek_backward(&mut self) {
        self.seek(-self.config.seek_step_secs);
    }

    // ── Telemetry ──────────────────────────────────────────────────

    /// Advance synthesized-speech progress by one tick.
    ///
    /// Only counts while the timer is armed for the current utterance.
    pub fn tick(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if !self.timer.is_armed_for(active.tag()) {
            return;
        }

        let step = self.timer.step_secs();
        let next = active.current_time + step;
        active.current_time = active.duration.map_or(next, |d| next.min(d));
        active.spoken_secs += step;
        self.emit_progress();
    }

    /// Apply a backend completion. Signals from superseded runs are dropped.
    pub fn handle_signal(&mut self, signal: BackendSignal) {
        let Some(active) = self.active.as_ref() else {
            tracing::debug!(tag = ?signal.tag, "Dropping backend signal: no active session");
            return;
        };
        if signal.tag != active.tag() {
            tracing::debug!(
                tag = ?signal.tag,
                current = ?active.tag(),
                "Dropping stale backend signal"
            );
            return;
        }

        match signal.event {
            BackendEvent::Media(event) => self.on_media_event(event),
            BackendEvent::Speech(event) => self.on_speech_event(event),
        }
    }

    fn on_media_event(&mut self, event: MediaEvent) {
        self.sync_media_duration();
        let Some(active) = self.active.as_mut() else {
            return;
        };

        match event {
            MediaEvent::LoadedMetadata { duration } => {
                active.duration = Some(duration).filter(|d| d.is_finite() && *d > 0.0);
                self.emit_progress();
            }
            MediaEvent::TimeUpdate { current_time } => {
                if !current_time.is_finite() {
                    return;
                }
                if !active.accepts_time_update(current_time) {
                    tracing::trace!(
                        current_time,
                        fence = ?active.seek_fence,
                        state = ?active.state,
                        "Dropping media time update"
                    );
                    return;
                }
                active.current_time = current_time.max(0.0);
                self.emit_progress();
            }
            MediaEvent::PlayResolved(Ok(())) => match active.state {
                PlaybackState::Starting | PlaybackState::Unlocking => {
                    self.set_state(PlaybackState::Playing);
                }
                PlaybackState::Paused | PlaybackState::Stopped => {
                    // Paused or stopped while the play request was in flight.
                    self.media.pause();
                }
                _ => {}
            },
            MediaEvent::PlayResolved(Err(PlayRejection::NotAllowed)) => {
                self.fail(PlaybackError::PermissionDenied);
            }
            MediaEvent::PlayResolved(Err(PlayRejection::Failed(reason)))
            | MediaEvent::Error(reason) => {
                self.fail(PlaybackError::MediaLoad(reason));
            }
            MediaEvent::Ended => self.complete(),
        }
    }

    fn on_speech_event(&mut self, event: SpeechEvent) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        match event {
            SpeechEvent::Started => {
                active.phase = UtterancePhase::Started;
                if active.state.is_active() {
                    self.timer.arm(active.tag());
                    self.set_state(PlaybackState::Playing);
                } else if active.state == PlaybackState::Paused
                    && let Some(speech) = self.speech.as_mut()
                {
                    // Paused while the utterance was queued.
                    speech.pause();
                }
            }
            SpeechEvent::Ended => {
                if active.uninterrupted {
                    self.rate.observe(active.char_count, active.spoken_secs);
                }
                self.complete();
            }
            SpeechEvent::Error(reason) => {
                self.fail(PlaybackError::SynthesisRuntime(reason));
            }
        }
    }

    // ── Internals ──────────────────────────────────────────────────

    fn begin(&mut self, at: f64, pending: PlaybackState) {
        let Some(state) = self.state() else {
            tracing::debug!("Start ignored: no session loaded");
            return;
        };
        match state {
            PlaybackState::Errored => {
                tracing::debug!("Start ignored on errored session");
                return;
            }
            s if s.is_active() => {
                tracing::debug!(state = ?s, "Start ignored: already starting or playing");
                return;
            }
            PlaybackState::Stopped => self.renew(),
            _ => {}
        }

        self.sync_media_duration();
        let duration = self.effective_duration();
        let mut at = if at.is_finite() { at.max(0.0) } else { 0.0 };
        if duration.is_some_and(|d| at >= d) {
            at = 0.0;
        }

        let Some(active) = self.active.as_mut() else {
            return;
        };
        tracing::info!(session = %active.session.id(), at, "Starting narration");

        match active.session.mode() {
            NarrationMode::StreamedAudio => {
                active.current_time = at;
                active.seek_fence = None;
                self.media.retag(active.tag());
                self.media.seek_to(at);
                self.set_state(pending);
                self.emit_progress();
                self.media.play();
            }
            NarrationMode::SynthesizedSpeech => {
                self.set_state(pending);
                match self.speak_from(at) {
                    Ok(()) => self.emit_progress(),
                    Err(e) => self.fail(e),
                }
            }
        }
    }

    fn resume_as(&mut self, pending: PlaybackState) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if active.state != PlaybackState::Paused {
            tracing::debug!(state = ?active.state, "Resume ignored");
            return;
        }
        let tag = active.tag();
        let phase = active.phase;
        let at = active.current_time;

        match active.session.mode() {
            NarrationMode::StreamedAudio => {
                self.media.retag(tag);
                self.set_state(pending);
                self.media.play();
            }
            NarrationMode::SynthesizedSpeech => match phase {
                UtterancePhase::Started => {
                    if let Some(speech) = self.speech.as_mut() {
                        speech.resume();
                    }
                    self.timer.arm(tag);
                    self.set_state(PlaybackState::Playing);
                }
                UtterancePhase::Queued => {
                    if let Some(speech) = self.speech.as_mut() {
                        speech.resume();
                    }
                    self.set_state(pending);
                }
                UtterancePhase::None => self.begin(at, pending),
            },
        }
    }

    /// Replace a stopped session with a fresh one over the same source.
    fn renew(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let renewed = active.session.renewed();
        tracing::info!(
            old = %active.session.id(),
            new = %renewed.id(),
            "Renewing stopped session"
        );

        active.session = renewed;
        active.state = PlaybackState::Idle;
        active.generation = 0;
        active.phase = UtterancePhase::None;
        active.uninterrupted = false;
        active.spoken_secs = 0.0;
        active.seek_fence = None;
    }

    /// Cancel any utterance and speak the narration from `at` seconds.
    ///
    /// Keeps the session state; `Started` arms the timer.
    fn speak_from(&mut self, at: f64) -> Result<(), PlaybackError> {
        let Some(active) = self.active.as_mut() else {
            return Ok(());
        };
        let NarrationSource::SynthesizedSpeech { text } = active.session.source() else {
            return Ok(());
        };
        let Some(speech) = self.speech.as_mut() else {
            return Err(PlaybackError::SynthesisUnsupported);
        };

        let offset = self.rate.char_offset(text, at);
        let utterance = Utterance {
            text: text[offset..].to_string(),
            locale: self.config.speech.locale.clone(),
            rate: self.config.speech.rate,
            pitch: self.config.speech.pitch,
            volume: self.config.speech.volume,
        };

        speech.cancel();
        self.timer.disarm();

        active.bump_generation();
        active.duration = Some(self.rate.estimate_duration(active.char_count));
        active.current_time = at;
        active.phase = UtterancePhase::Queued;
        active.uninterrupted = offset == 0;
        active.spoken_secs = 0.0;

        tracing::debug!(
            session = %active.session.id(),
            generation = active.generation,
            offset,
            at,
            "Speaking narration"
        );
        speech.speak(active.tag(), utterance, self.signals.clone())
    }

    /// Natural end (or a seek to the end): `Stopped` at 100 %.
    fn complete(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };

        if active.session.mode() == NarrationMode::SynthesizedSpeech
            && active.phase != UtterancePhase::None
            && let Some(speech) = self.speech.as_mut()
        {
            speech.cancel();
        }

        let duration = active
            .duration
            .or_else(|| self.media.duration())
            .filter(|d| d.is_finite() && *d > 0.0)
            .or_else(|| Some(active.current_time).filter(|t| *t > 0.0));
        active.duration = duration;
        if let Some(d) = duration {
            active.current_time = d;
        }
        active.phase = UtterancePhase::None;
        let session = active.session.id();
        self.timer.disarm();
        self.bump_generation();

        tracing::info!(session = %session, "Narration finished");
        self.set_state(PlaybackState::Stopped);
        self.emit_progress();
    }

    /// Translate a backend error into a state, a log record and an event.
    fn fail(&mut self, error: PlaybackError) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let session = active.session.id();
        let recoverable = error.is_recoverable();

        if recoverable {
            tracing::warn!(session = %session, error = %error, "Playback interrupted");
        } else {
            tracing::error!(session = %session, error = %error, "Playback failed");
        }

        active.phase = UtterancePhase::None;
        active.uninterrupted = false;
        let streamed = active.session.mode() == NarrationMode::StreamedAudio;
        self.timer.disarm();
        self.bump_generation();

        if !recoverable && streamed {
            self.media.pause();
        }

        self.events.emit(ReaderEvent::PlaybackFailed {
            session,
            kind: error.kind(),
            recoverable,
            message: error.to_string(),
        });

        self.set_state(if recoverable {
            PlaybackState::Paused
        } else {
            PlaybackState::Errored
        });
    }

    /// Supersede the current run. The media element follows the new tag.
    fn bump_generation(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        active.bump_generation();
        active.seek_fence = None;
        if active.session.mode() == NarrationMode::StreamedAudio {
            self.media.retag(active.tag());
        }
        tracing::debug!(
            session = %active.session.id(),
            generation = active.generation,
            "Generation bumped"
        );
    }

    /// Adopt the element's duration when its metadata signal was superseded.
    fn sync_media_duration(&mut self) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.duration.is_some() || active.session.mode() != NarrationMode::StreamedAudio {
            return;
        }
        if let Some(duration) = self.media.duration().filter(|d| d.is_finite() && *d > 0.0) {
            tracing::debug!(duration, "Duration taken from media element");
            active.duration = Some(duration);
        }
    }

    /// Known duration, falling back to the media element or the speech estimate.
    fn effective_duration(&self) -> Option<f64> {
        let active = self.active.as_ref()?;
        active
            .duration
            .or_else(|| match active.session.mode() {
                NarrationMode::StreamedAudio => self.media.duration(),
                NarrationMode::SynthesizedSpeech => {
                    Some(self.rate.estimate_duration(active.char_count))
                }
            })
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    fn set_state(&mut self, new: PlaybackState) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        if active.state == new {
            return;
        }
        let old = std::mem::replace(&mut active.state, new);
        tracing::debug!(session = %active.session.id(), ?old, ?new, "Playback state changed");
        self.events.emit(ReaderEvent::StateChanged {
            session: active.session.id(),
            state: new,
        });
    }

    fn emit_progress(&self) {
        if let Some(active) = &self.active {
            self.events.emit(ReaderEvent::Progress {
                session: active.session.id(),
                progress: active.progress(),
            });
        }
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.unload();
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("active", &self.active)
            .field("chars_per_second", &self.rate.chars_per_second())
            .finish_non_exhaustive()
    }
}
