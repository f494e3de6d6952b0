//! Page-level controller.
//!
//! Ties the three independent parts of the reader together. The navigator
//! decides which card is visible, the engine narrates it and the gate says
//! whether narration may start without a tap. The controller is the only
//! place where a card change turns into a playback change.

use std::time::Instant;

use hark_core::{
    BackendSignal, ContentCard, ContentError, ContentSource, EventSink, NarrationSession,
    PlaybackState, ReaderEvent,
};
use hark_nav::{Direction, GestureNavigator, IndexChange, WheelDisposition, WheelInput};
use hark_playback::{AutoplayUnlockGate, PlaybackEngine, UnlockOutcome};

use crate::input::UiInput;

/// One reader page: a card list, its navigator and its narration engine.
pub struct ReaderController {
    cards: Vec<ContentCard>,
    engine: PlaybackEngine,
    navigator: GestureNavigator,
    gate: AutoplayUnlockGate,
    auto_start: bool,
    events: EventSink,
}

impl ReaderController {
    /// Create a controller showing the first card. Nothing is loaded until
    /// [`open`](Self::open) is called.
    pub fn new(
        cards: Vec<ContentCard>,
        engine: PlaybackEngine,
        gate: AutoplayUnlockGate,
        auto_start: bool,
        events: EventSink,
    ) -> Self {
        let navigator = GestureNavigator::new(cards.len());
        Self {
            cards,
            engine,
            navigator,
            gate,
            auto_start,
            events,
        }
    }

    /// Fetch the card list from `source` and build a controller over it.
    pub async fn from_source(
        source: &dyn ContentSource,
        engine: PlaybackEngine,
        gate: AutoplayUnlockGate,
        auto_start: bool,
        events: EventSink,
    ) -> Result<Self, ContentError> {
        let cards = source.list_cards().await?;
        if cards.is_empty() {
            tracing::warn!("Content source returned no cards");
        }
        Ok(Self::new(cards, engine, gate, auto_start, events))
    }

    // ── Queries ────────────────────────────────────────────────────

    #[must_use]
    pub fn cards(&self) -> &[ContentCard] {
        &self.cards
    }

    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.navigator.current_index()
    }

    #[must_use]
    pub fn current_card(&self) -> Option<&ContentCard> {
        self.cards.get(self.navigator.current_index())
    }

    #[must_use]
    pub const fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    #[must_use]
    pub const fn navigator(&self) -> &GestureNavigator {
        &self.navigator
    }

    #[must_use]
    pub const fn gate(&self) -> &AutoplayUnlockGate {
        &self.gate
    }

    /// When [`poll`](Self::poll) next has work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.navigator.next_deadline()
    }

    // ── Card activation ────────────────────────────────────────────

    /// Show card `index` (clamped) and activate it.
    pub fn open(&mut self, index: usize) {
        self.navigator.jump_to(index);
        let index = self.navigator.current_index();
        tracing::info!(index, cards = self.cards.len(), "Opening reader");
        self.events.emit(ReaderEvent::IndexChanged { index });
        self.activate_current();
    }

    /// Replace the engine's session with the current card's narration.
    ///
    /// The previous session is unloaded first, so two backends never sound at
    /// once. Cards without narration leave the engine idle.
    pub fn activate_current(&mut self) {
        self.engine.unload();

        let Some(card) = self.cards.get(self.navigator.current_index()) else {
            return;
        };
        let Some(session) = NarrationSession::from_card(card) else {
            tracing::debug!(card = %card.id, "Card has no narration");
            return;
        };
        let session_id = session.id();
        self.engine.load(session);

        if !self.auto_start || self.engine.state() != Some(PlaybackState::Idle) {
            return;
        }
        if self.gate.needs_prompt(self.engine.session(), self.auto_start) {
            tracing::debug!(session = %session_id, "Audio locked; prompting for a tap");
            self.events
                .emit(ReaderEvent::UnlockPromptNeeded { session: session_id });
        } else {
            self.engine.start(0.0);
        }
    }

    fn apply(&mut self, change: Option<IndexChange>) {
        let Some(change) = change else {
            return;
        };
        tracing::info!(
            from = change.from,
            to = change.to,
            direction = ?change.direction,
            "Card changed"
        );
        self.events
            .emit(ReaderEvent::IndexChanged { index: change.to });
        self.activate_current();
    }

    // ── Input ──────────────────────────────────────────────────────

    /// Dispatch one shell input.
    pub fn handle_input(&mut self, input: UiInput, now: Instant) {
        match input {
            UiInput::TouchStart { y, in_controls } => {
                self.navigator.touch_start(y, in_controls, now);
            }
            UiInput::TouchMove { y } => self.navigator.touch_move(y),
            UiInput::TouchEnd => {
                let change = self.navigator.touch_end(now);
                self.apply(change);
            }
            UiInput::Wheel(wheel) => {
                self.wheel(wheel, now);
            }
            UiInput::UnlockTap => {
                self.unlock();
            }
            UiInput::Play => self.play(),
            UiInput::Pause => self.engine.pause(),
            UiInput::Toggle => self.toggle(),
            UiInput::Stop => self.engine.stop(),
            UiInput::SeekForward => self.engine.seek_forward(),
            UiInput::SeekBackward => self.engine.seek_backward(),
            UiInput::Navigate(direction) => self.navigate(direction, now),
        }
    }

    /// Forward a wheel event; the disposition tells the shell whether to
    /// suppress native scrolling.
    pub fn wheel(&mut self, input: WheelInput, now: Instant) -> WheelDisposition {
        let disposition = self.navigator.wheel(input, now);
        tracing::trace!(delta_y = input.delta_y, ?disposition, "Wheel");
        disposition
    }

    pub fn navigate(&mut self, direction: Direction, now: Instant) {
        let change = self.navigator.advance(direction, now);
        self.apply(change);
    }

    /// Handle a tap on the unlock prompt.
    pub fn unlock(&mut self) -> UnlockOutcome {
        self.gate.request_unlock(&mut self.engine)
    }

    /// Explicit play. While audio is still locked the tap doubles as the
    /// unlock gesture.
    pub fn play(&mut self) {
        if !self.gate.is_unlocked() {
            self.unlock();
            return;
        }
        match self.engine.state() {
            Some(PlaybackState::Paused) => self.engine.resume(),
            Some(PlaybackState::Idle | PlaybackState::Stopped) => {
                let at = self.engine.progress().current_time;
                self.engine.start(at);
            }
            _ => {}
        }
    }

    pub fn toggle(&mut self) {
        if !self.gate.is_unlocked() {
            self.unlock();
            return;
        }
        self.engine.toggle();
    }

    // ── Clock and signals ──────────────────────────────────────────

    /// Run due navigator timers.
    pub fn poll(&mut self, now: Instant) {
        let change = self.navigator.poll(now);
        self.apply(change);
    }

    /// Advance the synthesized-speech progress estimate.
    pub fn tick(&mut self) {
        self.engine.tick();
    }

    pub fn handle_signal(&mut self, signal: BackendSignal) {
        self.engine.handle_signal(signal);
    }

    /// Tear down playback (page unmount).
    pub fn shutdown(&mut self) {
        tracing::info!("Closing reader");
        self.engine.unload();
    }
}

impl std::fmt::Debug for ReaderController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReaderController")
            .field("cards", &self.cards.len())
            .field("current_index", &self.navigator.current_index())
            .field("engine", &self.engine)
            .field("unlocked", &self.gate.is_unlocked())
            .finish_non_exhaustive()
    }
}
