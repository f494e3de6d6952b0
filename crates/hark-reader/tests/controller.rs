//! Card activation, unlock prompts and input dispatch through
//! `ReaderController`, with fake backends.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use mockall::mock;
use tokio::sync::mpsc::UnboundedReceiver;

use hark_core::{
    BackendSignal, ContentCard, ContentError, ContentSource, EventSink, PlaybackState,
    ReaderEvent,
};
use hark_nav::{Direction, WheelDisposition, WheelInput};
use hark_playback::testing::{
    FakeMedia, FakeMediaHandle, FakeSpeech, FakeSpeechHandle, SpeechCall, drain_events,
};
use hark_playback::{AutoplayUnlockGate, EngineConfig, PlaybackEngine};
use hark_reader::{ReaderController, UiInput};

// ── Helpers ────────────────────────────────────────────────────────

fn speech_card(id: &str, text: &str) -> ContentCard {
    ContentCard {
        id: id.into(),
        title: format!("Card {id}"),
        author: None,
        narration_text: Some(text.into()),
        narration_audio_url: None,
    }
}

fn silent_card(id: &str) -> ContentCard {
    ContentCard {
        id: id.into(),
        title: format!("Card {id}"),
        author: None,
        narration_text: None,
        narration_audio_url: None,
    }
}

struct Page {
    controller: ReaderController,
    signals: UnboundedReceiver<BackendSignal>,
    events: UnboundedReceiver<ReaderEvent>,
    media: FakeMediaHandle,
    speech: FakeSpeechHandle,
}

impl Page {
    fn new(cards: Vec<ContentCard>, require_gesture: bool, auto_start: bool) -> Self {
        let (media, media_handle) = FakeMedia::new();
        let (speech, speech_handle) = FakeSpeech::new();
        let (sink, events) = EventSink::channel();
        let (engine, signals) = PlaybackEngine::new(
            Box::new(media),
            Some(Box::new(speech)),
            EngineConfig::default(),
            sink.clone(),
        );
        let gate = AutoplayUnlockGate::new(require_gesture);
        Self {
            controller: ReaderController::new(cards, engine, gate, auto_start, sink),
            signals,
            events,
            media: media_handle,
            speech: speech_handle,
        }
    }

    fn unlocked(cards: Vec<ContentCard>) -> Self {
        Self::new(cards, false, true)
    }

    fn locked(cards: Vec<ContentCard>) -> Self {
        Self::new(cards, true, true)
    }

    fn pump(&mut self) {
        while let Ok(signal) = self.signals.try_recv() {
            self.controller.handle_signal(signal);
        }
    }

    fn input(&mut self, input: UiInput, now: Instant) {
        self.controller.handle_input(input, now);
        self.pump();
    }

    fn events(&mut self) -> Vec<ReaderEvent> {
        drain_events(&mut self.events)
    }

    fn state(&self) -> Option<PlaybackState> {
        self.controller.engine().state()
    }

    fn spoken_texts(&self) -> Vec<String> {
        self.speech
            .utterances()
            .into_iter()
            .map(|u| u.text)
            .collect()
    }
}

fn index_changes(events: &[ReaderEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            ReaderEvent::IndexChanged { index } => Some(*index),
            _ => None,
        })
        .collect()
}

fn prompts(events: &[ReaderEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ReaderEvent::UnlockPromptNeeded { .. }))
        .count()
}

// ── Activation ─────────────────────────────────────────────────────

#[test]
fn unlocked_page_auto_starts_first_card() {
    let mut page = Page::unlocked(vec![speech_card("a", "First card text")]);

    page.controller.open(0);
    page.pump();

    assert_eq!(page.state(), Some(PlaybackState::Playing));
    assert_eq!(page.spoken_texts(), ["First card text"]);
    let events = page.events();
    assert_eq!(index_changes(&events), [0]);
    assert_eq!(prompts(&events), 0);
}

#[test]
fn locked_page_prompts_instead_of_playing() {
    let mut page = Page::locked(vec![speech_card("a", "Hello")]);

    page.controller.open(0);
    page.pump();

    assert_eq!(page.state(), Some(PlaybackState::Idle));
    assert!(page.speech.utterances().is_empty());
    let events = page.events();
    let session = page.controller.engine().session().unwrap().id();
    assert!(events.contains(&ReaderEvent::UnlockPromptNeeded { session }));
    assert_eq!(prompts(&events), 1);
}

#[test]
fn unlock_tap_starts_pending_session() {
    let mut page = Page::locked(vec![speech_card("a", "Hello")]);
    page.controller.open(0);

    page.input(UiInput::UnlockTap, Instant::now());

    assert!(page.controller.gate().is_unlocked());
    assert_eq!(page.state(), Some(PlaybackState::Playing));
    assert_eq!(page.spoken_texts(), ["Hello"]);
}

#[test]
fn play_button_doubles_as_unlock_tap() {
    let mut page = Page::locked(vec![speech_card("a", "Hello")]);
    page.controller.open(0);

    page.input(UiInput::Play, Instant::now());

    assert!(page.controller.gate().is_unlocked());
    assert_eq!(page.state(), Some(PlaybackState::Playing));
}

#[test]
fn without_auto_start_nothing_plays_or_prompts() {
    let mut page = Page::new(vec![speech_card("a", "Hello")], true, false);

    page.controller.open(0);
    page.pump();

    assert_eq!(page.state(), Some(PlaybackState::Idle));
    assert_eq!(prompts(&page.events()), 0);
    assert!(page.speech.utterances().is_empty());
}

#[test]
fn audio_url_wins_over_text() {
    let mut card = speech_card("a", "Fallback text");
    card.narration_audio_url = Some("https://cdn.example/a.mp3".into());
    let mut page = Page::unlocked(vec![card]);

    page.controller.open(0);
    page.pump();

    assert_eq!(page.media.url().as_deref(), Some("https://cdn.example/a.mp3"));
    assert!(page.speech.utterances().is_empty());
}

#[test]
fn open_clamps_out_of_range_index() {
    let mut page = Page::unlocked(vec![speech_card("a", "One"), speech_card("b", "Two")]);

    page.controller.open(7);

    assert_eq!(page.controller.current_index(), 1);
    assert_eq!(index_changes(&page.events()), [1]);
}

// ── Card changes ───────────────────────────────────────────────────

#[test]
fn swipe_replaces_narration_without_overlap() {
    let mut page = Page::unlocked(vec![speech_card("a", "One"), speech_card("b", "Two")]);
    page.controller.open(0);
    page.pump();
    page.events();
    page.speech.clear_calls();

    let now = Instant::now();
    page.input(
        UiInput::TouchStart {
            y: 600.0,
            in_controls: false,
        },
        now,
    );
    page.input(UiInput::TouchMove { y: 520.0 }, now);
    page.input(UiInput::TouchEnd, now);

    assert_eq!(index_changes(&page.events()), [1]);
    let calls = page.speech.calls();
    assert_eq!(calls.first(), Some(&SpeechCall::Cancel));
    assert!(matches!(calls.last(), Some(SpeechCall::Speak(u)) if u.text == "Two"));
    assert!(page.controller.engine().active_backend_count() <= 1);
    assert_eq!(page.state(), Some(PlaybackState::Playing));
}

#[test]
fn touch_on_controls_does_not_navigate() {
    let mut page = Page::unlocked(vec![speech_card("a", "One"), speech_card("b", "Two")]);
    page.controller.open(0);
    page.events();

    let now = Instant::now();
    page.input(
        UiInput::TouchStart {
            y: 600.0,
            in_controls: true,
        },
        now,
    );
    page.input(UiInput::TouchMove { y: 400.0 }, now);
    page.input(UiInput::TouchEnd, now);

    assert_eq!(page.controller.current_index(), 0);
    assert!(index_changes(&page.events()).is_empty());
}

#[test]
fn card_without_narration_leaves_engine_idle() {
    let mut page = Page::unlocked(vec![speech_card("a", "One"), silent_card("b")]);
    page.controller.open(0);
    page.pump();

    page.input(UiInput::Navigate(Direction::Forward), Instant::now());

    assert_eq!(page.controller.current_index(), 1);
    assert_eq!(page.state(), None);
    assert_eq!(page.controller.engine().active_backend_count(), 0);
    assert!(page.speech.calls().contains(&SpeechCall::Cancel));
}

#[test]
fn navigation_past_last_card_is_ignored() {
    let mut page = Page::unlocked(vec![speech_card("a", "Only")]);
    page.controller.open(0);
    page.pump();
    page.events();

    page.input(UiInput::Navigate(Direction::Forward), Instant::now());

    assert!(index_changes(&page.events()).is_empty());
    assert_eq!(page.state(), Some(PlaybackState::Playing));
}

#[test]
fn locked_page_prompts_again_for_next_card() {
    let mut page = Page::locked(vec![speech_card("a", "One"), speech_card("b", "Two")]);
    page.controller.open(0);

    page.input(UiInput::Navigate(Direction::Forward), Instant::now());

    assert_eq!(prompts(&page.events()), 2);
    assert!(page.speech.utterances().is_empty());
}

#[test]
fn quiet_wheel_burst_changes_card_on_poll() {
    let mut page = Page::unlocked(vec![speech_card("a", "One"), speech_card("b", "Two")]);
    page.controller.open(0);
    page.pump();
    page.events();

    let t0 = Instant::now();
    for (ms, dy) in [(0, 10.0), (40, 12.0), (80, 15.0)] {
        let disposition = page
            .controller
            .wheel(WheelInput::new(dy), t0 + Duration::from_millis(ms));
        assert_eq!(disposition, WheelDisposition::Captured);
    }

    let deadline = page.controller.next_deadline().unwrap();
    page.controller.poll(deadline);
    page.pump();

    assert_eq!(index_changes(&page.events()), [1]);
    assert_eq!(page.spoken_texts(), ["One", "Two"]);
}

// ── Transport ──────────────────────────────────────────────────────

#[test]
fn transport_inputs_reach_engine() {
    let mut page = Page::unlocked(vec![speech_card("a", "Some narration text")]);
    page.controller.open(0);
    page.pump();
    let now = Instant::now();

    page.input(UiInput::Pause, now);
    assert_eq!(page.state(), Some(PlaybackState::Paused));

    page.input(UiInput::Play, now);
    assert_eq!(page.state(), Some(PlaybackState::Playing));

    page.input(UiInput::Toggle, now);
    assert_eq!(page.state(), Some(PlaybackState::Paused));

    page.input(UiInput::Stop, now);
    assert_eq!(page.state(), Some(PlaybackState::Stopped));

    page.input(UiInput::Toggle, now);
    assert_eq!(page.state(), Some(PlaybackState::Playing));
}

#[test]
fn shutdown_cancels_narration() {
    let mut page = Page::unlocked(vec![speech_card("a", "One")]);
    page.controller.open(0);
    page.pump();
    page.speech.clear_calls();

    page.controller.shutdown();

    assert_eq!(page.speech.calls(), [SpeechCall::Cancel]);
    assert_eq!(page.state(), None);
}

// ── Content source ─────────────────────────────────────────────────

mock! {
    Source {}

    #[async_trait]
    impl ContentSource for Source {
        async fn list_cards(&self) -> Result<Vec<ContentCard>, ContentError>;
    }
}

fn engine() -> PlaybackEngine {
    let (media, _) = FakeMedia::new();
    let (engine, _signals) =
        PlaybackEngine::new(Box::new(media), None, EngineConfig::default(), EventSink::noop());
    engine
}

#[tokio::test]
async fn from_source_loads_cards_once() {
    let mut source = MockSource::new();
    source
        .expect_list_cards()
        .times(1)
        .returning(|| Ok(vec![speech_card("a", "One"), silent_card("b")]));

    let controller = ReaderController::from_source(
        &source,
        engine(),
        AutoplayUnlockGate::new(true),
        true,
        EventSink::noop(),
    )
    .await
    .unwrap();

    assert_eq!(controller.cards().len(), 2);
    assert_eq!(controller.navigator().card_count(), 2);
    assert_eq!(controller.current_card().map(|c| c.id.as_str()), Some("a"));
}

#[tokio::test]
async fn from_source_propagates_content_errors() {
    let mut source = MockSource::new();
    source
        .expect_list_cards()
        .returning(|| Err(ContentError::NotFound("feed".into())));

    let err = ReaderController::from_source(
        &source,
        engine(),
        AutoplayUnlockGate::default(),
        true,
        EventSink::noop(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ContentError::NotFound(ref id) if id == "feed"));
}
