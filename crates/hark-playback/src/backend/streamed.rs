//! Streamed-audio backend: a `rodio` player on a dedicated media thread.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so the stream and the
//! active `Sink` live on one OS thread for their whole lifetime.
//! [`RodioMediaElement`] is the `Send` proxy the engine holds: every call is
//! a fire-and-forget [`MediaCommand`], and everything asynchronous (metadata,
//! play resolution, time updates, the natural end) comes back as a tagged
//! [`MediaEvent`] on the engine's signal channel.
//!
//! Narration files are fetched whole by a short-lived worker thread (HTTP via
//! `reqwest`, or a local path) and decoded from memory, which keeps seeking
//! exact.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use hark_core::{
    BackendTag, MediaElement, MediaEvent, PlayRejection, PlaybackError, SignalSender,
};

/// How often the media thread reports the playback position.
const TIME_UPDATE_INTERVAL: Duration = Duration::from_millis(250);

/// Request timeout for narration downloads.
const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

// ── Commands ───────────────────────────────────────────────────────

/// A command sent from the engine (or a fetch worker) to the media thread.
enum MediaCommand {
    /// Release the current source and start loading `url`.
    Attach {
        tag: BackendTag,
        url: String,
        signals: SignalSender,
    },

    /// Tag future signals for the current source with `tag`.
    Retag(BackendTag),

    Play,

    Pause,

    /// Jump to an absolute position in seconds.
    Seek(f64),

    /// Drop the current source.
    Detach,

    /// A fetch worker finished downloading load number `load_id`.
    Fetched {
        load_id: u64,
        result: Result<FetchedAudio, String>,
    },

    /// Shut down the media thread.
    Shutdown,
}

/// A downloaded narration file and its probed length.
struct FetchedAudio {
    bytes: Arc<[u8]>,
    duration: Option<f64>,
}

// ── Shared position (lock-free reads from the engine side) ─────────

#[derive(Debug)]
struct SharedPosition {
    position_bits: AtomicU64,
    /// `NaN` while unknown.
    duration_bits: AtomicU64,
    playing: AtomicBool,
}

impl SharedPosition {
    fn new() -> Self {
        Self {
            position_bits: AtomicU64::new(0f64.to_bits()),
            duration_bits: AtomicU64::new(f64::NAN.to_bits()),
            playing: AtomicBool::new(false),
        }
    }

    fn set_position(&self, secs: f64) {
        self.position_bits.store(secs.to_bits(), Ordering::Relaxed);
    }

    fn position(&self) -> f64 {
        f64::from_bits(self.position_bits.load(Ordering::Relaxed))
    }

    fn set_duration(&self, secs: Option<f64>) {
        let bits = secs.unwrap_or(f64::NAN).to_bits();
        self.duration_bits.store(bits, Ordering::Relaxed);
    }

    fn duration(&self) -> Option<f64> {
        let secs = f64::from_bits(self.duration_bits.load(Ordering::Relaxed));
        (secs.is_finite() && secs > 0.0).then_some(secs)
    }

    fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::SeqCst);
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.set_position(0.0);
        self.set_duration(None);
        self.set_playing(false);
    }
}

// ── Handle (Send proxy) ────────────────────────────────────────────

/// `Send` handle to the dedicated media thread.
///
/// One instance serves every streamed session of the process; `attach`
/// swaps the source.
pub struct RodioMediaElement {
    cmd_tx: mpsc::Sender<MediaCommand>,
    shared: Arc<SharedPosition>,
    thread: Option<thread::JoinHandle<()>>,
}

impl RodioMediaElement {
    /// Spawn the media thread and open the default output device.
    ///
    /// Output-device errors are propagated back through a one-shot init
    /// channel.
    pub fn spawn() -> Result<Self, PlaybackError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<MediaCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), PlaybackError>>();
        let shared = Arc::new(SharedPosition::new());

        let thread_shared = Arc::clone(&shared);
        let worker_tx = cmd_tx.clone();
        let thread = thread::Builder::new()
            .name("hark-media".into())
            .spawn(move || run(&thread_shared, &worker_tx, &cmd_rx, &init_tx))
            .map_err(|e| PlaybackError::OutputStream(format!("failed to spawn media thread: {e}")))?;

        init_rx.recv().map_err(|_| PlaybackError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            shared,
            thread: Some(thread),
        })
    }

    fn send(&self, cmd: MediaCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::warn!("Media thread is gone; command dropped");
        }
    }
}

impl MediaElement for RodioMediaElement {
    fn attach(
        &mut self,
        tag: BackendTag,
        url: &str,
        signals: SignalSender,
    ) -> Result<(), PlaybackError> {
        self.shared.reset();
        self.cmd_tx
            .send(MediaCommand::Attach {
                tag,
                url: url.to_string(),
                signals,
            })
            .map_err(|_| PlaybackError::AudioThreadDied)
    }

    fn retag(&mut self, tag: BackendTag) {
        self.send(MediaCommand::Retag(tag));
    }

    fn play(&mut self) {
        self.send(MediaCommand::Play);
    }

    fn pause(&mut self) {
        self.shared.set_playing(false);
        self.send(MediaCommand::Pause);
    }

    fn seek_to(&mut self, seconds: f64) {
        self.shared.set_position(seconds);
        self.send(MediaCommand::Seek(seconds));
    }

    fn current_time(&self) -> f64 {
        self.shared.position()
    }

    fn duration(&self) -> Option<f64> {
        self.shared.duration()
    }

    fn detach(&mut self) {
        self.shared.reset();
        self.send(MediaCommand::Detach);
    }

    fn is_active(&self) -> bool {
        self.shared.is_playing()
    }
}

impl Drop for RodioMediaElement {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(MediaCommand::Shutdown);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::warn!("Media thread panicked during shutdown");
        }
    }
}

// ── Media thread ───────────────────────────────────────────────────

/// The source currently attached to the media thread.
struct LoadedSource {
    tag: BackendTag,
    signals: SignalSender,
    /// Encoded file, `None` while the fetch is in flight.
    bytes: Option<Arc<[u8]>>,
    sink: Option<Sink>,
    /// Position requested while no sink could honour it.
    position: f64,
    /// The engine wants audio.
    want_play: bool,
    /// A `play()` has not been resolved yet.
    play_pending: bool,
    /// The sink drained naturally.
    ended: bool,
    last_reported: f64,
}

impl LoadedSource {
    fn emit(&self, event: MediaEvent) {
        self.signals.media(self.tag, event);
    }
}

struct MediaThread<'a> {
    handle: OutputStreamHandle,
    shared: &'a SharedPosition,
    worker_tx: &'a mpsc::Sender<MediaCommand>,
    source: Option<LoadedSource>,
    load_id: u64,
}

/// Body of the media thread. Owns the output stream for its entire lifetime.
fn run(
    shared: &SharedPosition,
    worker_tx: &mpsc::Sender<MediaCommand>,
    cmd_rx: &mpsc::Receiver<MediaCommand>,
    init_tx: &mpsc::Sender<Result<(), PlaybackError>>,
) {
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = init_tx.send(Err(PlaybackError::OutputStream(e.to_string())));
            return;
        }
    };

    if init_tx.send(Ok(())).is_err() {
        return;
    }
    tracing::info!("Media thread started on default output device");

    let mut media = MediaThread {
        handle,
        shared,
        worker_tx,
        source: None,
        load_id: 0,
    };
    let mut last_poll = Instant::now();

    loop {
        match cmd_rx.recv_timeout(TIME_UPDATE_INTERVAL) {
            Ok(MediaCommand::Shutdown) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
            Ok(cmd) => media.handle(cmd),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
        }

        if last_poll.elapsed() >= TIME_UPDATE_INTERVAL {
            media.poll();
            last_poll = Instant::now();
        }
    }

    media.detach();
    tracing::debug!("Media thread exiting");
}

impl MediaThread<'_> {
    fn handle(&mut self, cmd: MediaCommand) {
        match cmd {
            MediaCommand::Attach { tag, url, signals } => self.attach(tag, url, signals),
            MediaCommand::Retag(tag) => {
                if let Some(source) = self.source.as_mut() {
                    source.tag = tag;
                }
            }
            MediaCommand::Play => self.play(),
            MediaCommand::Pause => self.pause(),
            MediaCommand::Seek(secs) => self.seek(secs),
            MediaCommand::Detach => self.detach(),
            MediaCommand::Fetched { load_id, result } => self.fetched(load_id, result),
            MediaCommand::Shutdown => {}
        }
    }

    fn attach(&mut self, tag: BackendTag, url: String, signals: SignalSender) {
        self.detach();
        self.load_id += 1;
        let load_id = self.load_id;

        tracing::debug!(url = %url, load_id, "Fetching narration audio");
        self.source = Some(LoadedSource {
            tag,
            signals,
            bytes: None,
            sink: None,
            position: 0.0,
            want_play: false,
            play_pending: false,
            ended: false,
            last_reported: 0.0,
        });

        let worker_tx = self.worker_tx.clone();
        let spawned = thread::Builder::new()
            .name("hark-fetch".into())
            .spawn(move || {
                let result = fetch(&url).map(|bytes| FetchedAudio {
                    duration: probe_duration(&bytes),
                    bytes,
                });
                let _ = worker_tx.send(MediaCommand::Fetched { load_id, result });
            });
        if let Err(e) = spawned
            && let Some(source) = &self.source
        {
            source.emit(MediaEvent::Error(format!("failed to spawn fetch worker: {e}")));
        }
    }

    fn fetched(&mut self, load_id: u64, result: Result<FetchedAudio, String>) {
        if load_id != self.load_id {
            tracing::debug!(load_id, current = self.load_id, "Dropping superseded fetch");
            return;
        }
        let Some(source) = self.source.as_mut() else {
            return;
        };

        let FetchedAudio { bytes, duration } = match result {
            Ok(audio) => audio,
            Err(e) => {
                source.emit(MediaEvent::Error(e));
                return;
            }
        };

        match build_sink(&self.handle, &bytes, source.position) {
            Ok(sink) => {
                self.shared.set_duration(duration);
                if let Some(duration) = duration {
                    source.emit(MediaEvent::LoadedMetadata { duration });
                }
                source.bytes = Some(bytes);
                source.sink = Some(sink);
                if source.play_pending && source.want_play {
                    self.play();
                } else if source.play_pending {
                    // Paused before the file arrived: resolve without sound.
                    source.play_pending = false;
                    source.emit(MediaEvent::PlayResolved(Ok(())));
                }
            }
            Err(e) => source.emit(MediaEvent::Error(e)),
        }
    }

    fn play(&mut self) {
        let Some(source) = self.source.as_mut() else {
            tracing::warn!("Play requested with no source attached");
            return;
        };
        source.want_play = true;
        source.play_pending = true;

        let Some(bytes) = source.bytes.clone() else {
            // Resolved once the fetch completes.
            return;
        };

        if source.ended || source.sink.is_none() {
            let position = if source.ended { 0.0 } else { source.position };
            match build_sink(&self.handle, &bytes, position) {
                Ok(sink) => {
                    source.sink = Some(sink);
                    source.ended = false;
                    source.position = position;
                }
                Err(e) => {
                    source.play_pending = false;
                    source.emit(MediaEvent::PlayResolved(Err(PlayRejection::Failed(e))));
                    return;
                }
            }
        }

        if let Some(sink) = &source.sink {
            sink.play();
        }
        source.play_pending = false;
        self.shared.set_playing(true);
        source.emit(MediaEvent::PlayResolved(Ok(())));
    }

    fn pause(&mut self) {
        self.shared.set_playing(false);
        let Some(source) = self.source.as_mut() else {
            return;
        };
        source.want_play = false;
        if let Some(sink) = &source.sink {
            sink.pause();
        }
    }

    fn seek(&mut self, secs: f64) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        let secs = secs.max(0.0);
        source.position = secs;
        self.shared.set_position(secs);

        if source.ended {
            // Rebuilt at `position` on the next play.
            source.ended = false;
            source.sink = None;
        } else if let Some(sink) = &source.sink
            && let Err(e) = sink.try_seek(Duration::from_secs_f64(secs))
        {
            tracing::debug!(error = %e, "Sink seek failed; rebuilding at position");
            source.sink = None;
            if source.want_play {
                self.play();
            }
        }

        if let Some(source) = &mut self.source {
            source.last_reported = secs;
            source.emit(MediaEvent::TimeUpdate { current_time: secs });
        }
    }

    fn detach(&mut self) {
        if let Some(source) = self.source.take()
            && let Some(sink) = source.sink
        {
            sink.stop();
        }
        self.load_id += 1;
        self.shared.reset();
    }

    /// Report position and detect the natural end.
    fn poll(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        if !source.want_play || source.ended {
            return;
        }
        let Some(sink) = &source.sink else {
            return;
        };

        let position = sink.get_pos().as_secs_f64();
        self.shared.set_position(position);

        if sink.empty() {
            source.ended = true;
            source.want_play = false;
            self.shared.set_playing(false);
            tracing::debug!(position, "Narration audio drained");
            source.emit(MediaEvent::Ended);
        } else if (position - source.last_reported).abs() >= 0.01 {
            source.last_reported = position;
            source.emit(MediaEvent::TimeUpdate {
                current_time: position,
            });
        }
    }
}

/// Decode `bytes` into a paused sink positioned at `at` seconds.
fn build_sink(handle: &OutputStreamHandle, bytes: &Arc<[u8]>, at: f64) -> Result<Sink, String> {
    let decoder = Decoder::new(Cursor::new(Arc::clone(bytes)))
        .map_err(|e| format!("failed to decode narration audio: {e}"))?;

    let sink = Sink::try_new(handle).map_err(|e| format!("failed to open sink: {e}"))?;
    sink.pause();
    sink.append(decoder);

    if at > 0.0
        && let Err(e) = sink.try_seek(Duration::from_secs_f64(at))
    {
        tracing::warn!(error = %e, at, "Could not seek narration audio");
    }

    Ok(sink)
}

/// Length of an encoded file in seconds.
///
/// Uses the container's duration when it has one. Many mp3 and aac streams
/// do not, so those are decoded in full and their samples counted.
fn probe_duration(bytes: &Arc<[u8]>) -> Option<f64> {
    let decoder = Decoder::new(Cursor::new(Arc::clone(bytes))).ok()?;
    if let Some(duration) = decoder.total_duration() {
        return Some(duration.as_secs_f64()).filter(|d| *d > 0.0);
    }

    let channels = u32::from(decoder.channels());
    let sample_rate = decoder.sample_rate();
    if channels == 0 || sample_rate == 0 {
        tracing::debug!("Narration audio has no duration and no sample format");
        return None;
    }

    let samples = decoder.count();
    #[allow(clippy::cast_precision_loss)]
    let secs = samples as f64 / f64::from(channels * sample_rate);
    tracing::debug!(samples, secs, "Narration audio duration counted from samples");
    (secs > 0.0).then_some(secs)
}

/// Download (or read) a narration file in full.
fn fetch(url: &str) -> Result<Arc<[u8]>, String> {
    if let Some(path) = local_path(url) {
        return std::fs::read(&path)
            .map(Arc::from)
            .map_err(|e| format!("{}: {e}", path.display()));
    }

    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("hark/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| e.to_string())?;

    let bytes = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .and_then(reqwest::blocking::Response::bytes)
        .map_err(|e| format!("{url}: {e}"))?;

    tracing::debug!(url, len = bytes.len(), "Fetched narration audio");
    Ok(Arc::from(bytes.as_ref()))
}

/// `file://` URLs and bare paths are read from disk.
fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    (!url.contains("://")).then(|| PathBuf::from(url))
}
