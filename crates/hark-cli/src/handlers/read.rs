//! `hark read` - the interactive terminal reader.
//!
//! Three tasks run side by side: a stdin reader turning key lines into
//! [`UiInput`]s, a renderer printing [`ReaderEvent`]s, and the reader loop
//! itself on the current task.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use hark_core::{ContentSource, EventSink, ReaderEvent, Settings, SpeechSynthesizer};
use hark_playback::{
    AutoplayUnlockGate, EngineConfig, PlaybackEngine, ProcessSpeechSynthesizer, RodioMediaElement,
};
use hark_reader::{JsonContentSource, ReaderController, UiInput, run_reader};

use crate::keys::{HELP, KeyCommand, parse_key_line};
use crate::presentation::StatusRenderer;

pub async fn execute(file: &Path, card: usize, settings: &Settings) -> Result<()> {
    let cards = JsonContentSource::new(file)
        .list_cards()
        .await
        .with_context(|| format!("Failed to read cards from {}", file.display()))?;
    if cards.is_empty() {
        anyhow::bail!("{} contains no cards", file.display());
    }

    let media = RodioMediaElement::spawn().context("Failed to open audio output")?;
    let speech = match ProcessSpeechSynthesizer::detect() {
        Ok(speech) => Some(Box::new(speech) as Box<dyn SpeechSynthesizer>),
        Err(e) => {
            tracing::warn!(error = %e, "Text narration unavailable");
            None
        }
    };

    let config = EngineConfig::from_settings(settings);
    let tick = config.tick_interval;
    let (sink, events) = EventSink::channel();
    let (engine, signals) = PlaybackEngine::new(Box::new(media), speech, config, sink.clone());
    let gate = AutoplayUnlockGate::new(settings.require_gesture);

    let renderer = tokio::spawn(render_events(StatusRenderer::new(&cards), events));

    let mut controller = ReaderController::new(cards, engine, gate, settings.auto_start, sink);
    println!("{HELP}");
    controller.open(card);

    // The loop ends when the key reader drops its sender (quit or EOF).
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let keys = tokio::spawn(read_keys(input_tx));

    let controller = run_reader(controller, input_rx, signals, tick).await;
    // Dropping the controller closes the event channel and ends the renderer.
    drop(controller);

    for task in [keys, renderer] {
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Reader task failed");
        }
    }
    Ok(())
}

/// Forward key lines as reader inputs until `q` or end of input.
async fn read_keys(tx: mpsc::UnboundedSender<UiInput>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stdin");
                break;
            }
        };

        match parse_key_line(&line) {
            Some(KeyCommand::Inputs(inputs)) => {
                for input in inputs {
                    if tx.send(input).is_err() {
                        return;
                    }
                }
            }
            Some(KeyCommand::Help) => println!("{HELP}"),
            Some(KeyCommand::Quit) => break,
            None if line.is_empty() => {}
            None => println!("unknown key '{}' (h for help)", line.trim()),
        }
    }
}

async fn render_events(
    mut renderer: StatusRenderer,
    mut events: mpsc::UnboundedReceiver<ReaderEvent>,
) {
    while let Some(event) = events.recv().await {
        if let Some(line) = renderer.render(&event) {
            println!("{line}");
        }
    }
}
