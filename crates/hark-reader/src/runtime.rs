//! The reader's event loop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use hark_core::BackendSignal;

use crate::controller::ReaderController;
use crate::input::UiInput;

/// Drive `controller` until `inputs` closes, then unload playback and hand
/// the controller back.
///
/// `signals` is the receiver returned by `PlaybackEngine::new`; `tick` should
/// match the engine's configured tick interval.
pub async fn run_reader(
    mut controller: ReaderController,
    mut inputs: mpsc::UnboundedReceiver<UiInput>,
    mut signals: mpsc::UnboundedReceiver<BackendSignal>,
    tick: Duration,
) -> ReaderController {
    let mut ticker = time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!(tick_ms = tick.as_millis(), "Reader loop started");

    loop {
        let deadline = controller.next_deadline().map(Instant::from_std);

        tokio::select! {
            biased;

            input = inputs.recv() => {
                let Some(input) = input else {
                    break;
                };
                controller.handle_input(input, Instant::now().into_std());
            }

            Some(signal) = signals.recv() => {
                controller.handle_signal(signal);
            }

            () = wait_until(deadline) => {
                controller.poll(Instant::now().into_std());
            }

            _ = ticker.tick() => {
                controller.tick();
            }
        }
    }

    controller.shutdown();
    tracing::debug!("Reader loop finished");
    controller
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
