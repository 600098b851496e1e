//! Terminal input pump.
//!
//! Merges crossterm input with the tick and render clocks into one
//! channel of loop [`Event`]s. The pump stops when its cancellation token
//! fires, the receiver is dropped, or terminal input fails.

use std::io;
use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Terminal was resized to (cols, rows).
    Resize(u16, u16),
    /// Drives toast expiry.
    Tick,
    Render,
}

/// Clock periods for the pump.
#[derive(Debug, Clone, Copy)]
pub struct Rates {
    pub tick: Duration,
    pub render: Duration,
}

/// Keep key presses and resizes. Releases, repeats, mouse, focus and
/// paste events are dropped.
pub fn classify(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

/// Start pumping the real terminal.
pub fn spawn_event_reader(
    rates: Rates,
    cancel: CancellationToken,
) -> (mpsc::UnboundedReceiver<Event>, JoinHandle<()>) {
    spawn_with_input(EventStream::new(), rates, cancel)
}

fn spawn_with_input<S>(
    input: S,
    rates: Rates,
    cancel: CancellationToken,
) -> (mpsc::UnboundedReceiver<Event>, JoinHandle<()>)
where
    S: Stream<Item = io::Result<CrosstermEvent>> + Send + Unpin + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(pump(input, rates, tx, cancel));
    (rx, handle)
}

async fn pump<S>(
    mut input: S,
    rates: Rates,
    tx: mpsc::UnboundedSender<Event>,
    cancel: CancellationToken,
) where
    S: Stream<Item = io::Result<CrosstermEvent>> + Unpin,
{
    let mut tick = tokio::time::interval(rates.tick);
    let mut render = tokio::time::interval(rates.render);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    render.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            next = input.next() => match next {
                Some(Ok(raw)) => match classify(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => {
                    warn!(error = %e, "terminal input failed");
                    break;
                }
                None => break,
            },
            _ = tick.tick() => Event::Tick,
            _ = render.tick() => Event::Render,
        };

        if tx.send(event).is_err() {
            break;
        }
    }
}
