// Whole-chart fade choreography and completion signals.
//
//   Hidden -> Entering -> Shown -> Exiting -> (swap) -> Entering -> Shown
//
// Fades are linear in opacity. Callers sequence phases by awaiting a
// `Settled` future instead of sleeping for a fixed delay.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_channel::oneshot;
use serde::Serialize;

pub use futures_channel::oneshot::Canceled;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    Hidden,
    Entering { since: f64 },
    Shown,
    Exiting { since: f64 },
}

impl Stage {
    pub fn opacity(&self, now: f64, fade: f64) -> f64 {
        match *self {
            Stage::Hidden => 0.0,
            Stage::Shown => 1.0,
            Stage::Entering { since } => fade_progress(since, now, fade),
            Stage::Exiting { since } => 1.0 - fade_progress(since, now, fade),
        }
    }

    /// Whether a fade that started at `since` has run its course.
    pub fn fade_done(&self, now: f64, fade: f64) -> bool {
        match *self {
            Stage::Entering { since } | Stage::Exiting { since } => fade_progress(since, now, fade) >= 1.0,
            Stage::Hidden | Stage::Shown => false,
        }
    }

    pub fn is_fading(&self) -> bool {
        matches!(self, Stage::Entering { .. } | Stage::Exiting { .. })
    }
}

fn fade_progress(since: f64, now: f64, fade: f64) -> f64 {
    if fade <= 0.0 {
        return 1.0;
    }
    ((now - since) / fade).clamp(0.0, 1.0)
}

/// Resolves when the awaited animation phase finishes.
///
/// Yields `Err(Canceled)` when the phase is abandoned, e.g. a zoom that a
/// rebuild discarded, or when the chart is dropped first.
#[derive(Debug)]
pub struct Settled(oneshot::Receiver<()>);

impl Settled {
    /// Non-blocking check: `Some(Ok(()))` once finished.
    pub fn try_settled(&mut self) -> Option<Result<(), Canceled>> {
        match self.0.try_recv() {
            Ok(Some(())) => Some(Ok(())),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl Future for Settled {
    type Output = Result<(), Canceled>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

/// Pending `Settled` futures for one kind of phase.
#[derive(Debug, Default)]
pub struct Waiters(Vec<oneshot::Sender<()>>);

impl Waiters {
    pub fn push(&mut self) -> Settled {
        let (tx, rx) = oneshot::channel();
        self.0.push(tx);
        Settled(rx)
    }

    /// A future that is already resolved.
    pub fn ready() -> Settled {
        let (tx, rx) = oneshot::channel();
        // receiver is alive, send cannot fail
        let _ = tx.send(());
        Settled(rx)
    }

    pub fn resolve_all(&mut self) {
        for tx in self.0.drain(..) {
            // a dropped receiver just means nobody is waiting anymore
            let _ = tx.send(());
        }
    }

    /// Drop every sender; waiters observe `Canceled`.
    pub fn cancel_all(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opacity_ramps() {
        let entering = Stage::Entering { since: 1000.0 };
        assert_eq!(entering.opacity(1000.0, 1500.0), 0.0);
        assert_eq!(entering.opacity(1750.0, 1500.0), 0.5);
        assert_eq!(entering.opacity(9000.0, 1500.0), 1.0);
        assert!(entering.fade_done(2500.0, 1500.0));
        assert!(!entering.fade_done(2499.0, 1500.0));

        let exiting = Stage::Exiting { since: 0.0 };
        assert_eq!(exiting.opacity(375.0, 1500.0), 0.75);
        assert_eq!(Stage::Hidden.opacity(0.0, 1500.0), 0.0);
        assert_eq!(Stage::Shown.opacity(0.0, 1500.0), 1.0);
    }

    #[test]
    fn test_waiters_resolve() {
        let mut waiters = Waiters::default();
        let mut settled = waiters.push();
        assert_eq!(settled.try_settled(), None);
        waiters.resolve_all();
        assert_eq!(settled.try_settled(), Some(Ok(())));
    }

    #[test]
    fn test_waiters_cancel() {
        let mut waiters = Waiters::default();
        let mut settled = waiters.push();
        waiters.cancel_all();
        assert_eq!(settled.try_settled(), Some(Err(Canceled)));
    }

    #[test]
    fn test_ready() {
        assert_eq!(Waiters::ready().try_settled(), Some(Ok(())));
    }
}
