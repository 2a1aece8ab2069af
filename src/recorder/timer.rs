//! Session elapsed-time tracking
//!
//! Whole-second counting on a 1 Hz interval task. Tick delivery through the
//! watch channel is advisory display data; the authoritative duration is
//! whatever `elapsed_seconds` reads at the moment of stop.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct SessionTimer {
    elapsed: Arc<AtomicU64>,
    paused: Arc<AtomicBool>,
    tick_tx: watch::Sender<u64>,
    task: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn new() -> Self {
        let (tick_tx, _) = watch::channel(0);
        Self {
            elapsed: Arc::new(AtomicU64::new(0)),
            paused: Arc::new(AtomicBool::new(false)),
            tick_tx,
            task: None,
        }
    }

    /// Begin counting from zero, ticking once per second.
    pub fn start(&mut self) {
        self.reset();

        let elapsed = self.elapsed.clone();
        let paused = self.paused.clone();
        let tick_tx = self.tick_tx.clone();

        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            // The first interval tick fires immediately; consume it so the
            // count starts advancing one second from now.
            interval.tick().await;
            loop {
                interval.tick().await;
                if paused.load(Ordering::SeqCst) {
                    continue;
                }
                let seconds = elapsed.fetch_add(1, Ordering::SeqCst) + 1;
                let _ = tick_tx.send(seconds);
            }
        }));

        tracing::debug!("Session timer started");
    }

    /// Freeze the count. No ticks are delivered while paused.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    /// Continue ticking from the frozen count, not from zero.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Return to zero and stop ticking.
    pub fn reset(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.paused.store(false, Ordering::SeqCst);
        self.elapsed.store(0, Ordering::SeqCst);
        let _ = self.tick_tx.send(0);
    }

    /// Authoritative whole-second count.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    /// Advisory tick stream for display.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tick_tx.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Render a second count as `MM:SS` for display.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
