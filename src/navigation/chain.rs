//! Running a launch plan
//!
//! Steps fire at their offsets until the plan runs out or the caller
//! cancels (typically because it believes an app already opened).

use crate::error::Result;
use crate::navigation::LaunchPlan;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Something that can open a URL (browser window, OS handler, stdout)
pub trait Opener: Send {
    fn open(&mut self, url: &str) -> Result<()>;
}

/// Shared cancellation flag for a running chain
#[derive(Debug, Clone, Default)]
pub struct ChainCancel {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ChainCancel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop the chain before its next step
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// What a chain run did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainOutcome {
    /// URLs opened, in order
    pub opened: Vec<String>,
    pub cancelled: bool,
}

/// Open each step of `plan` at its offset
///
/// If opening a step fails, the plan's web fallback is opened and the
/// chain ends there.
pub async fn run_chain<O: Opener>(
    plan: &LaunchPlan,
    opener: &mut O,
    cancel: &ChainCancel,
) -> ChainOutcome {
    let start = Instant::now();
    let mut opened = Vec::new();

    for step in &plan.steps {
        if cancel.is_cancelled() {
            break;
        }

        tokio::select! {
            _ = tokio::time::sleep_until(start + step.at) => {}
            _ = cancel.notify.notified() => {}
        }

        if cancel.is_cancelled() {
            break;
        }

        debug!(url = %step.url, "Opening navigation link");
        match opener.open(&step.url) {
            Ok(()) => opened.push(step.url.clone()),
            Err(e) => {
                warn!("Navigation link failed ({}), falling back to web", e);
                if opener.open(&plan.fallback).is_ok() {
                    opened.push(plan.fallback.clone());
                }
                break;
            }
        }
    }

    ChainOutcome {
        opened,
        cancelled: cancel.is_cancelled(),
    }
}
