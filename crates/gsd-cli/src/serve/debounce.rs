//! Debounced, serialized rebuilds.
//!
//! [`Debouncer::touch`] restarts a quiet-period timer on every file change.
//! When the timer fires it asks the [`RebuildScheduler`] for a rebuild,
//! which runs at most one rebuild at a time and folds any requests made
//! meanwhile into a single follow-up run.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

type RebuildFn = dyn Fn() + Send + Sync;

#[derive(Debug, Default)]
struct Flags {
    busy: bool,
    pending: bool,
    closed: bool,
}

struct SchedulerInner {
    flags: Mutex<Flags>,
    task: Mutex<Option<JoinHandle<()>>>,
    rebuild: Arc<RebuildFn>,
}

impl SchedulerInner {
    /// Called after each run; true when a queued request needs another run.
    fn finish_run(&self) -> bool {
        let mut flags = self.flags.lock();
        if flags.pending && !flags.closed {
            flags.pending = false;
            return true;
        }
        flags.busy = false;
        false
    }

    async fn run(self: Arc<Self>) {
        loop {
            let rebuild = self.rebuild.clone();
            if let Err(err) = tokio::task::spawn_blocking(move || rebuild()).await {
                tracing::error!(error = %err, "rebuild task panicked");
            }
            if !self.finish_run() {
                break;
            }
            tracing::debug!("running queued rebuild");
        }
    }
}

/// Runs rebuilds one at a time on the blocking pool.
#[derive(Clone)]
pub struct RebuildScheduler {
    inner: Arc<SchedulerInner>,
}

impl RebuildScheduler {
    pub fn new(rebuild: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                flags: Mutex::new(Flags::default()),
                task: Mutex::new(None),
                rebuild: Arc::new(rebuild),
            }),
        }
    }

    /// Start a rebuild now, or queue one if a rebuild is in flight.
    pub fn request(&self) {
        let mut flags = self.inner.flags.lock();
        if flags.closed {
            return;
        }
        if flags.busy {
            flags.pending = true;
            tracing::debug!("rebuild in progress; queued another");
            return;
        }
        flags.busy = true;

        // stored under the flags lock so a finishing run can't race the handle
        let handle = tokio::spawn(self.inner.clone().run());
        *self.inner.task.lock() = Some(handle);
    }

    pub fn is_busy(&self) -> bool {
        self.inner.flags.lock().busy
    }

    /// Wait for the in-flight rebuild, including any queued follow-up.
    pub async fn wait_idle(&self) {
        let handle = self.inner.task.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    /// Refuse further requests, drop a queued one and let the current rebuild finish.
    pub async fn shutdown(&self) {
        {
            let mut flags = self.inner.flags.lock();
            flags.closed = true;
            flags.pending = false;
        }
        self.wait_idle().await;
    }
}

/// Coalesces bursts of changes into one rebuild request.
pub struct Debouncer {
    window: Duration,
    scheduler: RebuildScheduler,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(window: Duration, scheduler: RebuildScheduler) -> Self {
        Self {
            window,
            scheduler,
            timer: Mutex::new(None),
        }
    }

    /// Restart the quiet period.
    pub fn touch(&self) {
        let scheduler = self.scheduler.clone();
        let window = self.window;
        let next = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            scheduler.request();
        });
        if let Some(previous) = self.timer.lock().replace(next) {
            previous.abort();
        }
    }

    pub fn scheduler(&self) -> &RebuildScheduler {
        &self.scheduler
    }

    /// Cancel the pending timer and wait for an in-flight rebuild.
    pub async fn shutdown(&self) {
        let timer = self.timer.lock().take();
        if let Some(timer) = timer {
            timer.abort();
        }
        self.scheduler.shutdown().await;
    }
}
