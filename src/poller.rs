//! Cancellable scheduling for the widget refresh cycle.
//!
//! The schedule is an explicit task owned by the caller: `start` spawns
//! it, `stop` aborts it, starting again restarts it. Nothing keeps
//! polling past teardown.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{error, info, warn};

use crate::client::VolatilitySource;
use crate::config::WidgetConfig;
use crate::display::FrameSink;
use crate::models::Selection;
use crate::run_widget;

/// Handle over one spawned refresh loop.
pub struct RefreshTask {
    handle: Option<JoinHandle<()>>,
}

impl RefreshTask {
    pub fn idle() -> Self {
        Self { handle: None }
    }

    /// Starts (or restarts) the task, aborting any previous run first.
    pub fn start<F>(&mut self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.stop();
        self.handle = Some(tokio::spawn(fut));
    }

    /// Aborts the running task. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for RefreshTask {
    fn drop(&mut self) {
        self.stop();
    }
}

/// One running widget: the refresh task plus the command channel a
/// user-input collaborator feeds selection changes into.
pub struct WidgetHandle {
    name: String,
    commands: mpsc::Sender<Selection>,
    task: RefreshTask,
}

impl WidgetHandle {
    /// Spawns the refresh loop for `cfg` and returns its handle.
    pub fn spawn(
        cfg: WidgetConfig,
        period: Duration,
        source: Arc<dyn VolatilitySource>,
        sink: Arc<dyn FrameSink>,
    ) -> Self {
        let name = cfg.name.clone();
        let task_name = cfg.name.clone();
        let (tx, rx) = mpsc::channel(8);

        let mut task = RefreshTask::idle();
        task.start(async move {
            if let Err(e) = run_widget(cfg, period, source, sink, rx).await {
                error!("❌ [{}] Widget loop terminated: {}", task_name, e);
            }
        });

        Self {
            name,
            commands: tx,
            task,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies a new instrument/window/metric selection. The running loop
    /// cancels its pending refresh, resets the range and fetches
    /// immediately.
    pub async fn apply_selection(&self, selection: Selection) {
        if self.commands.send(selection).await.is_err() {
            warn!("[{}] Selection dropped: widget is not running", self.name);
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_running()
    }

    /// Stops the refresh loop so no polling leaks past teardown.
    pub fn stop(&mut self) {
        info!("🛑 [{}] Stopping widget", self.name);
        self.task.stop();
    }
}
