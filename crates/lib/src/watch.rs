//! Watch mode.
//!
//! Runs the pipeline once, then re-runs the whole pipeline whenever a
//! relevant file under the root changes. Runs never overlap. After each run
//! the watcher settles: events caused by the run's own writes are discarded
//! until the tree has been quiet for two debounce periods.

use std::ops::ControlFlow;
use std::path::{Component, Path};
use std::sync::mpsc::{Receiver, RecvTimeoutError, channel};

use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, DebouncedEventKind, new_debouncer};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::pipeline::{Pipeline, PipelineError, PipelineReport};
use crate::settings::{Settings, WatchSettings};

#[derive(Debug, Error)]
pub enum WatchError {
  #[error("failed to initialize file watcher: {0}")]
  WatcherInit(#[source] notify::Error),

  #[error("failed to watch {path}: {source}")]
  WatchPath { path: String, source: notify::Error },

  #[error("failed to start async runtime: {0}")]
  Runtime(#[source] std::io::Error),

  #[error("watch channel closed")]
  ChannelClosed,
}

/// Whether a change at `path` should trigger a run.
///
/// Paths outside `root`, under a hidden component (`.git`, the generated
/// `.mbuild` directories), under a directory named in `watch.ignore`, or
/// matching one of `watch.ignore_globs` are skipped.
pub fn is_relevant_change(root: &Path, path: &Path, watch: &WatchSettings) -> bool {
  let Ok(relative) = path.strip_prefix(root) else {
    return false;
  };
  if relative.as_os_str().is_empty() {
    return false;
  }
  if watch.ignore_globs.iter().any(|p| p.matches_path(relative)) {
    return false;
  }

  relative.components().all(|component| match component {
    Component::Normal(name) => {
      let name = name.to_string_lossy();
      !name.starts_with('.') && !watch.ignore.iter().any(|i| *i == name)
    }
    _ => true,
  })
}

/// Number of relevant changes in one debounced batch. Watcher errors are logged.
fn relevant_in(batch: DebounceEventResult, settings: &Settings) -> usize {
  match batch {
    Ok(events) => events
      .iter()
      .filter(|e| matches!(e.kind, DebouncedEventKind::Any))
      .filter(|e| is_relevant_change(&settings.root, &e.path, &settings.watch))
      .inspect(|e| debug!(path = %e.path.display(), "change detected"))
      .count(),
    Err(e) => {
      warn!(error = %e, "watch error, continuing");
      0
    }
  }
}

/// Discard every batch until none arrives for two debounce periods.
fn settle(rx: &Receiver<DebounceEventResult>, settings: &Settings) -> Result<(), WatchError> {
  let quiet = settings.watch.debounce * 2;
  let mut discarded = 0;
  loop {
    match rx.recv_timeout(quiet) {
      Ok(batch) => discarded += relevant_in(batch, settings),
      Err(RecvTimeoutError::Timeout) => break,
      Err(RecvTimeoutError::Disconnected) => return Err(WatchError::ChannelClosed),
    }
  }
  if discarded > 0 {
    debug!(discarded, "ignored changes written during the run");
  }
  Ok(())
}

/// Block until a batch with at least one relevant change arrives.
fn wait_for_change(rx: &Receiver<DebounceEventResult>, settings: &Settings) -> Result<usize, WatchError> {
  loop {
    let batch = rx.recv().map_err(|_| WatchError::ChannelClosed)?;
    let changes = relevant_in(batch, settings) + rx.try_iter().map(|b| relevant_in(b, settings)).sum::<usize>();
    if changes > 0 {
      return Ok(changes);
    }
  }
}

/// Run the pipeline now and after every relevant change under `settings.root`.
///
/// `on_run` receives the outcome of each run; returning
/// [`ControlFlow::Break`] stops watching. Failed runs do not stop the watcher.
pub fn watch_and_rebuild<F>(settings: &Settings, mut on_run: F) -> Result<(), WatchError>
where
  F: FnMut(Result<&PipelineReport, &PipelineError>) -> ControlFlow<()>,
{
  let runtime = tokio::runtime::Builder::new_current_thread()
    .enable_all()
    .build()
    .map_err(WatchError::Runtime)?;
  let pipeline = Pipeline::new(settings.pipeline_options());

  let (tx, rx) = channel();
  let mut debouncer = new_debouncer(settings.watch.debounce, tx).map_err(WatchError::WatcherInit)?;
  debouncer
    .watcher()
    .watch(&settings.root, RecursiveMode::Recursive)
    .map_err(|source| WatchError::WatchPath {
      path: settings.root.display().to_string(),
      source,
    })?;

  loop {
    let outcome = runtime.block_on(pipeline.run());
    if let Err(e) = &outcome {
      error!(error = %e, "pipeline run failed");
    }
    if on_run(outcome.as_ref()).is_break() {
      info!("watch stopped");
      return Ok(());
    }

    settle(&rx, settings)?;
    info!(root = %settings.root.display(), "watching for changes");
    let changes = wait_for_change(&rx, settings)?;
    info!(changes, "change detected, rebuilding");
  }
}
