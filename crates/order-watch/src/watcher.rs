//! Directory watcher
//!
//! # Lifecycle
//!
//! ```text
//!  Idle ──start()──▶ Running ──stop()──▶ Stopped
//!                       │
//!                       └──OS error / directory removed──▶ Failed
//! ```
//!
//! `start` registers a native, non-recursive OS watch on the directory, queues
//! every file already present (in name order) and then spawns two tasks:
//!
//! - the watch loop, which waits for create/modify events, filters them by
//!   extension and by the seen-set, and queues each new file for delivery;
//! - the delivery task, which waits out the debounce and invokes the callback.
//!
//! Splitting the two means a slow callback delays other deliveries but never
//! the detection of new files.
//!
//! Delivery goes through a gate that `stop` closes. Closing waits for any
//! callback already running, so once `stop` returns no callback runs again.
//! For the same reason the callback must not call `stop` itself.

use crate::config::WatchConfig;
use crate::error::WatchError;
use crate::seen::SeenFiles;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::{Mutex, RwLock};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Callback invoked once per newly detected file
pub type FileCallback = Arc<dyn Fn(&Path) + Send + Sync>;

/// Watcher lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Created, not started
    Idle,
    /// Watching
    Running,
    /// Stopped by the caller
    Stopped,
    /// Watch loop died with an error
    Failed,
}

/// A file queued for the callback
#[derive(Debug)]
struct Pending {
    path: PathBuf,
    due: Instant,
}

/// Watches one directory and reports each new file name once
pub struct DirectoryWatcher {
    config: WatchConfig,
    callback: FileCallback,
    state: Arc<RwLock<WatchState>>,
    seen: Arc<SeenFiles>,
    /// true while callbacks may run
    gate: Arc<RwLock<bool>>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<Result<(), WatchError>>>>,
}

impl std::fmt::Debug for DirectoryWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryWatcher")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("seen", &self.seen.len())
            .finish()
    }
}

impl DirectoryWatcher {
    /// Create a watcher, failing fast if the directory is not usable
    pub fn new(config: WatchConfig, callback: FileCallback) -> Result<Self, WatchError> {
        check_directory(&config.directory)?;
        Ok(Self {
            config,
            callback,
            state: Arc::new(RwLock::new(WatchState::Idle)),
            seen: Arc::new(SeenFiles::new()),
            gate: Arc::new(RwLock::new(true)),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        })
    }

    /// Create a watcher from a plain closure
    pub fn with_callback<F>(config: WatchConfig, callback: F) -> Result<Self, WatchError>
    where
        F: Fn(&Path) + Send + Sync + 'static,
    {
        Self::new(config, Arc::new(callback))
    }

    /// Current lifecycle state
    pub fn state(&self) -> WatchState {
        *self.state.read()
    }

    /// The configuration in use
    pub fn config(&self) -> &WatchConfig {
        &self.config
    }

    /// File names reported so far, including files found at startup
    pub fn seen(&self) -> &SeenFiles {
        &self.seen
    }

    /// Begin watching
    ///
    /// Must be called from within a Tokio runtime. A watcher runs once:
    /// calling `start` again, or after `stop`, only logs.
    pub fn start(&self) -> Result<(), WatchError> {
        // Held until the watcher is running so concurrent starts serialize
        let mut state = self.state.write();
        if *state != WatchState::Idle {
            info!(state = ?*state, dir = %self.config.directory.display(), "Watcher already started, ignoring");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| WatchError::NoRuntime)?;
        let dir = self.config.directory.clone();
        check_directory(&dir)?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let mut os_watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            // Receiver gone means the loop already exited
            let _ = event_tx.send(res);
        })
        .map_err(|source| WatchError::Setup {
            path: dir.clone(),
            source,
        })?;
        os_watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatchError::Setup {
                path: dir.clone(),
                source,
            })?;

        // Scan after the watch is registered so nothing slips between the two
        let existing = existing_files(&self.config)?;
        let (deliver_tx, deliver_rx) = mpsc::unbounded_channel();
        let now = Instant::now();
        for path in existing {
            if self.mark(&path) {
                let _ = deliver_tx.send(Pending { path, due: now });
            }
        }

        runtime.spawn(deliver_loop(
            deliver_rx,
            self.callback.clone(),
            self.gate.clone(),
            self.cancel.clone(),
        ));

        let watch = WatchLoop {
            config: self.config.clone(),
            seen: self.seen.clone(),
            state: self.state.clone(),
            cancel: self.cancel.clone(),
            deliver_tx,
        };
        let handle = runtime.spawn(watch.run(os_watcher, event_rx));

        *self.task.lock() = Some(handle);
        *state = WatchState::Running;
        info!(
            dir = %self.config.directory.display(),
            existing = self.seen.len(),
            "Watcher started"
        );
        Ok(())
    }

    /// Stop watching
    ///
    /// Safe to call from any thread and more than once. Returns after any
    /// in-flight callback has finished; no callback starts afterwards. The
    /// OS watch is released when the watch loop observes the cancellation.
    pub fn stop(&self) {
        *self.gate.write() = false;
        self.cancel.cancel();

        let mut state = self.state.write();
        if matches!(*state, WatchState::Idle | WatchState::Running) {
            *state = WatchState::Stopped;
            info!(dir = %self.config.directory.display(), "Watcher stopped");
        }
    }

    /// Wait for the watch loop to finish
    ///
    /// `Ok(())` means it was stopped by the caller (or never started); an
    /// error means it died. The outcome is reported to the first caller only.
    pub async fn join(&self) -> Result<(), WatchError> {
        let handle = self.task.lock().take();
        match handle {
            Some(handle) => match handle.await {
                Ok(result) => result,
                Err(e) => {
                    error!(error = %e, "Watch loop task aborted");
                    Err(WatchError::ChannelClosed)
                }
            },
            None => Ok(()),
        }
    }

    fn mark(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.seen.mark(name))
    }
}

impl Drop for DirectoryWatcher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// State moved into the watch loop task
struct WatchLoop {
    config: WatchConfig,
    seen: Arc<SeenFiles>,
    state: Arc<RwLock<WatchState>>,
    cancel: CancellationToken,
    deliver_tx: mpsc::UnboundedSender<Pending>,
}

impl WatchLoop {
    async fn run(
        self,
        os_watcher: RecommendedWatcher,
        mut events: mpsc::UnboundedReceiver<notify::Result<Event>>,
    ) -> Result<(), WatchError> {
        let result = loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break Ok(()),

                event = events.recv() => match event {
                    Some(Ok(event)) => {
                        if let Err(e) = self.handle(event) {
                            break Err(e);
                        }
                    }
                    Some(Err(e)) => break Err(WatchError::Runtime(e)),
                    None => break Err(WatchError::ChannelClosed),
                },
            }
        };
        drop(os_watcher);

        if let Err(ref e) = result {
            // A caller stop racing the failure wins
            let mut state = self.state.write();
            if *state == WatchState::Running {
                *state = WatchState::Failed;
            }
            error!(dir = %self.config.directory.display(), error = %e, "Watch loop terminated");
        } else {
            debug!(dir = %self.config.directory.display(), "Watch loop exited");
        }
        result
    }

    fn handle(&self, event: Event) -> Result<(), WatchError> {
        match event.kind {
            EventKind::Create(_) | EventKind::Modify(_) => {
                let due = Instant::now() + self.config.debounce;
                for path in event.paths {
                    if !self.config.accepts(&path) || !path.is_file() {
                        continue;
                    }
                    let Some(name) = path.file_name() else {
                        continue;
                    };
                    if self.seen.mark(name) {
                        debug!(path = %path.display(), "New file detected");
                        let _ = self.deliver_tx.send(Pending { path, due });
                    }
                }
                Ok(())
            }
            EventKind::Remove(_) if !self.config.directory.is_dir() => {
                Err(WatchError::DirectoryRemoved {
                    path: self.config.directory.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

async fn deliver_loop(
    mut queue: mpsc::UnboundedReceiver<Pending>,
    callback: FileCallback,
    gate: Arc<RwLock<bool>>,
    cancel: CancellationToken,
) {
    while let Some(Pending { path, due }) = queue.recv().await {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = time::sleep_until(due) => {}
        }

        if !deliver(&gate, &callback, &path) {
            return;
        }
    }
}

/// Run the callback unless the gate is closed; returns false when closed
///
/// The gate stays read-locked for the duration of the call, which is what
/// makes `stop` wait for it.
fn deliver(gate: &RwLock<bool>, callback: &FileCallback, path: &Path) -> bool {
    let open = gate.read();
    if !*open {
        return false;
    }
    let delivered = panic::catch_unwind(AssertUnwindSafe(|| callback(path)));
    if delivered.is_err() {
        warn!(path = %path.display(), "File callback panicked");
    }
    true
}

fn check_directory(dir: &Path) -> Result<(), WatchError> {
    if !dir.exists() {
        return Err(WatchError::DirectoryMissing {
            path: dir.to_path_buf(),
        });
    }
    if !dir.is_dir() {
        return Err(WatchError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Accepted files already in the directory, sorted by name
fn existing_files(config: &WatchConfig) -> Result<Vec<PathBuf>, WatchError> {
    let setup = |e: std::io::Error| WatchError::Setup {
        path: config.directory.clone(),
        source: notify::Error::io(e),
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(&config.directory).map_err(setup)? {
        let path = entry.map_err(setup)?.path();
        if path.is_file() && config.accepts(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = DirectoryWatcher::with_callback(WatchConfig::new(&missing), |_| {}).unwrap_err();
        assert!(matches!(err, WatchError::DirectoryMissing { .. }));

        let file = dir.path().join("orders.json");
        std::fs::write(&file, "{}").unwrap();
        let err = DirectoryWatcher::with_callback(WatchConfig::new(&file), |_| {}).unwrap_err();
        assert!(matches!(err, WatchError::NotADirectory { .. }));
    }

    #[test]
    fn test_start_outside_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = DirectoryWatcher::with_callback(WatchConfig::new(dir.path()), |_| {}).unwrap();
        assert!(matches!(watcher.start(), Err(WatchError::NoRuntime)));
        assert_eq!(watcher.state(), WatchState::Idle);
    }

    #[test]
    fn test_existing_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.xml", "a.json", "c.txt"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.json")).unwrap();

        let files = existing_files(&WatchConfig::new(dir.path())).unwrap();
        let names: Vec<_> = files
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, vec!["a.json", "b.xml"]);
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = DirectoryWatcher::with_callback(WatchConfig::new(dir.path()), |_| {}).unwrap();
        watcher.stop();
        watcher.start().unwrap();
        assert_eq!(watcher.state(), WatchState::Stopped);
        assert!(watcher.join().await.is_ok());
    }

    #[tokio::test]
    async fn test_stop_unblocks_idle_loop() {
        let dir = tempfile::tempdir().unwrap();
        let watcher = DirectoryWatcher::with_callback(WatchConfig::new(dir.path()), |_| {}).unwrap();
        watcher.start().unwrap();
        assert_eq!(watcher.state(), WatchState::Running);

        watcher.stop();
        watcher.stop();
        let joined = time::timeout(Duration::from_secs(2), watcher.join()).await;
        assert!(matches!(joined, Ok(Ok(()))));
        assert_eq!(watcher.state(), WatchState::Stopped);
    }
}
