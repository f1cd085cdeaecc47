use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use notify::event::{EventKind, ModifyKind};
use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
use thiserror::Error;
use tracing::debug;

/// Identifies one registered watch.
/// 代表一個已註冊的監看。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WatchHandle(u64);

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 監控檔案變更時可能回傳的錯誤。 / Error type for file watching operations.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("notify error: {0}")]
    Notify(#[from] notify::Error),
    #[error("unknown watch handle {0}")]
    UnknownHandle(WatchHandle),
    #[error("watch channel disconnected")]
    ChannelDisconnected,
}

/// Registers interest in external edits of single files.
/// 註冊對單一檔案外部修改的監看。
pub trait FileWatch {
    fn watch(&mut self, path: &Path) -> Result<WatchHandle, WatchError>;
    fn unwatch(&mut self, handle: WatchHandle) -> Result<(), WatchError>;
}

/// `notify`-backed watcher; the host waits on [`NotifyWatcher::recv_timeout`] from
/// its main thread and forwards hits to the session.
/// 以 `notify` 實作的監看器，由宿主在主執行緒輪詢變更。
///
/// The parent directory is watched instead of the file itself so editors that
/// save through a temporary file and rename are still noticed.
pub struct NotifyWatcher {
    watcher: RecommendedWatcher,
    rx: Receiver<PathBuf>,
    next_handle: u64,
    targets: HashMap<WatchHandle, PathBuf>,
    directories: HashMap<PathBuf, usize>,
}

impl NotifyWatcher {
    /// 建立新的監看器實例。 / Creates a new watcher instance.
    pub fn new() -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel();
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<notify::Event>| {
                if let Ok(event) = res {
                    if is_content_change(&event.kind) {
                        for path in event.paths {
                            let _ = tx.send(path);
                        }
                    }
                }
            },
            Config::default(),
        )?;

        Ok(Self {
            watcher,
            rx,
            next_handle: 1,
            targets: HashMap::new(),
            directories: HashMap::new(),
        })
    }

    /// Blocks until a watched file changes or the timeout elapses.
    /// 阻塞等待受監看檔案變更，逾時回傳 `None`。
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Option<PathBuf>, WatchError> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok(path) => {
                    if let Some(target) = self.matching_targets(&path).into_iter().next() {
                        return Ok(Some(target));
                    }
                }
                Err(mpsc::RecvTimeoutError::Timeout) => return Ok(None),
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    return Err(WatchError::ChannelDisconnected)
                }
            }
        }
    }

    fn matching_targets(&self, event_path: &Path) -> Vec<PathBuf> {
        self.targets
            .values()
            .filter(|target| same_file(event_path, target))
            .cloned()
            .collect()
    }
}

impl FileWatch for NotifyWatcher {
    fn watch(&mut self, path: &Path) -> Result<WatchHandle, WatchError> {
        let directory = watch_directory(path);
        let count = self.directories.entry(directory.clone()).or_insert(0);
        if *count == 0 {
            self.watcher
                .watch(&directory, RecursiveMode::NonRecursive)?;
        }
        *count += 1;

        let handle = WatchHandle(self.next_handle);
        self.next_handle += 1;
        self.targets.insert(handle, path.to_path_buf());
        debug!(path = %path.display(), %handle, "watching file");
        Ok(handle)
    }

    fn unwatch(&mut self, handle: WatchHandle) -> Result<(), WatchError> {
        let path = self
            .targets
            .remove(&handle)
            .ok_or(WatchError::UnknownHandle(handle))?;
        let directory = watch_directory(&path);
        if let Some(count) = self.directories.get_mut(&directory) {
            *count -= 1;
            if *count == 0 {
                self.directories.remove(&directory);
                self.watcher.unwatch(&directory)?;
            }
        }
        debug!(path = %path.display(), %handle, "stopped watching file");
        Ok(())
    }
}

/// Watcher that only records registrations; for hosts that deliver file
/// notifications themselves.
/// 僅記錄註冊狀態的監看器，供自行通知檔案變更的宿主使用。
#[derive(Debug, Default)]
pub struct ManualWatcher {
    next_handle: u64,
    targets: HashMap<WatchHandle, PathBuf>,
}

impl ManualWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_watching(&self, path: &Path) -> bool {
        self.targets.values().any(|target| target == path)
    }

    pub fn watched(&self) -> impl Iterator<Item = &PathBuf> {
        self.targets.values()
    }
}

impl FileWatch for ManualWatcher {
    fn watch(&mut self, path: &Path) -> Result<WatchHandle, WatchError> {
        self.next_handle += 1;
        let handle = WatchHandle(self.next_handle);
        self.targets.insert(handle, path.to_path_buf());
        Ok(handle)
    }

    fn unwatch(&mut self, handle: WatchHandle) -> Result<(), WatchError> {
        self.targets
            .remove(&handle)
            .map(|_| ())
            .ok_or(WatchError::UnknownHandle(handle))
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

fn watch_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn same_file(event_path: &Path, target: &Path) -> bool {
    if event_path == target {
        return true;
    }
    if event_path.file_name() != target.file_name() {
        return false;
    }
    let canonical = |path: &Path| {
        path.parent()
            .and_then(|parent| parent.canonicalize().ok())
            .unwrap_or_else(|| watch_directory(path))
    };
    canonical(event_path) == canonical(target)
}
