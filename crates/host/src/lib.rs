//! Host-side collaborators of the startup switcher: loaded projects, launch
//! settings adapters, observed startup state and file watching.
//! 啟動切換功能的宿主端協作元件：已載入專案、啟動設定轉接、觀察到的啟動狀態與檔案監看。

mod host;
mod launch;
mod memory;
mod native;
mod observed;
mod project;
mod watch;

pub use host::{observe_startup_state, Host, HostError};
pub use launch::{LaunchAdapter, LaunchField};
pub use memory::{
    HostChange, HostSnapshot, InMemoryHost, ProjectSnapshot, RecordedChange, SnapshotError,
};
pub use native::{DebuggerFlavor, NativeDebugSettings};
pub use observed::{LaunchSettings, ObservedProjectState, ObservedStartupState};
pub use project::{LaunchCapability, LoadedProject, ProjectId};
pub use watch::{FileWatch, ManualWatcher, NotifyWatcher, WatchError, WatchHandle};
