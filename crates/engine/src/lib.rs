//! Startup configuration engine: reference resolution, dropdown catalog,
//! active-configuration matching, activation and reconciliation.
//! 啟動設定核心：參考解析、下拉選單、目前設定比對、套用與重新同步。

mod activation;
mod catalog;
mod matcher;
mod recent;
mod resolver;
mod session;

pub use activation::{
    ActivationController, ActivationError, ActivationReport, ActivationWarning, ReactionGuard,
    SuppressionFlag,
};
pub use catalog::{
    build_catalog, Catalog, CatalogMode, DropdownEntry, MultiProjectEntry, OtherEntry,
    SingleProjectEntry, CONFIGURE_LABEL,
};
pub use matcher::{find_active_entry, score_configuration};
pub use recent::{RecentProjects, DEFAULT_RECENT_CAPACITY};
pub use resolver::{
    resolve, ResolutionWarning, ResolvedConfiguration, ResolvedMultiConfiguration,
    ResolvedProjectReference,
};
pub use session::{SessionError, SessionOptions, StartupSession};
