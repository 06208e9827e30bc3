// ── Presentation models ──
//
// Pure props -> view model mappings shared by the CLI and the TUI. Nothing
// in here writes to the store.

mod dashboard_card;
mod docs_sidebar;
mod migration_notice;
mod rescue;
mod result_groups;

pub use dashboard_card::{
    CardRow, CardSource, DashboardCard, EMPTY_MESSAGE, PlanLabels, dashboard_cards,
};
pub use docs_sidebar::{BackupsCta, DOCS_TITLE, DocLink, DocsSidebar, default_docs};
pub use migration_notice::MigrationNotice;
pub use rescue::{RescueDevices, eligible_rescue_volumes};
pub use result_groups::{ResultGroup, ResultGroups};
