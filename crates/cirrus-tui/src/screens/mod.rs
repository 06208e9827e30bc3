//! Screen implementations. Each screen is a top-level Component.

pub mod dashboard;
pub mod search;
pub mod server_detail;

use cirrus_core::SearchSettings;

use crate::component::Component;
use crate::screen::ScreenId;

/// Create every screen component, including the ones outside the tab bar.
pub fn create_screens(search: SearchSettings) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Dashboard,
            Box::new(dashboard::DashboardScreen::new()),
        ),
        (
            ScreenId::Search,
            Box::new(search::SearchScreen::new(search.group_size)),
        ),
        (
            ScreenId::ServerDetail,
            Box::new(server_detail::ServerDetailScreen::new()),
        ),
    ]
}
