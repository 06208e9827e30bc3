//! Screen identifier enum.

use std::fmt;

/// Identifies each primary TUI screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Dashboard, // 1
    Search, // 2
    /// Opened from a server row; not in the tab bar.
    ServerDetail,
}

impl ScreenId {
    /// Screens in tab-bar order.
    pub const ALL: [ScreenId; 2] = [Self::Dashboard, Self::Search];

    /// Numeric key for this screen; 0 for screens outside the tab bar.
    pub fn number(self) -> u8 {
        match self {
            Self::Dashboard => 1,
            Self::Search => 2,
            Self::ServerDetail => 0,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Dashboard),
            2 => Some(Self::Search),
            _ => None,
        }
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL
            .get((idx + 1) % Self::ALL.len())
            .copied()
            .unwrap_or_default()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Search => "Search",
            Self::ServerDetail => "Server",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Dashboard.next(), ScreenId::Search);
        assert_eq!(ScreenId::Search.next(), ScreenId::Dashboard);
        // Off-bar screens cycle back into the bar.
        assert_eq!(ScreenId::ServerDetail.next(), ScreenId::Search);
    }

    #[test]
    fn number_keys_round_trip() {
        for id in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(id.number()), Some(id));
        }
        assert_eq!(ScreenId::from_number(3), None);
    }
}
