use std::borrow::Borrow;

use serde::Serialize;

use crate::model::{AccountNotice, NoticeKind};

const QUEUE_SUFFIX: &str = " To enter the migration queue right now, please ";
const SCHEDULE_SUFFIX: &str = " To schedule your migration, please ";
const LINK_TEXT: &str = "click here";

/// Warning banner on a server that has a pending or scheduled migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationNotice {
    pub text: String,
    pub kind: NoticeKind,
}

impl MigrationNotice {
    pub fn new(text: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Banner for the first migration notice in `notices`, if any.
    pub fn from_notices<N: Borrow<AccountNotice>>(notices: &[N]) -> Option<Self> {
        notices
            .iter()
            .map(<N as Borrow<AccountNotice>>::borrow)
            .find(|n| n.kind.is_migration())
            .map(|n| Self::new(n.message.clone(), n.kind))
    }

    /// Sentence leading into the link.
    pub fn suffix(&self) -> &'static str {
        match self.kind {
            NoticeKind::MigrationScheduled => QUEUE_SUFFIX,
            _ => SCHEDULE_SUFFIX,
        }
    }

    pub fn link_text(&self) -> &'static str {
        LINK_TEXT
    }

    /// Text before the link, with the link and the closing period after.
    pub fn parts(&self) -> (String, &'static str, &'static str) {
        (format!("{}{}", self.text, self.suffix()), LINK_TEXT, ".")
    }

    /// The whole banner as one line.
    pub fn render(&self) -> String {
        let (lead, link, tail) = self.parts();
        format!("{lead}{link}{tail}")
    }

    /// Activating the link hands the notice kind back to the caller as is.
    pub fn activate<R>(&self, on_click: impl FnOnce(NoticeKind) -> R) -> R {
        on_click(self.kind)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::NoticeSeverity;

    fn notice(kind: NoticeKind, message: &str) -> AccountNotice {
        AccountNotice {
            kind,
            message: message.into(),
            label: None,
            severity: NoticeSeverity::Major,
            entity: None,
        }
    }

    #[test]
    fn scheduled_migration_offers_the_queue() {
        let banner = MigrationNotice::new(
            "A migration is scheduled for this server.",
            NoticeKind::MigrationScheduled,
        );
        insta::assert_snapshot!(banner.render(), @"A migration is scheduled for this server. To enter the migration queue right now, please click here.");
    }

    #[test]
    fn other_kinds_offer_scheduling() {
        let banner = MigrationNotice::new("This server must migrate.", NoticeKind::MigrationPending);
        insta::assert_snapshot!(banner.render(), @"This server must migrate. To schedule your migration, please click here.");

        let odd = MigrationNotice::new("Heads up.", NoticeKind::Other);
        assert_eq!(odd.suffix(), SCHEDULE_SUFFIX);
    }

    #[test]
    fn activation_forwards_kind_uninterpreted() {
        let banner = MigrationNotice::new("x", NoticeKind::MigrationPending);
        let seen = banner.activate(|kind| kind);
        assert_eq!(seen, NoticeKind::MigrationPending);
    }

    #[test]
    fn picks_first_migration_notice() {
        let notices = vec![
            notice(NoticeKind::Maintenance, "maintenance window"),
            notice(NoticeKind::MigrationPending, "migrate me"),
        ];
        let banner = MigrationNotice::from_notices(&notices).unwrap();
        assert_eq!(banner.text, "migrate me");
        assert!(MigrationNotice::from_notices(&notices[..1]).is_none());
    }
}
