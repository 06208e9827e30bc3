use serde::Serialize;

use crate::model::Server;

pub const DOCS_TITLE: &str = "Cirrus Docs";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocLink {
    pub title: String,
    pub src: String,
    pub body: String,
}

impl DocLink {
    pub fn new(title: &str, src: &str, body: &str) -> Self {
        Self {
            title: title.to_owned(),
            src: src.to_owned(),
            body: body.to_owned(),
        }
    }
}

/// Links shown next to the dashboard.
pub fn default_docs() -> Vec<DocLink> {
    vec![
        DocLink::new(
            "Getting started with servers",
            "https://docs.cirrus.example/servers/getting-started",
            "Deploy, secure and connect to your first server.",
        ),
        DocLink::new(
            "Backups",
            "https://docs.cirrus.example/servers/backups",
            "Automatic daily, weekly and snapshot backups.",
        ),
        DocLink::new(
            "Block storage volumes",
            "https://docs.cirrus.example/volumes",
            "Attach extra storage to a server in the same region.",
        ),
    ]
}

/// Call-to-action shown while some servers run without backups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupsCta {
    /// Servers with backups disabled.
    pub unprotected: usize,
}

impl BackupsCta {
    pub fn message(&self) -> String {
        let noun = if self.unprotected == 1 { "server" } else { "servers" };
        format!(
            "{} {noun} without backups. Enable them to protect your data.",
            self.unprotected
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocsSidebar {
    pub title: &'static str,
    pub docs: Vec<DocLink>,
    pub backups_cta: Option<BackupsCta>,
}

impl DocsSidebar {
    /// `None` when there are no docs to show; the call-to-action alone
    /// never renders a sidebar.
    pub fn build<S: AsRef<Server>>(docs: &[DocLink], servers: &[S]) -> Option<Self> {
        if docs.is_empty() {
            return None;
        }
        let unprotected = servers
            .iter()
            .map(AsRef::<Server>::as_ref)
            .filter(|s| !s.backups.enabled)
            .count();
        Some(Self {
            title: DOCS_TITLE,
            docs: docs.to_vec(),
            backups_cta: (unprotected > 0).then_some(BackupsCta { unprotected }),
        })
    }
}
