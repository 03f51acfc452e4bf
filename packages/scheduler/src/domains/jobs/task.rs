//! Task kinds - the closed set of work the pipeline dispatches.

use serde::{Deserialize, Serialize};

// ============================================================================
// Enums
// ============================================================================

/// Every kind of work a job can carry. The dispatcher routes on this enum,
/// so the routing table is total by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_kind", rename_all = "snake_case")]
pub enum TaskKind {
    WebsiteScrape,
    InstagramScrape,
    CreateMedia,
    PostImageInstagram,
    PostImageWhatsapp,
    PostVideoInstagram,
    PostVideoWhatsapp,
    MonitorVideo,
}

impl TaskKind {
    /// Canonical human-readable label for this kind.
    pub fn task_name(&self) -> &'static str {
        match self {
            TaskKind::WebsiteScrape => "web scrape",
            TaskKind::InstagramScrape => "insta scrape",
            TaskKind::CreateMedia => "create media",
            TaskKind::PostImageInstagram => "post image instagram",
            TaskKind::PostImageWhatsapp => "post image whatsapp",
            TaskKind::PostVideoInstagram => "post video instagram",
            TaskKind::PostVideoWhatsapp => "post video whatsapp",
            TaskKind::MonitorVideo => "monitor video",
        }
    }

    /// Resolve a kind from a free-form task label.
    ///
    /// Rows written by legacy collaborators carry only `task_name`; this is
    /// the compatibility path for them. Matching is case-insensitive
    /// substring matching, with the whatsapp qualifier checked inside the
    /// post family so a label like "Post Image WhatsApp Batch" routes to
    /// WhatsApp rather than falling through to the Instagram default.
    pub fn parse(task_name: &str) -> Option<Self> {
        let name = task_name.to_lowercase();

        if name.contains("web scrape") {
            Some(TaskKind::WebsiteScrape)
        } else if name.contains("insta scrape") {
            Some(TaskKind::InstagramScrape)
        } else if name.contains("create media") {
            Some(TaskKind::CreateMedia)
        } else if name.contains("monitor video") {
            Some(TaskKind::MonitorVideo)
        } else if name.contains("post image") {
            if name.contains("whatsapp") {
                Some(TaskKind::PostImageWhatsapp)
            } else {
                Some(TaskKind::PostImageInstagram)
            }
        } else if name.contains("post video") {
            if name.contains("whatsapp") {
                Some(TaskKind::PostVideoWhatsapp)
            } else {
                Some(TaskKind::PostVideoInstagram)
            }
        } else {
            None
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.task_name())
    }
}
