use std::time::Duration;

use serde::Serialize;

/// How long a banner stays up.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Update,
    Delete,
    Error,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Update => "update",
            NoticeKind::Delete => "delete",
            NoticeKind::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
}

/// Identifies one `show`. Only the ticket of the latest banner can hide it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoticeTicket(u64);

#[derive(Clone, Debug, Default)]
pub struct NoticeBanner {
    current: Option<Notice>,
    visible: bool,
    generation: u64,
}

impl NoticeBanner {
    pub fn show(&mut self, message: impl Into<String>, kind: NoticeKind) -> NoticeTicket {
        self.generation += 1;
        self.current = Some(Notice {
            message: message.into(),
            kind,
        });
        self.visible = true;
        NoticeTicket(self.generation)
    }

    /// Hides the banner if `ticket` belongs to the one on screen.
    pub fn hide(&mut self, ticket: NoticeTicket) -> bool {
        if ticket.0 != self.generation || !self.visible {
            return false;
        }
        self.visible = false;
        true
    }

    pub fn visible(&self) -> Option<&Notice> {
        self.current.as_ref().filter(|_| self.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_ticket_leaves_newer_banner_up() {
        let mut banner = NoticeBanner::default();
        let first = banner.show("Employee added successfully", NoticeKind::Success);
        let second = banner.show("Employee ID already exists", NoticeKind::Error);

        assert!(!banner.hide(first));
        assert_eq!(
            banner.visible().map(|n| n.kind),
            Some(NoticeKind::Error)
        );

        assert!(banner.hide(second));
        assert!(banner.visible().is_none());
        assert!(!banner.hide(second));
    }
}
