use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient user-facing message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    expires_at: Instant,
}

/// Holds at most one notice; posting replaces the current one.
#[derive(Clone, Debug, Default)]
pub struct NoticeBoard {
    current: Option<Notice>,
}

impl NoticeBoard {
    pub fn post(&mut self, kind: NoticeKind, text: impl Into<String>, now: Instant) {
        self.current = Some(Notice {
            kind,
            text: text.into(),
            expires_at: now + NOTICE_TTL,
        });
    }

    pub fn success(&mut self, text: impl Into<String>, now: Instant) {
        self.post(NoticeKind::Success, text, now);
    }

    pub fn error(&mut self, text: impl Into<String>, now: Instant) {
        self.post(NoticeKind::Error, text, now);
    }

    /// The live notice at `now`, if any. Expired notices are dropped.
    pub fn current(&mut self, now: Instant) -> Option<&Notice> {
        if self.current.as_ref().is_some_and(|n| now >= n.expires_at) {
            self.current = None;
        }
        self.current.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compose/notice.rs"]
mod tests;
