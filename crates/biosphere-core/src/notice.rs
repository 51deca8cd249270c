//! Transient player-facing notices that dismiss themselves after a delay

use std::collections::VecDeque;

/// Seconds a notice stays visible unless configured otherwise
pub const DEFAULT_NOTICE_SECONDS: f32 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn label(&self) -> &'static str {
        match self {
            NoticeLevel::Success => "ok",
            NoticeLevel::Info => "info",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    /// Seconds left before auto-dismiss
    pub remaining: f32,
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level.label(), self.message)
    }
}

/// Queue of active notices, oldest first
#[derive(Debug, Clone)]
pub struct NoticeBoard {
    notices: VecDeque<Notice>,
    duration: f32,
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_SECONDS)
    }
}

impl NoticeBoard {
    pub fn new(duration: f32) -> Self {
        Self {
            notices: VecDeque::new(),
            duration: duration.max(0.0),
        }
    }

    pub fn post(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let notice = Notice {
            level,
            message: message.into(),
            remaining: self.duration,
        };
        match level {
            NoticeLevel::Error => log::error!("{}", notice.message),
            NoticeLevel::Warning => log::warn!("{}", notice.message),
            NoticeLevel::Success | NoticeLevel::Info => log::info!("{}", notice.message),
        }
        self.notices.push_back(notice);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.post(NoticeLevel::Success, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.post(NoticeLevel::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.post(NoticeLevel::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.post(NoticeLevel::Error, message);
    }

    /// Advance timers and drop expired notices
    pub fn tick(&mut self, delta_time: f32) {
        for notice in &mut self.notices {
            notice.remaining -= delta_time;
        }
        self.notices.retain(|n| n.remaining > 0.0);
    }

    pub fn active(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}
