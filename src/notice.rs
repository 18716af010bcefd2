//! Messages waiting to be shown to the user one at a time.

use std::collections::VecDeque;

use log::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Notices {
    queue: VecDeque<Notice>,
}

impl Notices {
    pub fn push(&mut self, level: NoticeLevel, title: impl Into<String>, message: impl Into<String>) {
        let notice = Notice {
            level,
            title: title.into(),
            message: message.into(),
        };
        match level {
            NoticeLevel::Info => info!("{}: {}", notice.title, notice.message),
            NoticeLevel::Warning => warn!("{}: {}", notice.title, notice.message),
            NoticeLevel::Error => error!("{}: {}", notice.title, notice.message),
        }
        self.queue.push_back(notice);
    }

    pub fn info(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NoticeLevel::Info, title, message);
    }

    pub fn warning(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.push(NoticeLevel::Warning, title, message);
    }

    /// Report a failed action with its full context chain
    pub fn error(&mut self, title: impl Into<String>, err: &anyhow::Error) {
        self.push(NoticeLevel::Error, title, format!("{err:#}"));
    }

    pub fn current(&self) -> Option<&Notice> {
        self.queue.front()
    }

    pub fn dismiss(&mut self) -> Option<Notice> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
