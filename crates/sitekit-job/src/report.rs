//! Event reporting for job runs.
//!
//! The provisioner never logs directly; it hands [`JobMessage`]s to an
//! injected [`Reporter`]. [`Transcript`] keeps them, [`TracingReporter`]
//! forwards them to `tracing`, and a pair of reporters fans out to both.

use serde::{Deserialize, Serialize};
use sitekit_inventory::ObjectRef;

/// Severity of a job message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MessageLevel {
    Debug,
    Info,
    Success,
    Warning,
    Error,
}

impl MessageLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLevel::Debug => "debug",
            MessageLevel::Info => "info",
            MessageLevel::Success => "success",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One progress/result line of a job run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobMessage {
    pub level: MessageLevel,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<ObjectRef>,
}

impl JobMessage {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
            object: None,
        }
    }

    pub fn with_object(mut self, object: impl Into<ObjectRef>) -> Self {
        self.object = Some(object.into());
        self
    }
}

impl std::fmt::Display for JobMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.text)
    }
}

/// Sink for job messages.
pub trait Reporter {
    fn report(&mut self, message: JobMessage);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, message: JobMessage) {
        (**self).report(message);
    }
}

impl<A: Reporter, B: Reporter> Reporter for (A, B) {
    fn report(&mut self, message: JobMessage) {
        self.0.report(message.clone());
        self.1.report(message);
    }
}

/// Ordered record of every message of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<JobMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[JobMessage] {
        &self.messages
    }

    /// Messages at exactly `level`.
    pub fn at_level(&self, level: MessageLevel) -> impl Iterator<Item = &JobMessage> {
        self.messages.iter().filter(move |m| m.level == level)
    }

    /// Highest severity seen, if any.
    pub fn max_level(&self) -> Option<MessageLevel> {
        self.messages.iter().map(|m| m.level).max()
    }

    /// One line per message, `[level] text`.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Reporter for Transcript {
    fn report(&mut self, message: JobMessage) {
        self.messages.push(message);
    }
}

/// Forwards messages as `tracing` events under the `sitekit::job` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, message: JobMessage) {
        let object = message
            .object
            .as_ref()
            .map(|o| format!("{}:{}", o.kind, o.name))
            .unwrap_or_default();
        let text = message.text.as_str();
        match message.level {
            MessageLevel::Debug => tracing::debug!(target: "sitekit::job", object = %object, "{text}"),
            MessageLevel::Info => tracing::info!(target: "sitekit::job", object = %object, "{text}"),
            MessageLevel::Success => {
                tracing::info!(target: "sitekit::job", object = %object, outcome = "success", "{text}")
            }
            MessageLevel::Warning => tracing::warn!(target: "sitekit::job", object = %object, "{text}"),
            MessageLevel::Error => tracing::error!(target: "sitekit::job", object = %object, "{text}"),
        }
    }
}
