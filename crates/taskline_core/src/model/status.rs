//! Shared lifecycle status for tasks and todos.

use serde::{Deserialize, Serialize};

/// Lifecycle state shared by `Task` and `Todo`.
///
/// No transition rules are enforced; any status may replace any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Not started.
    #[default]
    Pending,
    /// In progress.
    Doing,
    /// Completed.
    Done,
    /// No longer actionable.
    Cancelled,
}

impl Status {
    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Doing => "doing",
            Self::Done => "done",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a stable storage/wire name.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "doing" => Some(Self::Doing),
            "done" => Some(Self::Done),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Status;

    #[test]
    fn parse_accepts_every_stable_name() {
        for status in [
            Status::Pending,
            Status::Doing,
            Status::Done,
            Status::Cancelled,
        ] {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        assert_eq!(Status::parse("in_progress"), None);
    }
}
