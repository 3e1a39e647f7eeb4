//! Status, priority, and recurrence enums with string conversion, plus the
//! schedule state machine.
//!
//! Statuses are stored as TEXT in the database; these enums own the legal
//! string forms and every conversion goes through `as_str`/`parse`.

use std::fmt;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Schedule status
// ---------------------------------------------------------------------------

pub const STATUS_SCHEDULED: &str = "scheduled";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_OVERDUE: &str = "overdue";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid schedule statuses.
pub const VALID_SCHEDULE_STATUSES: &[&str] = &[
    STATUS_SCHEDULED,
    STATUS_IN_PROGRESS,
    STATUS_COMPLETED,
    STATUS_OVERDUE,
    STATUS_CANCELLED,
];

/// Lifecycle status of a PM schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleStatus {
    Scheduled,
    InProgress,
    Completed,
    Overdue,
    Cancelled,
}

/// Every schedule status.
pub const ALL_SCHEDULE_STATUSES: [ScheduleStatus; 5] = [
    ScheduleStatus::Scheduled,
    ScheduleStatus::InProgress,
    ScheduleStatus::Completed,
    ScheduleStatus::Overdue,
    ScheduleStatus::Cancelled,
];

impl ScheduleStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => STATUS_SCHEDULED,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Completed => STATUS_COMPLETED,
            Self::Overdue => STATUS_OVERDUE,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Parse from a string, returning an error for unknown statuses.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_SCHEDULED => Ok(Self::Scheduled),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_OVERDUE => Ok(Self::Overdue),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown schedule status: '{other}'. Valid statuses: {}",
                VALID_SCHEDULE_STATUSES.join(", ")
            ))),
        }
    }

    /// Terminal statuses admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        state_machine::valid_transitions(*self).is_empty()
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Transition table for [`ScheduleStatus`].
///
/// A single point of truth: every mutating operation validates against this
/// table instead of scattering `if` checks.
pub mod state_machine {
    use super::ScheduleStatus;

    /// Returns the set of statuses reachable from `from`.
    ///
    /// Terminal states (`completed`, `cancelled`) return an empty slice.
    pub fn valid_transitions(from: ScheduleStatus) -> &'static [ScheduleStatus] {
        use ScheduleStatus::*;
        match from {
            Scheduled => &[InProgress, Overdue, Cancelled],
            Overdue => &[InProgress, Cancelled],
            InProgress => &[Completed],
            Completed | Cancelled => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: ScheduleStatus, to: ScheduleStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// All statuses from which `to` is directly reachable.
    ///
    /// Mutating operations derive their "allowed from" sets here instead of
    /// hardcoding status lists.
    pub fn transition_sources(to: ScheduleStatus) -> Vec<ScheduleStatus> {
        super::ALL_SCHEDULE_STATUSES
            .iter()
            .copied()
            .filter(|from| can_transition(*from, to))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

pub const PRIORITY_LOW: &str = "low";
pub const PRIORITY_MEDIUM: &str = "medium";
pub const PRIORITY_HIGH: &str = "high";

/// All valid schedule priorities.
pub const VALID_PRIORITIES: &[&str] = &[PRIORITY_LOW, PRIORITY_MEDIUM, PRIORITY_HIGH];

/// Priority of a PM schedule. Defaults to medium at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => PRIORITY_LOW,
            Self::Medium => PRIORITY_MEDIUM,
            Self::High => PRIORITY_HIGH,
        }
    }

    /// Parse from a string, returning an error for unknown priorities.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            PRIORITY_LOW => Ok(Self::Low),
            PRIORITY_MEDIUM => Ok(Self::Medium),
            PRIORITY_HIGH => Ok(Self::High),
            other => Err(CoreError::Validation(format!(
                "Unknown priority: '{other}'. Valid priorities: {}",
                VALID_PRIORITIES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Recurrence interval
// ---------------------------------------------------------------------------

pub const INTERVAL_DAILY: &str = "daily";
pub const INTERVAL_WEEKLY: &str = "weekly";
pub const INTERVAL_MONTHLY: &str = "monthly";
pub const INTERVAL_QUARTERLY: &str = "quarterly";
pub const INTERVAL_YEARLY: &str = "yearly";

/// All valid recurrence interval types.
pub const VALID_INTERVAL_TYPES: &[&str] = &[
    INTERVAL_DAILY,
    INTERVAL_WEEKLY,
    INTERVAL_MONTHLY,
    INTERVAL_QUARTERLY,
    INTERVAL_YEARLY,
];

/// Recurrence unit of a PM template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalType {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl IntervalType {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => INTERVAL_DAILY,
            Self::Weekly => INTERVAL_WEEKLY,
            Self::Monthly => INTERVAL_MONTHLY,
            Self::Quarterly => INTERVAL_QUARTERLY,
            Self::Yearly => INTERVAL_YEARLY,
        }
    }

    /// Parse from a string, returning an error for unknown interval types.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            INTERVAL_DAILY => Ok(Self::Daily),
            INTERVAL_WEEKLY => Ok(Self::Weekly),
            INTERVAL_MONTHLY => Ok(Self::Monthly),
            INTERVAL_QUARTERLY => Ok(Self::Quarterly),
            INTERVAL_YEARLY => Ok(Self::Yearly),
            other => Err(CoreError::Validation(format!(
                "Unknown interval type: '{other}'. Valid types: {}",
                VALID_INTERVAL_TYPES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for IntervalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Execution status
// ---------------------------------------------------------------------------

pub const EXECUTION_IN_PROGRESS: &str = "in_progress";
pub const EXECUTION_COMPLETED: &str = "completed";

/// Status of a PM execution record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    InProgress,
    Completed,
}

impl ExecutionStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => EXECUTION_IN_PROGRESS,
            Self::Completed => EXECUTION_COMPLETED,
        }
    }

    /// Parse from a string, returning an error for unknown statuses.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            EXECUTION_IN_PROGRESS => Ok(Self::InProgress),
            EXECUTION_COMPLETED => Ok(Self::Completed),
            other => Err(CoreError::Validation(format!(
                "Unknown execution status: '{other}'"
            ))),
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Findings severity
// ---------------------------------------------------------------------------

pub const SEVERITY_NONE: &str = "none";
pub const SEVERITY_MINOR: &str = "minor";
pub const SEVERITY_MAJOR: &str = "major";
pub const SEVERITY_CRITICAL: &str = "critical";

/// All valid findings severities.
pub const VALID_SEVERITIES: &[&str] = &[
    SEVERITY_NONE,
    SEVERITY_MINOR,
    SEVERITY_MAJOR,
    SEVERITY_CRITICAL,
];

/// Severity of findings recorded during an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FindingsSeverity {
    #[default]
    None,
    Minor,
    Major,
    Critical,
}

impl FindingsSeverity {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => SEVERITY_NONE,
            Self::Minor => SEVERITY_MINOR,
            Self::Major => SEVERITY_MAJOR,
            Self::Critical => SEVERITY_CRITICAL,
        }
    }

    /// Parse from a string, returning an error for unknown severities.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            SEVERITY_NONE => Ok(Self::None),
            SEVERITY_MINOR => Ok(Self::Minor),
            SEVERITY_MAJOR => Ok(Self::Major),
            SEVERITY_CRITICAL => Ok(Self::Critical),
            other => Err(CoreError::Validation(format!(
                "Unknown findings severity: '{other}'. Valid severities: {}",
                VALID_SEVERITIES.join(", ")
            ))),
        }
    }
}

impl fmt::Display for FindingsSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
