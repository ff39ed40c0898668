//! Status enums, classification enums, entity types, and audit actions for grc.
//!
//! Persisted enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! [`CategoryGroup`] is the exception: it keeps the kebab-case wire names of the
//! template record (`main-clauses`, `annex-a-controls`).
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ClauseCategory
// ---------------------------------------------------------------------------

/// Whether a clause governs the management system or a technical safeguard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ClauseCategory {
    Organizational,
    Technical,
}

impl ClauseCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Organizational => "organizational",
            Self::Technical => "technical",
        }
    }
}

impl fmt::Display for ClauseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CategoryGroup
// ---------------------------------------------------------------------------

/// Partition of template categories: management clauses 4–10 or Annex A controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryGroup {
    MainClauses,
    AnnexAControls,
}

impl CategoryGroup {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MainClauses => "main-clauses",
            Self::AnnexAControls => "annex-a-controls",
        }
    }
}

impl fmt::Display for CategoryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditPlanStatus
// ---------------------------------------------------------------------------

/// Status of an audit plan.
///
/// ```text
/// draft → under_review → approved → completed
///              ↓
///            draft (returned for changes)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditPlanStatus {
    Draft,
    UnderReview,
    Approved,
    Completed,
}

impl AuditPlanStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::UnderReview],
            Self::UnderReview => &[Self::Approved, Self::Draft],
            Self::Approved => &[Self::Completed],
            Self::Completed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Only draft plans may change their category selection.
    #[must_use]
    pub const fn is_editable(self) -> bool {
        matches!(self, Self::Draft)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::UnderReview => "under_review",
            Self::Approved => "approved",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for AuditPlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WorkpaperStatus
// ---------------------------------------------------------------------------

/// Status of a workpaper.
///
/// ```text
/// draft → tested → reviewed
///           ↓
///         draft (retest)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkpaperStatus {
    Draft,
    Tested,
    Reviewed,
}

impl WorkpaperStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Draft => &[Self::Tested],
            Self::Tested => &[Self::Reviewed, Self::Draft],
            Self::Reviewed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Tested => "tested",
            Self::Reviewed => "reviewed",
        }
    }
}

impl fmt::Display for WorkpaperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TestResult
// ---------------------------------------------------------------------------

/// Outcome of testing one workpaper's procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TestResult {
    Conformity,
    PartialConformity,
    NonConformity,
}

impl TestResult {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Conformity => "conformity",
            Self::PartialConformity => "partial_conformity",
            Self::NonConformity => "non_conformity",
        }
    }

    /// Whether the result should normally be followed by a finding.
    #[must_use]
    pub const fn warrants_finding(self) -> bool {
        !matches!(self, Self::Conformity)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

/// Severity of a finding. Independent of its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// FindingStatus
// ---------------------------------------------------------------------------

/// Status of a finding.
///
/// ```text
/// open → in_progress → resolved → closed
///             ↑            │
///             └── reopen ──┘
/// ```
///
/// A finding can only be closed once it has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl FindingStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::InProgress],
            Self::InProgress => &[Self::Resolved],
            Self::Resolved => &[Self::Closed, Self::InProgress],
            Self::Closed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskStatus
// ---------------------------------------------------------------------------

/// Status of a risk register entry.
///
/// ```text
/// identified → assessed → mitigating → accepted
///                  │           └─────→ closed
///                  ├─────────────────→ accepted
///                  └─────────────────→ closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskStatus {
    Identified,
    Assessed,
    Mitigating,
    Accepted,
    Closed,
}

impl RiskStatus {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Identified => &[Self::Assessed],
            Self::Assessed => &[Self::Mitigating, Self::Accepted, Self::Closed],
            Self::Mitigating => &[Self::Accepted, Self::Closed],
            Self::Accepted => &[Self::Closed],
            Self::Closed => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Identified => "identified",
            Self::Assessed => "assessed",
            Self::Mitigating => "mitigating",
            Self::Accepted => "accepted",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RiskLevel
// ---------------------------------------------------------------------------

/// Rating band derived from a risk score (`likelihood * impact`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Band a score: 1–4 low, 5–9 medium, 10–16 high, 17+ critical.
    #[must_use]
    pub const fn from_score(score: u8) -> Self {
        match score {
            0..=4 => Self::Low,
            5..=9 => Self::Medium,
            10..=16 => Self::High,
            _ => Self::Critical,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// KriDirection / KriBand
// ---------------------------------------------------------------------------

/// Which direction of movement makes a key risk indicator worse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KriDirection {
    HigherIsWorse,
    LowerIsWorse,
}

impl KriDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HigherIsWorse => "higher_is_worse",
            Self::LowerIsWorse => "lower_is_worse",
        }
    }
}

impl fmt::Display for KriDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic-light band of a key risk indicator reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum KriBand {
    Green,
    Amber,
    Red,
}

impl KriBand {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Amber => "amber",
            Self::Red => "red",
        }
    }
}

impl fmt::Display for KriBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    StatusChanged,
    SelectionChanged,
    Submitted,
    TestRecorded,
    TickMarked,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
            Self::SelectionChanged => "selection_changed",
            Self::Submitted => "submitted",
            Self::TestRecorded => "test_recorded",
            Self::TickMarked => "tick_marked",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity referenced by audit entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    AuditPlan,
    Workpaper,
    Finding,
    Risk,
    Kri,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuditPlan => "audit_plan",
            Self::Workpaper => "workpaper",
            Self::Finding => "finding",
            Self::Risk => "risk",
            Self::Kri => "kri",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
