//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! provide schema validation for the most common detail shapes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::TestResult;

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
    pub reason: Option<String>,
}

/// Detail for `AuditAction::SelectionChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SelectionChangedDetail {
    pub before: Vec<String>,
    pub after: Vec<String>,
}

/// Detail for `AuditAction::Submitted`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubmittedDetail {
    pub template_id: String,
    pub workpaper_ids: Vec<String>,
}

/// Detail for `AuditAction::TestRecorded`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TestRecordedDetail {
    pub result: TestResult,
    pub prepared_by: Option<String>,
}

/// Detail for `AuditAction::TickMarked`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TickMarkedDetail {
    pub code: char,
    pub description: String,
}
