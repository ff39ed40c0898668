use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{TestResult, WorkpaperStatus};

/// An audit deliverable generated from exactly one template category.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Workpaper {
    pub id: String,
    pub audit_plan_id: String,
    pub template_id: String,
    pub category_id: String,
    pub title: String,
    pub clauses: Vec<String>,
    pub objectives: String,
    pub scope: String,
    pub test_procedures: String,
    pub test_results: Option<String>,
    pub test_result: Option<TestResult>,
    pub tick_marks: Vec<TickMark>,
    pub status: WorkpaperStatus,
    pub prepared_by: Option<String>,
    pub prepared_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workpaper {
    #[must_use]
    pub fn tick_mark(&self, code: char) -> Option<&TickMark> {
        self.tick_marks.iter().find(|t| t.code == code)
    }
}

/// An auditor's annotation symbol. Codes are `A`–`Z`, unique per workpaper.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TickMark {
    pub code: char,
    pub description: String,
}

impl TickMark {
    #[must_use]
    pub const fn is_valid_code(code: char) -> bool {
        code.is_ascii_uppercase()
    }
}
