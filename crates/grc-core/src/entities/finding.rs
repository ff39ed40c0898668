use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{FindingStatus, Severity};

/// A recorded non-conformity, optionally linked to a plan and workpaper.
///
/// `severity` and `status` are independent axes.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Finding {
    pub id: String,
    pub reference_code: String,
    pub audit_plan_id: Option<String>,
    pub workpaper_id: Option<String>,
    pub clause: String,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub status: FindingStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
