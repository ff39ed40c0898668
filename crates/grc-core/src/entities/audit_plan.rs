use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::AuditPlanStatus;

/// An audit engagement against one workpaper template.
///
/// `selected_category_ids` is kept in template declaration order and may only
/// change while the plan is a draft.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AuditPlan {
    pub id: String,
    pub title: String,
    pub template_id: String,
    pub status: AuditPlanStatus,
    pub selected_category_ids: Vec<String>,
    pub lead_auditor: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
