//! Audit plan update builder.

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditPlanUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead_auditor: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Option<NaiveDate>>,
}

pub struct AuditPlanUpdateBuilder(AuditPlanUpdate);

impl AuditPlanUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(AuditPlanUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn lead_auditor(mut self, lead_auditor: Option<String>) -> Self {
        self.0.lead_auditor = Some(lead_auditor);
        self
    }

    #[must_use]
    pub const fn start_date(mut self, start_date: Option<NaiveDate>) -> Self {
        self.0.start_date = Some(start_date);
        self
    }

    #[must_use]
    pub const fn end_date(mut self, end_date: Option<NaiveDate>) -> Self {
        self.0.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn build(self) -> AuditPlanUpdate {
        self.0
    }
}

impl Default for AuditPlanUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
