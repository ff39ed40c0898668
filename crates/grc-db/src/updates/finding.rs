//! Finding update builder.

use chrono::NaiveDate;
use grc_core::enums::Severity;
use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct FindingUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clause: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workpaper_id: Option<Option<String>>,
}

pub struct FindingUpdateBuilder(FindingUpdate);

impl FindingUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(FindingUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn clause(mut self, clause: impl Into<String>) -> Self {
        self.0.clause = Some(clause.into());
        self
    }

    #[must_use]
    pub const fn severity(mut self, severity: Severity) -> Self {
        self.0.severity = Some(severity);
        self
    }

    #[must_use]
    pub const fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.0.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn workpaper_id(mut self, workpaper_id: Option<String>) -> Self {
        self.0.workpaper_id = Some(workpaper_id);
        self
    }

    #[must_use]
    pub fn build(self) -> FindingUpdate {
        self.0
    }
}

impl Default for FindingUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
