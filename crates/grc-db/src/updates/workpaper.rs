//! Workpaper update builder.
//!
//! Test outcomes are not updatable here; they go through
//! `GrcService::record_test_result`.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct WorkpaperUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objectives: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_procedures: Option<String>,
}

pub struct WorkpaperUpdateBuilder(WorkpaperUpdate);

impl WorkpaperUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(WorkpaperUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn objectives(mut self, objectives: impl Into<String>) -> Self {
        self.0.objectives = Some(objectives.into());
        self
    }

    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.0.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn test_procedures(mut self, test_procedures: impl Into<String>) -> Self {
        self.0.test_procedures = Some(test_procedures.into());
        self
    }

    #[must_use]
    pub fn build(self) -> WorkpaperUpdate {
        self.0
    }
}

impl Default for WorkpaperUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
