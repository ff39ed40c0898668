//! Workpaper template definitions.
//!
//! A template bundles selectable audit-scope categories. Each category
//! references one or more clauses of the [`ClauseCatalog`] and carries the
//! objectives, scope, and audit procedure text used to pre-fill workpapers.
//!
//! Records serialize in camelCase (`displayName`, `isRequired`, ...) so the
//! JSON shape matches what existing template consumers expect.

mod builtin;
mod service;

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::ClauseCatalog;
use crate::enums::CategoryGroup;
use crate::errors::CoreError;

pub use builtin::{
    ISO27001_2022_ANNEX_A_TEMPLATE_ID, ISO27001_2022_SURVEILLANCE_TEMPLATE_ID,
    ISO27001_2022_TEMPLATE_ID,
};
pub use service::{CategoryCounts, GroupedCategories, TemplateService, ValidationResult};

/// One selectable unit of audit scope.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateCategory {
    pub id: String,
    pub name: String,
    pub display_name: String,
    pub group: CategoryGroup,
    /// Clause numbers, in catalog order.
    pub clauses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clause_range: Option<String>,
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scope: String,
    pub objectives: String,
    pub audit_procedure: String,
}

/// A named, versioned bundle of template categories.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkpaperTemplateDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub categories: Vec<TemplateCategory>,
}

impl WorkpaperTemplateDefinition {
    #[must_use]
    pub fn category(&self, id: &str) -> Option<&TemplateCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn required_categories(&self) -> impl Iterator<Item = &TemplateCategory> {
        self.categories.iter().filter(|c| c.is_required)
    }
}

/// A validated, ordered set of template definitions.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: Vec<WorkpaperTemplateDefinition>,
}

impl TemplateCatalog {
    /// Validate templates against the clause catalog.
    ///
    /// Template IDs must be unique, category IDs must be unique within their
    /// template, and every category must reference at least one clause that
    /// exists in `clauses`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` describing the first violation.
    pub fn new(
        templates: Vec<WorkpaperTemplateDefinition>,
        clauses: &ClauseCatalog,
    ) -> Result<Self, CoreError> {
        let mut template_ids = HashSet::new();
        for template in &templates {
            if !template_ids.insert(template.id.as_str()) {
                return Err(CoreError::Validation(format!(
                    "duplicate template id '{}'",
                    template.id
                )));
            }

            let mut category_ids = HashSet::new();
            for category in &template.categories {
                if !category_ids.insert(category.id.as_str()) {
                    return Err(CoreError::Validation(format!(
                        "duplicate category id '{}' in template '{}'",
                        category.id, template.id
                    )));
                }
                if category.clauses.is_empty() {
                    return Err(CoreError::Validation(format!(
                        "category '{}' in template '{}' references no clauses",
                        category.id, template.id
                    )));
                }
                if let Some(missing) = category
                    .clauses
                    .iter()
                    .find(|number| !clauses.contains_number(number))
                {
                    return Err(CoreError::Validation(format!(
                        "category '{}' in template '{}' references unknown clause '{missing}'",
                        category.id, template.id
                    )));
                }
            }
        }

        Ok(Self { templates })
    }

    /// The built-in ISO 27001:2022 templates.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            templates: builtin::templates(),
        }
    }

    #[must_use]
    pub fn templates(&self) -> &[WorkpaperTemplateDefinition] {
        &self.templates
    }
}
