//! Read and validation operations over a [`TemplateCatalog`].
//!
//! Lookups on unknown template or category IDs degrade to `None` or empty
//! results. [`TemplateService::validate_category_selection`] is the only
//! operation with a structured failure contract.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::CategoryGroup;

use super::builtin::ISO27001_2022_TEMPLATE_ID;
use super::{TemplateCatalog, TemplateCategory, WorkpaperTemplateDefinition};

/// Template categories partitioned by [`CategoryGroup`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct GroupedCategories {
    pub main_clauses: Vec<TemplateCategory>,
    pub annex_a_controls: Vec<TemplateCategory>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub main_clauses: usize,
    pub annex_a_controls: usize,
    pub total: usize,
}

/// Outcome of validating a category selection. `errors` is always present.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

static BUILTIN: LazyLock<TemplateService> =
    LazyLock::new(|| TemplateService::new(TemplateCatalog::builtin()));

/// Shared handle to an immutable template catalog.
#[derive(Debug, Clone)]
pub struct TemplateService {
    catalog: Arc<TemplateCatalog>,
}

impl TemplateService {
    #[must_use]
    pub fn new(catalog: TemplateCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }

    /// The process-wide service over the built-in templates.
    #[must_use]
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    #[must_use]
    pub fn get_available_templates(&self) -> &[WorkpaperTemplateDefinition] {
        self.catalog.templates()
    }

    #[must_use]
    pub fn get_template(&self, id: &str) -> Option<&WorkpaperTemplateDefinition> {
        self.catalog.templates().iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn get_template_categories(&self, id: &str) -> &[TemplateCategory] {
        self.get_template(id).map_or(&[], |t| t.categories.as_slice())
    }

    #[must_use]
    pub fn get_category(&self, template_id: &str, category_id: &str) -> Option<&TemplateCategory> {
        self.get_template(template_id).and_then(|t| t.category(category_id))
    }

    #[must_use]
    pub fn get_categories_grouped(&self, id: &str) -> GroupedCategories {
        let (main_clauses, annex_a_controls) = self
            .get_template_categories(id)
            .iter()
            .cloned()
            .partition(|c| c.group == CategoryGroup::MainClauses);
        GroupedCategories {
            main_clauses,
            annex_a_controls,
        }
    }

    /// Check a selection against the template's category set.
    ///
    /// An unknown template short-circuits with a single error. An empty
    /// selection is reported and then checked for required categories, so
    /// `[]` on a template with required categories yields both errors.
    /// Invalid IDs and missing required categories are each reported as one
    /// combined message.
    #[must_use]
    pub fn validate_category_selection(
        &self,
        template_id: &str,
        selected: &[String],
    ) -> ValidationResult {
        let Some(template) = self.get_template(template_id) else {
            return ValidationResult::from_errors(vec![format!(
                "Template with ID '{template_id}' not found"
            )]);
        };

        let mut errors = Vec::new();
        if selected.is_empty() {
            errors.push("At least one category must be selected".to_string());
        }

        let invalid: Vec<&str> = selected
            .iter()
            .filter(|id| template.category(id).is_none())
            .map(String::as_str)
            .collect();
        if !invalid.is_empty() {
            errors.push(format!("Invalid category IDs: {}", invalid.join(", ")));
        }

        let chosen: HashSet<&str> = selected.iter().map(String::as_str).collect();
        let missing: Vec<&str> = template
            .required_categories()
            .filter(|c| !chosen.contains(c.id.as_str()))
            .map(|c| c.display_name.as_str())
            .collect();
        if !missing.is_empty() {
            errors.push(format!(
                "Required categories must be selected: {}",
                missing.join(", ")
            ));
        }

        tracing::debug!(
            template_id,
            selected = selected.len(),
            errors = errors.len(),
            "validated category selection"
        );
        ValidationResult::from_errors(errors)
    }

    /// Default selection for a template.
    ///
    /// The certification template recommends every management clause; other
    /// templates recommend their required categories.
    #[must_use]
    pub fn get_recommended_categories(&self, template_id: &str) -> Vec<String> {
        let categories = self.get_template_categories(template_id);
        if template_id == ISO27001_2022_TEMPLATE_ID {
            categories
                .iter()
                .filter(|c| c.group == CategoryGroup::MainClauses)
                .map(|c| c.id.clone())
                .collect()
        } else {
            categories
                .iter()
                .filter(|c| c.is_required)
                .map(|c| c.id.clone())
                .collect()
        }
    }

    #[must_use]
    pub fn required_category_ids(&self, template_id: &str) -> Vec<String> {
        self.get_template_categories(template_id)
            .iter()
            .filter(|c| c.is_required)
            .map(|c| c.id.clone())
            .collect()
    }

    #[must_use]
    pub fn get_category_count_by_group(&self, template_id: &str) -> CategoryCounts {
        let categories = self.get_template_categories(template_id);
        let main_clauses = categories
            .iter()
            .filter(|c| c.group == CategoryGroup::MainClauses)
            .count();
        CategoryCounts {
            main_clauses,
            annex_a_controls: categories.len() - main_clauses,
            total: categories.len(),
        }
    }

    #[must_use]
    pub fn has_required_categories(&self, template_id: &str) -> bool {
        self.get_template_categories(template_id)
            .iter()
            .any(|c| c.is_required)
    }

    /// Case-insensitive search over name, display name, description, and
    /// clause numbers. A blank term matches every category.
    #[must_use]
    pub fn search_categories(&self, template_id: &str, term: &str) -> Vec<&TemplateCategory> {
        let categories = self.get_template_categories(template_id);
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return categories.iter().collect();
        }

        categories
            .iter()
            .filter(|c| {
                c.name.to_lowercase().contains(&needle)
                    || c.display_name.to_lowercase().contains(&needle)
                    || c.description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
                    || c.clauses.iter().any(|n| n.to_lowercase().contains(&needle))
            })
            .collect()
    }
}
