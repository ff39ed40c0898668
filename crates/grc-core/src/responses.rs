//! CLI response types returned as JSON by `grc` commands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{AuditPlan, Kri, Risk, Workpaper};
use crate::enums::{KriBand, RiskLevel};
use crate::template::{CategoryCounts, ValidationResult, WorkpaperTemplateDefinition};

/// Outcome of submitting an audit plan for review.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReviewSubmission {
    /// The plan moved to `under_review` and one workpaper was generated per
    /// selected category.
    Submitted {
        plan: AuditPlan,
        workpapers: Vec<Workpaper>,
    },
    /// The stored selection failed validation; nothing changed.
    Rejected { validation: ValidationResult },
}

impl ReviewSubmission {
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        matches!(self, Self::Submitted { .. })
    }
}

/// One row of `grc template list`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TemplateSummary {
    pub id: String,
    pub name: String,
    pub version: Option<String>,
    pub counts: CategoryCounts,
    pub required: Vec<String>,
}

impl TemplateSummary {
    #[must_use]
    pub fn from_definition(template: &WorkpaperTemplateDefinition) -> Self {
        let main_clauses = template
            .categories
            .iter()
            .filter(|c| c.group == crate::enums::CategoryGroup::MainClauses)
            .count();
        Self {
            id: template.id.clone(),
            name: template.name.clone(),
            version: template.version.clone(),
            counts: CategoryCounts {
                main_clauses,
                annex_a_controls: template.categories.len() - main_clauses,
                total: template.categories.len(),
            },
            required: template
                .required_categories()
                .map(|c| c.id.clone())
                .collect(),
        }
    }
}

/// A risk with its derived score and level, as shown by `grc risk get`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct RiskView {
    #[serde(flatten)]
    pub risk: Risk,
    pub score: u8,
    pub level: RiskLevel,
}

impl From<Risk> for RiskView {
    fn from(risk: Risk) -> Self {
        Self {
            score: risk.score(),
            level: risk.level(),
            risk,
        }
    }
}

/// A KRI with its current band.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct KriView {
    #[serde(flatten)]
    pub kri: Kri,
    pub band: KriBand,
}

impl From<Kri> for KriView {
    fn from(kri: Kri) -> Self {
        Self {
            band: kri.band(),
            kri,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{ISO27001_2022_TEMPLATE_ID, TemplateService};
    use pretty_assertions::assert_eq;

    #[test]
    fn template_summary_counts() {
        let service = TemplateService::builtin();
        let template = service.get_template(ISO27001_2022_TEMPLATE_ID).unwrap();
        let summary = TemplateSummary::from_definition(template);
        assert_eq!(summary.counts, service.get_category_count_by_group(ISO27001_2022_TEMPLATE_ID));
        assert_eq!(summary.required, vec!["ctx-4".to_string()]);
    }

    #[test]
    fn rejected_submission_serde_shape() {
        let rejected = ReviewSubmission::Rejected {
            validation: ValidationResult {
                valid: false,
                errors: vec!["At least one category must be selected".into()],
            },
        };
        let json = serde_json::to_value(&rejected).unwrap();
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["validation"]["valid"], false);
        assert!(!rejected.is_submitted());
    }
}
