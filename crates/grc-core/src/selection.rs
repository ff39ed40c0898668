//! Category selection state machine.
//!
//! A [`CategorySelector`] tracks which categories of one template are
//! selected. Required categories can be added but never removed by a toggle.
//! Every transition reports the full new selection, in template order, to an
//! optional listener and to the caller.

use std::collections::HashSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::template::{TemplateCategory, TemplateService};

/// A selector transition, as requested by a caller that does not hold the
/// selector itself (for example a persisted audit plan).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", content = "category_id", rename_all = "snake_case")]
pub enum SelectorAction {
    Toggle(String),
    ToggleSelectAll,
    SelectRecommended,
}

type Listener<'a> = Box<dyn FnMut(&[String]) + 'a>;

pub struct CategorySelector<'a> {
    categories: &'a [TemplateCategory],
    recommended: Vec<String>,
    selected: HashSet<String>,
    listener: Option<Listener<'a>>,
}

impl fmt::Debug for CategorySelector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategorySelector")
            .field("selected", &self.selected_ids())
            .field("has_listener", &self.listener.is_some())
            .finish_non_exhaustive()
    }
}

impl<'a> CategorySelector<'a> {
    /// Start a selector over `template_id`. Returns `None` for an unknown
    /// template. IDs in `initial` that are not categories of the template are
    /// dropped.
    #[must_use]
    pub fn new(
        service: &'a TemplateService,
        template_id: &str,
        initial: &[String],
    ) -> Option<Self> {
        let template = service.get_template(template_id)?;
        let selected = initial
            .iter()
            .filter(|id| template.category(id).is_some())
            .cloned()
            .collect();

        Some(Self {
            categories: &template.categories,
            recommended: service.get_recommended_categories(template_id),
            selected,
            listener: None,
        })
    }

    #[must_use]
    pub fn with_listener(mut self, listener: impl FnMut(&[String]) + 'a) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    /// Selected category IDs in template declaration order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<String> {
        self.categories
            .iter()
            .filter(|c| self.selected.contains(&c.id))
            .map(|c| c.id.clone())
            .collect()
    }

    #[must_use]
    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    #[must_use]
    pub fn total_count(&self) -> usize {
        self.categories.len()
    }

    #[must_use]
    pub fn is_all_selected(&self) -> bool {
        self.selected_count() == self.total_count()
    }

    /// Flip a category. Required categories are select-only; unknown IDs are
    /// ignored.
    pub fn toggle(&mut self, id: &str) -> Vec<String> {
        if let Some(category) = self.categories.iter().find(|c| c.id == id) {
            if category.is_required {
                self.selected.insert(category.id.clone());
            } else if !self.selected.remove(id) {
                self.selected.insert(category.id.clone());
            }
        }
        self.notify()
    }

    /// Select everything, or collapse to the required categories when
    /// everything is already selected.
    pub fn toggle_select_all(&mut self) -> Vec<String> {
        self.selected = if self.is_all_selected() {
            self.categories
                .iter()
                .filter(|c| c.is_required)
                .map(|c| c.id.clone())
                .collect()
        } else {
            self.categories.iter().map(|c| c.id.clone()).collect()
        };
        self.notify()
    }

    /// Replace the selection with the template's recommended categories.
    pub fn select_recommended(&mut self) -> Vec<String> {
        self.selected = self.recommended.iter().cloned().collect();
        self.notify()
    }

    pub fn apply(&mut self, action: &SelectorAction) -> Vec<String> {
        match action {
            SelectorAction::Toggle(id) => self.toggle(id),
            SelectorAction::ToggleSelectAll => self.toggle_select_all(),
            SelectorAction::SelectRecommended => self.select_recommended(),
        }
    }

    fn notify(&mut self) -> Vec<String> {
        let selection = self.selected_ids();
        if let Some(listener) = self.listener.as_mut() {
            listener(&selection);
        }
        selection
    }
}
