//! Static compliance clause catalog.
//!
//! A [`ClauseCatalog`] is a validated, immutable tree of numbered clauses.
//! Clause numbers are dotted hierarchical strings (`4.1`, `A.8.2`) and are
//! unique within a catalog; parent links reference clause IDs.

mod iso27001;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ClauseCategory;
use crate::errors::CoreError;

pub use iso27001::{ANNEX_A_SECTIONS, AnnexSection, MAIN_CLAUSES, MainClause};

/// One numbered requirement or control.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Clause {
    pub id: String,
    pub number: String,
    pub title: String,
    pub category: ClauseCategory,
    pub parent: Option<String>,
}

/// Derive the catalog ID for a clause number (`A.5.1` → `cl-a.5.1`).
#[must_use]
pub fn clause_id(number: &str) -> String {
    format!("cl-{}", number.to_ascii_lowercase())
}

/// A validated clause tree with number and ID indexes.
#[derive(Debug, Clone)]
pub struct ClauseCatalog {
    clauses: Vec<Clause>,
    by_number: HashMap<String, usize>,
    by_id: HashMap<String, usize>,
}

// Integrity of the built-in data is covered by `builtin_catalog_passes_validation`.
static ISO27001_2022: LazyLock<Arc<ClauseCatalog>> =
    LazyLock::new(|| Arc::new(ClauseCatalog::index(iso27001::clauses())));

impl ClauseCatalog {
    /// Build a catalog, rejecting duplicate numbers/IDs and dangling parents.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending clause.
    pub fn new(clauses: Vec<Clause>) -> Result<Self, CoreError> {
        let mut by_number = HashMap::with_capacity(clauses.len());
        let mut by_id = HashMap::with_capacity(clauses.len());

        for (idx, clause) in clauses.iter().enumerate() {
            if by_number.insert(clause.number.clone(), idx).is_some() {
                return Err(CoreError::Validation(format!(
                    "duplicate clause number '{}'",
                    clause.number
                )));
            }
            if by_id.insert(clause.id.clone(), idx).is_some() {
                return Err(CoreError::Validation(format!(
                    "duplicate clause id '{}'",
                    clause.id
                )));
            }
        }

        for clause in &clauses {
            if let Some(parent) = &clause.parent {
                if !by_id.contains_key(parent) {
                    return Err(CoreError::Validation(format!(
                        "clause '{}' references unknown parent '{parent}'",
                        clause.number
                    )));
                }
            }
        }

        Ok(Self {
            clauses,
            by_number,
            by_id,
        })
    }

    fn index(clauses: Vec<Clause>) -> Self {
        let by_number = clauses
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.number.clone(), idx))
            .collect();
        let by_id = clauses
            .iter()
            .enumerate()
            .map(|(idx, c)| (c.id.clone(), idx))
            .collect();
        Self {
            clauses,
            by_number,
            by_id,
        }
    }

    /// The built-in ISO/IEC 27001:2022 catalog, built once per process.
    #[must_use]
    pub fn iso27001_2022() -> Arc<Self> {
        Arc::clone(&ISO27001_2022)
    }

    /// All clauses in declaration order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn get_by_number(&self, number: &str) -> Option<&Clause> {
        self.by_number.get(number).map(|&idx| &self.clauses[idx])
    }

    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<&Clause> {
        self.by_id.get(id).map(|&idx| &self.clauses[idx])
    }

    #[must_use]
    pub fn contains_number(&self, number: &str) -> bool {
        self.by_number.contains_key(number)
    }

    /// Clauses without a parent, in declaration order.
    pub fn roots(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().filter(|c| c.parent.is_none())
    }

    /// Direct children of the clause with the given ID, in declaration order.
    pub fn children<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Clause> + 'a {
        self.clauses
            .iter()
            .filter(move |c| c.parent.as_deref() == Some(id))
    }
}
