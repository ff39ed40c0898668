//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL. The builder output is recorded
//! as the audit `detail` payload (changed fields only).

pub mod audit_plan;
pub mod finding;
pub mod risk;
pub mod workpaper;

/// Accumulates `SET` fragments and positional parameters for a dynamic UPDATE.
#[derive(Debug, Default)]
pub(crate) struct SetClause {
    sets: Vec<String>,
    params: Vec<libsql::Value>,
}

impl SetClause {
    pub(crate) fn push(&mut self, column: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        self.sets.push(format!("{column} = ?{}", self.params.len()));
    }

    pub(crate) fn push_opt<T: Into<libsql::Value>>(&mut self, column: &str, value: Option<T>) {
        self.push(column, value.map_or(libsql::Value::Null, Into::into));
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Finish as `UPDATE {table} SET ... WHERE id = ?n`.
    pub(crate) fn into_update(mut self, table: &str, id: &str) -> (String, Vec<libsql::Value>) {
        self.params.push(id.into());
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{}",
            self.sets.join(", "),
            self.params.len()
        );
        (sql, self.params)
    }
}
