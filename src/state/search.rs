// Artifact search filters
// Optional predicates are appended to a fixed base query, values always go
// through bound parameters.
use rusqlite::types::Value;

/// Filters for `search_artifacts`. An empty filter matches every artifact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactQuery {
    /// Case-insensitive substring of name, description or accession number
    pub term: Option<String>,
    /// Exact category match
    pub category_id: Option<i64>,
}

impl ArtifactQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// The search term folded for matching, `None` when blank
    fn folded_term(&self) -> Option<String> {
        self.term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_lowercase)
    }

    /// Render the filters onto `base`, returning the SQL and its parameters
    pub(crate) fn build(&self, base: &str, order_by: &str) -> (String, Vec<Value>) {
        let mut filter = FilterBuilder::new();

        if let Some(term) = self.folded_term() {
            filter.push(
                |n| {
                    format!(
                        "(instr(fold_case(a.name), ?{n}) > 0 \
                         OR instr(fold_case(a.description), ?{n}) > 0 \
                         OR instr(fold_case(a.accession_number), ?{n}) > 0)"
                    )
                },
                Value::Text(term),
            );
        }

        if let Some(category_id) = self.category_id {
            filter.push(|n| format!("a.category_id = ?{n}"), Value::Integer(category_id));
        }

        filter.finish(base, order_by)
    }
}

struct FilterBuilder {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl FilterBuilder {
    fn new() -> Self {
        Self {
            clauses: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Add a predicate; `clause` receives the 1-based placeholder index of `value`
    fn push(&mut self, clause: impl FnOnce(usize) -> String, value: Value) {
        self.params.push(value);
        self.clauses.push(clause(self.params.len()));
    }

    fn finish(self, base: &str, order_by: &str) -> (String, Vec<Value>) {
        let mut sql = base.trim_end().to_string();
        if !self.clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order_by);
        (sql, self.params)
    }
}
