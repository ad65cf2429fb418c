use super::types::Predicate;

/// Renders a [`Predicate`] as a parameterized SQL condition over a JSONB
/// `data` column.
///
/// Field names and values are both bound as parameters (`data->>$1`), so the
/// generated text never contains anything that came from a request.
pub struct FilterWhere {
    param_values: Vec<String>,
    param_index: usize,
}

impl FilterWhere {
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
        }
    }

    pub fn generate(predicate: &Predicate, starting_param_index: usize) -> (String, Vec<String>) {
        let mut filter_where = Self::new(starting_param_index);
        let sql = filter_where.build(predicate);
        (sql, filter_where.param_values)
    }

    fn build(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::All => "1=1".to_string(),
            Predicate::And(parts) => {
                if parts.is_empty() { return "1=1".to_string(); }
                let sql: Vec<String> = parts.iter().map(|p| format!("({})", self.build(p))).collect();
                sql.join(" AND ")
            }
            Predicate::Or(parts) => {
                if parts.is_empty() { return "1=0".to_string(); }
                let sql: Vec<String> = parts.iter().map(|p| format!("({})", self.build(p))).collect();
                sql.join(" OR ")
            }
            Predicate::Eq { field, value } => {
                let column = self.column(field);
                format!("{} = {}", column, self.param(value.clone()))
            }
            Predicate::Contains { field, needle } => {
                let column = self.column(field);
                let pattern = format!("%{}%", escape_like(needle));
                format!("{} ILIKE {} ESCAPE '\\'", column, self.param(pattern))
            }
            Predicate::StartsWith { field, prefix } => {
                let column = self.column(field);
                let pattern = format!("{}%", escape_like(prefix));
                format!("{} ILIKE {} ESCAPE '\\'", column, self.param(pattern))
            }
        }
    }

    fn column(&mut self, field: &str) -> String {
        format!("(\"data\" ->> {})", self.param(field.to_string()))
    }

    fn param(&mut self, value: String) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

/// Escape `LIKE` metacharacters so the term is matched literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
