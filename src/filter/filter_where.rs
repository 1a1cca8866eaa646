use super::error::FilterError;
use super::params::QueryParams;
use super::types::{FilterOp, Predicate};

pub struct FilterWhere;

impl FilterWhere {
    /// Turn the non-reserved query parameters into ANDed predicates.
    ///
    /// `unidades[gte]=10` becomes `{unidades: {$gte: "10"}}`, a bare
    /// `nombre=Acme` becomes an equality.
    pub fn parse(params: &QueryParams) -> Vec<Predicate> {
        let mut predicates: Vec<Predicate> = Vec::new();
        for (key, value) in params.filter_pairs() {
            let (field, op) = Self::parse_key(key);
            predicates.push(Predicate::new(field, op, value));
        }
        predicates
    }

    fn parse_key(key: &str) -> (&str, FilterOp) {
        if let Some(open) = key.find('[') {
            if open > 0 && key.ends_with(']') {
                let suffix = &key[open + 1..key.len() - 1];
                return (&key[..open], FilterOp::from_suffix(suffix));
            }
        }
        (key, FilterOp::Eq)
    }

    /// Render predicates against a `doc jsonb` column.
    ///
    /// Comparison follows the stored value's JSON type: strings compare as text
    /// (byte order), numbers and booleans compare against the typed reading of
    /// the parameter and never match when the parameter has another type.
    pub fn generate(predicates: &[Predicate], params: &mut Vec<String>) -> Result<String, FilterError> {
        if predicates.is_empty() {
            return Ok("TRUE".to_string());
        }
        let mut conditions = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            conditions.push(Self::build_sql_condition(predicate, params)?);
        }
        Ok(conditions.join(" AND "))
    }

    fn build_sql_condition(predicate: &Predicate, params: &mut Vec<String>) -> Result<String, FilterError> {
        let op = predicate
            .op
            .to_sql()
            .ok_or_else(|| FilterError::UnsupportedOperator(predicate.op.as_str().to_string()))?;
        let field = push_param(params, predicate.field.clone());

        if predicate.op == FilterOp::IEq {
            let text = push_param(params, predicate.value.clone());
            return Ok(format!("lower(doc ->> {}) = lower({})", field, text));
        }

        let text = push_param(params, predicate.value.clone());
        let typed_branch = match predicate.typed_value() {
            Some(typed) => {
                let kind = if typed.is_boolean() { "boolean" } else { "number" };
                let json = push_param(params, typed.to_string());
                format!(" WHEN '{}' THEN (doc -> {}) {} {}::jsonb", kind, field, op, json)
            }
            None => String::new(),
        };

        Ok(format!(
            "(CASE jsonb_typeof(doc -> {f}) WHEN 'string' THEN (doc ->> {f}) COLLATE \"C\" {op} {t}{typed} ELSE FALSE END)",
            f = field,
            op = op,
            t = text,
            typed = typed_branch,
        ))
    }
}

/// Append a bind value and return its `$n` placeholder.
pub(crate) fn push_param(params: &mut Vec<String>, value: impl Into<String>) -> String {
    params.push(value.into());
    format!("${}", params.len())
}
