use super::filter_where::push_param;
use super::types::{SortDirection, SortKey};

pub struct FilterOrder;

impl FilterOrder {
    /// Parse `nombre,-createdAt` into sort keys. A leading `-` sorts descending;
    /// empty segments are skipped.
    pub fn parse(spec: &str) -> Vec<SortKey> {
        let mut out = Vec::new();
        for part in spec.split(',') {
            let trimmed = part.trim();
            match trimmed.strip_prefix('-') {
                Some(field) if !field.is_empty() => out.push(SortKey::desc(field)),
                Some(_) => continue,
                None if trimmed.is_empty() => continue,
                None => out.push(SortKey::asc(trimmed)),
            }
        }
        out
    }

    /// `ORDER BY` over the JSONB document. The row id closes every ordering so
    /// windows over equal keys stay stable between pages.
    pub fn generate(keys: &[SortKey], params: &mut Vec<String>) -> String {
        let mut parts: Vec<String> = keys
            .iter()
            .map(|key| {
                let field = push_param(params, key.field.clone());
                let nulls = match key.direction {
                    SortDirection::Asc => "NULLS FIRST",
                    SortDirection::Desc => "NULLS LAST",
                };
                format!("doc -> {} {} {}", field, key.direction.to_sql(), nulls)
            })
            .collect();
        parts.push("id ASC".to_string());
        format!("ORDER BY {}", parts.join(", "))
    }
}
