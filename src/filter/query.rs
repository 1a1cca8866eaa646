use super::error::FilterError;
use super::filter_order::FilterOrder;
use super::filter_where::{push_param, FilterWhere};
use super::types::{Predicate, Projection, SortKey, SqlResult};

/// A store query assembled by the feature pipeline.
///
/// `take: None` means unbounded. Projection is not part of the SQL; stores
/// apply it to the fetched documents.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub collection: String,
    pub predicates: Vec<Predicate>,
    pub sort: Vec<SortKey>,
    pub skip: u64,
    pub take: Option<u64>,
    pub projection: Projection,
}

impl Query {
    pub fn new(collection: impl Into<String>) -> Self {
        Self { collection: collection.into(), ..Default::default() }
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn to_sql(&self) -> Result<SqlResult, FilterError> {
        validate_identifier(&self.collection)?;
        let mut params = Vec::new();
        let where_clause = FilterWhere::generate(&self.predicates, &mut params)?;
        let order_clause = FilterOrder::generate(&self.sort, &mut params);

        let mut query = format!(
            "SELECT id, doc FROM \"{}\" WHERE {} {}",
            self.collection, where_clause, order_clause
        );
        if let Some(take) = self.take {
            let limit = push_param(&mut params, take.to_string());
            query.push_str(&format!(" LIMIT {}::bigint", limit));
        }
        if self.skip > 0 {
            let offset = push_param(&mut params, self.skip.to_string());
            query.push_str(&format!(" OFFSET {}::bigint", offset));
        }
        Ok(SqlResult { query, params })
    }

    pub fn to_count_sql(&self) -> Result<SqlResult, FilterError> {
        validate_identifier(&self.collection)?;
        let mut params = Vec::new();
        let where_clause = FilterWhere::generate(&self.predicates, &mut params)?;
        let query = format!("SELECT COUNT(*) AS count FROM \"{}\" WHERE {}", self.collection, where_clause);
        Ok(SqlResult { query, params })
    }
}

/// Collection and indexed field names end up inside DDL, so they must be
/// plain identifiers.
pub fn validate_identifier(name: &str) -> Result<(), FilterError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(FilterError::InvalidCollection(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::FilterOp;

    #[test]
    fn select_numbers_parameters_across_clauses() {
        let query = Query {
            collection: "pedidos".into(),
            predicates: vec![Predicate::new("unidades", FilterOp::Gt, "nope")],
            sort: vec![SortKey::asc("createdAt")],
            skip: 10,
            take: Some(10),
            projection: Projection::default(),
        };
        let sql = query.to_sql().unwrap();
        assert!(sql.query.starts_with("SELECT id, doc FROM \"pedidos\" WHERE (CASE"));
        assert!(sql.query.contains("ORDER BY doc -> $3 ASC NULLS FIRST, id ASC"));
        assert!(sql.query.ends_with("LIMIT $4::bigint OFFSET $5::bigint"));
        assert_eq!(sql.params, vec!["unidades", "nope", "createdAt", "10", "10"]);
    }

    #[test]
    fn count_ignores_window() {
        let mut query = Query::new("clientes").and(Predicate::eq("nombre", "Acme"));
        query.skip = 40;
        query.take = Some(20);
        let sql = query.to_count_sql().unwrap();
        assert!(!sql.query.contains("LIMIT"));
        assert_eq!(sql.params.len(), 2);
    }

    #[test]
    fn rejects_unsafe_collection_names() {
        assert!(Query::new("clientes; DROP TABLE x").to_sql().is_err());
        assert!(Query::new("").to_count_sql().is_err());
        assert!(validate_identifier("_ok_1").is_ok());
    }
}
