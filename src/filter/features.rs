use tracing::debug;

use super::filter_order::FilterOrder;
use super::filter_where::FilterWhere;
use super::params::QueryParams;
use super::query::Query;
use super::types::{Pagination, Projection, SortKey};

pub const DEFAULT_SORT_FIELD: &str = "createdAt";
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Internal version marker hidden from listings unless explicitly requested.
pub const VERSION_MARKER: &str = "__v";

/// Chainable refinement of a base query from request parameters.
///
/// ```ignore
/// let query = Features::new(Query::new("productos"), &params)
///     .filter()
///     .sort()
///     .paginate()
///     .limit_fields()
///     .into_query();
/// ```
///
/// Stages are independent; any order produces the same query. None of them fail:
/// malformed values fall back to defaults and unsupported operators are left for
/// the store to reject.
pub struct Features<'p> {
    query: Query,
    params: &'p QueryParams,
    default_limit: u64,
    pagination: Option<Pagination>,
}

impl<'p> Features<'p> {
    pub fn new(query: Query, params: &'p QueryParams) -> Self {
        Self { query, params, default_limit: DEFAULT_PAGE_SIZE, pagination: None }
    }

    pub fn with_default_limit(mut self, default_limit: u64) -> Self {
        self.default_limit = default_limit.max(1);
        self
    }

    pub fn filter(mut self) -> Self {
        let predicates = FilterWhere::parse(self.params);
        debug!("filter predicates: {:?}", predicates);
        self.query.predicates.extend(predicates);
        self
    }

    pub fn sort(mut self) -> Self {
        let keys = self
            .params
            .get("sort")
            .map(FilterOrder::parse)
            .filter(|keys| !keys.is_empty())
            .unwrap_or_else(|| vec![SortKey::asc(DEFAULT_SORT_FIELD)]);
        debug!("sort keys: {:?}", keys);
        self.query.sort = keys;
        self
    }

    pub fn paginate(mut self) -> Self {
        let pagination = self.pagination();
        self.query.skip = pagination.skip();
        self.query.take = Some(pagination.limit);
        self.pagination = Some(pagination);
        self
    }

    pub fn limit_fields(mut self) -> Self {
        let fields: Vec<String> = self
            .params
            .get("fields")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        self.query.projection = if fields.is_empty() {
            Projection::Exclude(vec![VERSION_MARKER.to_string()])
        } else {
            Projection::Include(fields)
        };
        self
    }

    /// Page window for this request, whether or not `paginate` has run.
    pub fn pagination(&self) -> Pagination {
        self.pagination.unwrap_or_else(|| Pagination {
            page: self.params.positive("page").unwrap_or(1),
            limit: self.params.positive("limit").unwrap_or(self.default_limit),
        })
    }

    pub fn into_query(self) -> Query {
        self.query
    }
}
