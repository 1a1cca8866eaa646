pub mod error;
pub mod features;
pub mod filter_order;
pub mod filter_where;
pub mod params;
pub mod query;
pub mod types;

pub use error::FilterError;
pub use features::Features;
pub use params::QueryParams;
pub use query::Query;
pub use types::*;
