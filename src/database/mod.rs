pub mod memory;
pub mod postgres;
pub mod repository;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::Repository;
pub use store::{Document, DocumentStore, StoreError};
