mod connection_pool;
mod rows;
mod schema;
mod sqlite_store;

pub use connection_pool::ConnectionPool;
pub use schema::initialize_schema;
pub use sqlite_store::SqliteStore;
