pub mod queries;
pub mod schema;
