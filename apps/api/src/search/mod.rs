pub mod query;

pub use query::SearchQuery;
