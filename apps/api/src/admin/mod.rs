pub mod handlers;
pub mod table;
pub mod views;

pub use table::{apply_table_query, Page, TableQuery};
