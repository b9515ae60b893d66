pub mod csv_table;
pub mod sqlite_engine;

pub use sqlite_engine::SqliteEngine;
