//! Result table output

mod table_writer;

pub use self::table_writer::{ResultRow, TableWriter, TABLE_HEADER};
