//! Record loading and the in-memory table model
//!
//! - `column`: typed nullable columns
//! - `table`: named column sets with row selection
//! - `arrow`: Arrow → column conversion
//! - `dates`: lenient date-time coercion
//! - `loader`: fixed record-set loading from a data directory

mod arrow;
mod column;
pub mod dates;
mod loader;
mod table;

pub use arrow::{arrow_to_column, record_batch_to_table};
pub use column::Column;
pub use dates::{parse_dates, parse_datetime, to_datetime};
pub use loader::{load_all, read_parquet, read_parquet_safe, TableSet, RECORD_SETS};
pub use table::Table;
