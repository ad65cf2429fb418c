pub mod types;
pub mod filter;
pub mod filter_where;
pub mod filter_order;
pub mod filter_match;

pub use types::*;
pub use filter::BookFilter;
pub use filter_where::FilterWhere;
pub use filter_order::FilterOrder;
