pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod pagination;
pub mod params;
pub mod types;

pub use filter::Filter;
pub use pagination::Pagination;
pub use types::*;
