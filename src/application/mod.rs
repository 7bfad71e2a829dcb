pub mod address_service;
pub mod order_service;
pub mod product_service;
pub mod report_service;
pub mod user_service;

mod cache;

pub(crate) use cache::{cache_evict, cache_read, cache_write};
