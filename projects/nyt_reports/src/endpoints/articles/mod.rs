pub mod summary;
pub mod search;
