pub mod address;
pub mod bank;
pub mod cache;
pub mod error;
pub mod instruction;
pub mod operations;
pub mod transaction;
pub mod wallet;
