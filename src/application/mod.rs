//! Application services layer.

pub mod admin;
pub mod error;
pub mod feed;
pub mod identity;
pub mod repos;
pub mod uploads;
