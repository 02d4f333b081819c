pub mod auth;
pub mod categories;
pub mod posts;
pub mod public;
pub mod thumbnail;
