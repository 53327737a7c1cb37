//! Persistence layer of a real-estate listing marketplace: users, listings,
//! listing images, favorites, payments and contact messages, stored with
//! soft deletes and audit timestamps, plus a thin JSON transport.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult, ValidationError};
pub use store::{ChangeSet, Scope, Store, Table};
