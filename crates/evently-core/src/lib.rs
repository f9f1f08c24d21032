//! Core types, access rules and the store trait for Evently.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it.

pub mod access;
pub mod error;
pub mod event;
pub mod review;
pub mod rsvp;
pub mod store;
pub mod user;

pub use error::{Error, Result};
