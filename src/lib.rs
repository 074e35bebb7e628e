//! Core library for the Healthhub portal backend.
//!
//! This crate exposes the collection store, the named query and mutation
//! operations behind the REST and GraphQL endpoints, and the server runtime
//! that wires them together. Only one database backend (either `sqlite` or
//! `postgres`) should be enabled at a time.

#[cfg(all(feature = "sqlite", feature = "postgres", not(feature = "lint")))]
compile_error!("Choose either sqlite or postgres, not both");

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("Either the 'sqlite' or 'postgres' feature must be enabled");

pub mod chatbot;
pub mod client;
pub mod context;
pub mod db;
pub mod graphql;
pub mod mail;
pub mod models;
pub mod operations;
pub mod passwords;
pub mod schema;
pub mod server;
