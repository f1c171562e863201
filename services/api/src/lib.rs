//! Recipe API service
//!
//! A REST API for managing recipes, tags, and ingredients, scoped to
//! the authenticated owner. The binary in `main.rs` wires the router
//! up to a PostgreSQL pool; everything else lives here so the routes
//! can also be driven in-process by the tests.

pub mod error;
pub mod extract;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod reconcile;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod storage;
pub mod validation;
