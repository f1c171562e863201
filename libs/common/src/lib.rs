//! Common library for the recipe API
//!
//! This crate provides the infrastructure shared by the API service:
//! PostgreSQL connection pooling, health checks, and the database
//! error types used across the workspace.

pub mod database;
pub mod error;
