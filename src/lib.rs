//! RSE Score API Library
//!
//! Core functionality for the RSE (corporate social responsibility) score
//! observatory: indicator fetching from external sources, the scoring and
//! rating engine, population-wide aggregation, the score store and the
//! query layer behind the HTTP handlers.
//!
//! # Modules
//!
//! - `circuit_breaker`: Per-source circuit breaker construction.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Core data models and source payload shapes.
//! - `query`: Filtering, sorting and pagination of the company listing.
//! - `refresh`: Fetch -> score -> persist workflow.
//! - `score_store`: Score persistence (upsert, current score, snapshot).
//! - `scoring`: Pure score calculator and rating engine.
//! - `sources`: External indicator source clients.
//! - `stats`: Rank map, sector statistics and dashboard aggregates.

pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod query;
pub mod refresh;
pub mod score_store;
pub mod scoring;
pub mod sources;
pub mod stats;
