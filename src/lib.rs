//! # Band-Break Backend
//!
//! Forecast exceedance analysis engine for retail demand dashboards.
//!
//! This crate provides a Rust backend that compares daily actuals against
//! forecast confidence bands, counts band breaks and consecutive streaks,
//! and ranks departments, categories and SKUs by how badly their forecasts
//! missed. The backend exposes a REST API via Axum for the dashboard
//! frontend.
//!
//! ## Features
//!
//! - **Band-Break Evaluation**: Exceedance counts and streaks over 85% and
//!   95% confidence bands
//! - **Hierarchy Aggregation**: Per-department and per-category results,
//!   plus a ranked SKU leaderboard
//! - **Series Projection**: Chart-ready time series with future actuals
//!   suppressed
//! - **Calendar Windowing**: Week-ending Saturdays, evaluation windows and
//!   chart windows per cadence
//! - **HTTP API**: RESTful endpoints for frontend integration
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Data Transfer Objects (DTOs) and core domain types
//! - [`calendar`]: Date windowing and week enumeration
//! - [`db`]: Repository pattern and persistence layer
//! - [`services`]: Band-break evaluation, aggregation and projection
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod calendar;
pub mod db;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
