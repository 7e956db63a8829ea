//! yt-points: points-farming estimator for Pendle yield tokens
//!
//! This library provides the core components for:
//! - Market and YT asset resolution via the Pendle core API
//! - Paged, deduplicated swap history retrieval
//! - YT pricing and points-to-maturity estimates
//! - Fair-value curve construction
//! - Logging and metrics

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod market;
pub mod model;
pub mod pipeline;
pub mod telemetry;
