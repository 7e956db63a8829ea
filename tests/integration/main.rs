//! Integration tests for yt-points

mod config_test;
mod simulation_test;
