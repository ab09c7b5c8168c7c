//! Batch Phone Line Verification Service
//!
//! This library provides the core functionality for the line-verify system:
//! an orchestrator that fans a submitted batch of phone numbers out to
//! concurrent carrier lookups, tracks per-line status, and detects batch
//! completion race-free.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
