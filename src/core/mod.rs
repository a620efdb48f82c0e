//! Core library modules for swarp-route
//!
//! The map graph and shortest-path index feed warps and waypoints, which are
//! resolved into a routing context that the search reads.

pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod loader;
pub mod paths;
pub mod report;
pub mod route;
pub mod search;
pub mod vector;
pub mod warps;
pub mod waypoints;
