//! # Swarp-route Library
//!
//! Finds save-warp routes through a graph of game levels. Levels ("maps") are
//! joined by landmark transitions; a save-warp re-targets a transition through
//! a different landmark and displaces the player. Starting from a target
//! position on the destination map, the search walks back toward the start map
//! and reports every route that ends near a known save point.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use swarp_route::{Destination, GameConfig, RoutingContext, Search, SearchOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GameConfig::load(Path::new("."), "hl1")?;
//!     let destination = Destination::parse("c2a5 at: 1024.0, -512.0, 36.0")?;
//!     let ctx = RoutingContext::load(&config, destination, 35)?;
//!
//!     let summary = Search::new(&ctx, SearchOptions::default()).run(|solution| {
//!         println!("{}", swarp_route::report::format_solution(&ctx, solution));
//!     });
//!     println!("{} solutions", summary.solutions);
//!     Ok(())
//! }
//! ```

// Internal modules
mod core;

pub use crate::core::config::{BannedTransitions, Destination, GameConfig, GameFamily};
pub use crate::core::context::{
    ContextParams, ResolvedWarp, RoutingContext, DEFAULT_MAX_ROUTE_LEN,
};
pub use crate::core::error::{suggest_map, Error, Result};
pub use crate::core::graph::{Edge, MapGraph};
pub use crate::core::paths::{PathIndex, Spine};
pub use crate::core::route::{Route, Transition};
pub use crate::core::search::{
    ProgressCallback, Search, SearchOptions, SearchState, SearchSummary, Solution, StateKey,
};
pub use crate::core::vector::Vec3;
pub use crate::core::warps::{Direction, RawWarp, WarpEntry, WarpTable};
pub use crate::core::waypoints::{Waypoint, WaypointIndex, WaypointMatch};

/// Data file readers
pub mod loader {
    pub use crate::core::loader::{
        load_graph, load_waypoints, parse_graph, parse_waypoints, RawWaypoint,
    };
}

/// Console output formatting
pub mod report {
    pub use crate::core::report::{
        format_banner, format_raw_warps, format_solution, format_summary, format_swarp_config,
        format_warps, position_command,
    };
}
