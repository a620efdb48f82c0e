//! Immutable routing context shared by all search workers
//!
//! Everything the search consults per state is resolved here once, indexed by
//! spine position: the landmark used for each plain spine step, the warps
//! leaving each map, the void flag and the offset that carries a common-frame
//! coordinate into each map's own frame.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info};

use crate::core::config::{BannedTransitions, Destination, GameConfig, GameFamily};
use crate::core::error::Result;
use crate::core::graph::MapGraph;
use crate::core::loader;
use crate::core::paths::{PathIndex, Spine};
use crate::core::vector::Vec3;
use crate::core::warps::{Direction, WarpTable};
use crate::core::waypoints::{Waypoint, WaypointIndex};

/// Default maximum number of transitions in a route
pub const DEFAULT_MAX_ROUTE_LEN: usize = 35;

/// A warp as the search uses it: spine indices instead of names
#[derive(Debug, Clone)]
pub struct ResolvedWarp {
    pub target: usize,
    pub displacement: Vec3,
    pub landmark: Arc<str>,
    pub direction: Direction,
}

/// Inputs for building a [`RoutingContext`] from data already in memory
#[derive(Debug, Clone)]
pub struct ContextParams {
    pub family: GameFamily,
    pub start_map: String,
    pub destination: Destination,
    pub banned: BannedTransitions,
    pub void_maps: HashSet<String>,
    pub waypoint_distance: f64,
    pub max_route_len: usize,
}

impl ContextParams {
    pub fn from_config(config: &GameConfig, destination: Destination, max_route_len: usize) -> Self {
        Self {
            family: config.family,
            start_map: config.start_map.clone(),
            destination,
            banned: config.banned.clone(),
            void_maps: config.void_maps.clone(),
            waypoint_distance: config.waypoint_distance,
            max_route_len,
        }
    }
}

#[derive(Debug)]
pub struct RoutingContext {
    family: GameFamily,
    destination: Destination,
    spine: Spine,
    warp_table: WarpTable,
    banned: BannedTransitions,
    waypoints: WaypointIndex,
    max_route_len: usize,

    /// Common-frame coordinate of the destination
    dest_coord: Vec3,
    /// Landmark for the step from index `i` to `i - 1`
    step_backward: Vec<Option<Arc<str>>>,
    /// Landmark for the step from index `i` to `i + 1`
    step_forward: Vec<Option<Arc<str>>>,
    warps: Vec<Vec<ResolvedWarp>>,
    void: Vec<bool>,
    /// Added to a common-frame coordinate to express it in spine map `i`'s frame
    frame_offset: Vec<Vec3>,
}

impl RoutingContext {
    /// Load graph and waypoint files named by `config` and build the context
    pub fn load(config: &GameConfig, destination: Destination, max_route_len: usize) -> Result<Self> {
        let graph = loader::load_graph(&config.graph_file, config.family)?;
        let params = ContextParams::from_config(config, destination, max_route_len);
        let index = PathIndex::build(&graph);
        let spine = index.build_spine(&graph, &params.start_map, &params.destination.map)?;
        let waypoints = loader::load_waypoints(
            &config.waypoints_file,
            config.family,
            &graph,
            &index,
            &spine,
            &params.start_map,
        )?;
        Self::assemble(&graph, &index, spine, waypoints, params)
    }

    /// Build from an in-memory graph and waypoints given in their own map frames
    pub fn build(graph: &MapGraph, waypoints: Vec<(String, Vec3)>, params: ContextParams) -> Result<Self> {
        let index = PathIndex::build(graph);
        let spine = index.build_spine(graph, &params.start_map, &params.destination.map)?;
        let raw = waypoints
            .into_iter()
            .map(|(map, coord)| loader::RawWaypoint { map, coord })
            .collect();
        let waypoints =
            loader::resolve_waypoints(raw, params.family, graph, &index, &spine, &params.start_map)?;
        Self::assemble(graph, &index, spine, waypoints, params)
    }

    fn assemble(
        graph: &MapGraph,
        index: &PathIndex,
        spine: Spine,
        waypoints: Vec<Waypoint>,
        params: ContextParams,
    ) -> Result<Self> {
        for map in &params.void_maps {
            if graph.index_of(map).is_none() {
                log::warn!("Void map '{map}' does not appear in the graph");
            }
        }

        let start_map = params.start_map.as_str();
        let dest_coord = index.translate(
            graph,
            params.destination.coord,
            &params.destination.map,
            start_map,
        )?;

        let n = spine.len();
        let mut step_backward = vec![None; n];
        let mut step_forward = vec![None; n];
        for i in 0..n {
            let current = spine.map(i);
            if i > 0 {
                let previous = spine.map(i - 1);
                step_backward[i] = first_allowed_landmark(graph, &params.banned, previous, current);
            }
            if i + 1 < n {
                let next = spine.map(i + 1);
                step_forward[i] = first_allowed_landmark(graph, &params.banned, next, current);
            }
        }

        let warp_table = WarpTable::build(graph, &spine, &params.banned);
        let warps = spine
            .maps()
            .iter()
            .map(|map| {
                warp_table
                    .get(map)
                    .iter()
                    .filter_map(|entry| {
                        Some(ResolvedWarp {
                            target: spine.index_of(&entry.target)?,
                            displacement: entry.displacement,
                            landmark: Arc::from(entry.landmark.as_str()),
                            direction: entry.direction,
                        })
                    })
                    .collect()
            })
            .collect();

        let void = spine
            .maps()
            .iter()
            .map(|map| params.void_maps.contains(map))
            .collect();

        let frame_offset = spine
            .maps()
            .iter()
            .map(|map| index.translate(graph, Vec3::ZERO, start_map, map))
            .collect::<Result<Vec<Vec3>>>()?;

        info!(
            "Spine: {} ({} maps), {} warps, {} waypoints",
            spine.maps().join(" -> "),
            n,
            warp_table.len(),
            waypoints.len()
        );
        debug!("Destination in common frame: {dest_coord}");

        Ok(Self {
            family: params.family,
            destination: params.destination,
            spine,
            warp_table,
            banned: params.banned,
            waypoints: WaypointIndex::new(waypoints, params.waypoint_distance),
            max_route_len: params.max_route_len,
            dest_coord,
            step_backward,
            step_forward,
            warps,
            void,
            frame_offset,
        })
    }

    pub fn family(&self) -> GameFamily {
        self.family
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn spine(&self) -> &Spine {
        &self.spine
    }

    pub fn warp_table(&self) -> &WarpTable {
        &self.warp_table
    }

    pub fn banned(&self) -> &BannedTransitions {
        &self.banned
    }

    pub fn waypoints(&self) -> &WaypointIndex {
        &self.waypoints
    }

    pub fn max_route_len(&self) -> usize {
        self.max_route_len
    }

    pub fn dest_coord(&self) -> Vec3 {
        self.dest_coord
    }

    pub fn start_index(&self) -> usize {
        self.spine.start_index()
    }

    pub fn dest_index(&self) -> usize {
        self.spine.dest_index()
    }

    pub fn step_backward(&self, index: usize) -> Option<&Arc<str>> {
        self.step_backward[index].as_ref()
    }

    pub fn step_forward(&self, index: usize) -> Option<&Arc<str>> {
        self.step_forward[index].as_ref()
    }

    pub fn warps(&self, index: usize) -> &[ResolvedWarp] {
        &self.warps[index]
    }

    pub fn is_void(&self, index: usize) -> bool {
        self.void[index]
    }

    /// Express a common-frame coordinate in spine map `index`'s own frame
    pub fn to_map_frame(&self, coord: Vec3, index: usize) -> Vec3 {
        coord + self.frame_offset[index]
    }
}

/// First strong landmark between the pair whose `arriving -> departing`
/// transition is not banned
///
/// Only one landmark is used for plain spine steps: any of them preserves the
/// position, so the others would only duplicate states.
fn first_allowed_landmark(
    graph: &MapGraph,
    banned: &BannedTransitions,
    arriving: &str,
    departing: &str,
) -> Option<Arc<str>> {
    graph
        .strong_pair_connections(departing, arriving)
        .into_iter()
        .find(|landmark| !banned.contains(arriving, landmark, departing))
        .map(Arc::from)
}
