//! Warp vectors between spine maps
//!
//! A save-warp leaves map X through landmark `XY` but is re-targeted at map Y
//! through a different landmark `ZY` that Y shares with some third map Z. The
//! player arrives in Y displaced by the mismatch between the two landmark
//! pairs:
//!
//! ```text
//! A = origin(X, XY)    B = origin(X, ZY)
//! C = origin(Y, ZY)    D = origin(Y, XY)
//! displacement = (C - B) + (A - D)
//! ```
//!
//! A zero displacement is an ordinary spine step and is left out. The search
//! runs backwards, so entries are keyed by the landing map Y and point at the
//! map X the reverse search moves to.

use std::collections::HashMap;
use std::fmt;

use log::debug;

use crate::core::config::BannedTransitions;
use crate::core::graph::MapGraph;
use crate::core::paths::Spine;
use crate::core::vector::Vec3;

/// Spine direction of a warp in play order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Landing map precedes the origin map on the spine
    Backward,
    /// Landing map follows the origin map
    Forward,
}

impl Direction {
    pub fn sign(self) -> i32 {
        match self {
            Direction::Backward => -1,
            Direction::Forward => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WarpEntry {
    pub displacement: Vec3,
    /// Map the reverse search moves to (the map the warp is performed from)
    pub target: String,
    /// Landmark the warp is re-targeted through
    pub landmark: String,
    pub direction: Direction,
}

impl fmt::Display for WarpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] -> {} via {} ({:+})",
            self.displacement,
            self.target,
            self.landmark,
            self.direction.sign()
        )
    }
}

/// A warp as found, before keying and de-duplication
#[derive(Debug, Clone, PartialEq)]
pub struct RawWarp {
    /// Map the warp is performed from (X)
    pub origin: String,
    /// Landmark the save is taken through (XY)
    pub departure: String,
    /// Map the player lands on (Y)
    pub landing: String,
    pub entry: WarpEntry,
}

impl fmt::Display for RawWarp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} via {} -> {} via {} [{}] ({:+})",
            self.origin,
            self.departure,
            self.landing,
            self.entry.landmark,
            self.entry.displacement,
            self.entry.direction.sign()
        )
    }
}

/// Warp entries keyed by the map the reverse search departs from
#[derive(Debug, Clone, Default)]
pub struct WarpTable {
    order: Vec<String>,
    entries: HashMap<String, Vec<WarpEntry>>,
    raw: Vec<RawWarp>,
}

impl WarpTable {
    /// Compute warps for every map on the spine
    pub fn build(graph: &MapGraph, spine: &Spine, banned: &BannedTransitions) -> Self {
        let mut table = WarpTable::default();

        for (x_index, x) in spine.maps().iter().enumerate() {
            for (y, landmark_xy) in graph.strong_connections(x) {
                let Some(y_index) = spine.index_of(y) else {
                    continue;
                };

                for (z, landmark_zy) in graph.in_connections(y) {
                    if !spine.contains(z) {
                        continue;
                    }
                    if !graph.is_strong(z, landmark_zy, y) {
                        continue;
                    }
                    if banned.contains(z, landmark_zy, y) {
                        continue;
                    }

                    let a = graph.landmark_origin(x, landmark_xy);
                    let b = graph.landmark_origin(x, landmark_zy);
                    let c = graph.landmark_origin(y, landmark_zy);
                    let d = graph.landmark_origin(y, landmark_xy);
                    let displacement = (c - b) + (a - d);
                    if displacement.is_zero() {
                        continue;
                    }

                    let direction = if y_index < x_index {
                        Direction::Backward
                    } else {
                        Direction::Forward
                    };

                    table.insert(RawWarp {
                        origin: x.clone(),
                        departure: landmark_xy.to_string(),
                        landing: y.to_string(),
                        entry: WarpEntry {
                            displacement,
                            target: x.clone(),
                            landmark: landmark_zy.to_string(),
                            direction,
                        },
                    });
                }
            }
        }

        debug!(
            "Warp table: {} raw warps, {} distinct across {} maps",
            table.raw_count(),
            table.len(),
            table.order.len()
        );
        table
    }

    fn insert(&mut self, raw: RawWarp) {
        let list = self.entries.entry(raw.landing.clone()).or_insert_with(|| {
            self.order.push(raw.landing.clone());
            Vec::new()
        });
        if !list.contains(&raw.entry) {
            list.push(raw.entry.clone());
        }
        self.raw.push(raw);
    }

    pub fn get(&self, map: &str) -> &[WarpEntry] {
        self.entries.get(map).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(map, entries)` in first-insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[WarpEntry])> {
        self.order
            .iter()
            .map(|map| (map.as_str(), self.get(map)))
    }

    /// Every warp found, duplicates included, in discovery order
    pub fn raw(&self) -> &[RawWarp] {
        &self.raw
    }

    /// Warps found before duplicates were dropped
    pub fn raw_count(&self) -> usize {
        self.raw.len()
    }

    /// Distinct entries
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
