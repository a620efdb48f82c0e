//! Save-point proximity lookup

use crate::core::vector::Vec3;

/// Known save position, coordinates in the common (start map) frame
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub coord: Vec3,
    pub map: String,
}

impl Waypoint {
    pub fn new(map: &str, coord: Vec3) -> Self {
        Self {
            coord,
            map: map.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WaypointMatch<'a> {
    pub distance: f64,
    pub map: &'a str,
    /// Height of the waypoint above the point when matched across a void, else 0
    pub vertical_shift: f64,
}

#[derive(Debug, Clone)]
pub struct WaypointIndex {
    waypoints: Vec<Waypoint>,
    threshold: f64,
}

impl WaypointIndex {
    pub fn new(waypoints: Vec<Waypoint>, threshold: f64) -> Self {
        Self {
            waypoints,
            threshold,
        }
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// First waypoint within the threshold, scanning latest-declared first
    ///
    /// After a void has been crossed the traveler can drop onto anything below
    /// it, so a waypoint higher than `point` is compared on X/Y only and the
    /// height difference is reported as the vertical shift.
    pub fn nearest(&self, point: Vec3, void_crossed: bool) -> Option<WaypointMatch<'_>> {
        self.waypoints.iter().rev().find_map(|waypoint| {
            let shift_z = waypoint.coord.z - point.z;
            let (distance, vertical_shift) = if void_crossed && shift_z > 0.0 {
                (waypoint.coord.planar_distance(point), shift_z)
            } else {
                (waypoint.coord.distance(point), 0.0)
            };

            (distance < self.threshold).then_some(WaypointMatch {
                distance,
                map: &waypoint.map,
                vertical_shift,
            })
        })
    }
}
