//! Map graph model
//!
//! The graph is a flat list of landmark transitions. Maps are derived from the
//! edge endpoints and indexed in order of first appearance, which keeps every
//! downstream table (shortest paths, spine, warps) deterministic across runs.

use std::collections::HashMap;

use crate::core::error::{Error, Result};
use crate::core::vector::Vec3;

/// A one-directional level transition through a named landmark
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub landmark: String,
    pub to: String,
    /// Landmark position in `from`'s coordinate frame
    pub anchor: Vec3,
}

impl Edge {
    pub fn new(from: &str, landmark: &str, to: &str, anchor: Vec3) -> Self {
        Self {
            from: from.to_string(),
            landmark: landmark.to_string(),
            to: to.to_string(),
            anchor,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MapGraph {
    edges: Vec<Edge>,
    maps: Vec<String>,
    map_index: HashMap<String, usize>,
}

impl MapGraph {
    pub fn new(edges: Vec<Edge>) -> Self {
        let mut maps = Vec::new();
        let mut map_index = HashMap::new();
        for edge in &edges {
            for name in [&edge.from, &edge.to] {
                if !map_index.contains_key(name) {
                    map_index.insert(name.clone(), maps.len());
                    maps.push(name.clone());
                }
            }
        }

        Self {
            edges,
            maps,
            map_index,
        }
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn maps(&self) -> &[String] {
        &self.maps
    }

    pub fn map_count(&self) -> usize {
        self.maps.len()
    }

    pub fn index_of(&self, map: &str) -> Option<usize> {
        self.map_index.get(map).copied()
    }

    /// Like `index_of`, but an unknown name is an error carrying a suggestion
    pub fn require(&self, map: &str) -> Result<usize> {
        self.index_of(map)
            .ok_or_else(|| Error::unknown_map(map, &self.maps))
    }

    /// Landmarks with a one-directional edge `map_a -> map_b`
    pub fn connections(&self, map_a: &str, map_b: &str) -> Vec<&str> {
        let mut result: Vec<&str> = Vec::new();
        for edge in &self.edges {
            if edge.from == map_a && edge.to == map_b && !result.contains(&edge.landmark.as_str())
            {
                result.push(&edge.landmark);
            }
        }
        result
    }

    /// `(destination, landmark)` pairs for edges leaving `map`
    pub fn out_connections(&self, map: &str) -> Vec<(&str, &str)> {
        let mut result: Vec<(&str, &str)> = Vec::new();
        for edge in &self.edges {
            let pair = (edge.to.as_str(), edge.landmark.as_str());
            if edge.from == map && !result.contains(&pair) {
                result.push(pair);
            }
        }
        result
    }

    /// `(source, landmark)` pairs for edges entering `map`
    pub fn in_connections(&self, map: &str) -> Vec<(&str, &str)> {
        let mut result: Vec<(&str, &str)> = Vec::new();
        for edge in &self.edges {
            let pair = (edge.from.as_str(), edge.landmark.as_str());
            if edge.to == map && !result.contains(&pair) {
                result.push(pair);
            }
        }
        result
    }

    /// Landmarks with edges in both directions between the pair
    pub fn strong_pair_connections(&self, map_a: &str, map_b: &str) -> Vec<&str> {
        let back = self.connections(map_b, map_a);
        self.connections(map_a, map_b)
            .into_iter()
            .filter(|landmark| back.contains(landmark))
            .collect()
    }

    pub fn is_strong(&self, map_a: &str, landmark: &str, map_b: &str) -> bool {
        self.strong_pair_connections(map_a, map_b)
            .contains(&landmark)
    }

    /// Every `(neighbor, landmark)` strongly connected to `map`
    pub fn strong_connections(&self, map: &str) -> Vec<(&str, &str)> {
        let mut result: Vec<(&str, &str)> = Vec::new();
        for (neighbor, _) in self.out_connections(map) {
            for landmark in self.strong_pair_connections(map, neighbor) {
                if !result.contains(&(neighbor, landmark)) {
                    result.push((neighbor, landmark));
                }
            }
        }
        result
    }

    /// Some landmark strongly connecting the pair, when one exists
    pub fn any_strong_connection(&self, map_a: &str, map_b: &str) -> Option<&str> {
        self.strong_pair_connections(map_a, map_b).into_iter().next()
    }

    /// Position of `landmark` in `map`'s frame, zero when the map has no such landmark
    pub fn landmark_origin(&self, map: &str, landmark: &str) -> Vec3 {
        self.edges
            .iter()
            .find(|edge| edge.from == map && edge.landmark == landmark)
            .map(|edge| edge.anchor)
            .unwrap_or(Vec3::ZERO)
    }
}
