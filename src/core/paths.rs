//! All-pairs shortest paths over strong connections
//!
//! The index only answers "which chain of maps joins A and B". It is used to
//! carry coordinates between map frames and to lay out the route spine; it
//! never bounds the search itself.
//!
//! # Construction
//!
//! Floyd-Warshall on unit weights. Two maps are adjacent when they share at
//! least one strong connection. `pred[u][v]` is the first hop on a shortest
//! path from `u` toward `v`; it is replaced only when a strictly shorter path
//! through an intermediate map turns up, so ties keep the earliest discovery.

use log::debug;

use crate::core::error::{Error, Result};
use crate::core::graph::MapGraph;
use crate::core::vector::Vec3;

const UNREACHABLE: u32 = u32::MAX;

#[derive(Debug, Clone)]
pub struct PathIndex {
    dist: Vec<Vec<u32>>,
    pred: Vec<Vec<Option<usize>>>,
}

impl PathIndex {
    pub fn build(graph: &MapGraph) -> Self {
        let maps = graph.maps();
        let n = maps.len();
        let mut dist = vec![vec![UNREACHABLE; n]; n];
        let mut pred = vec![vec![None; n]; n];

        for i in 0..n {
            dist[i][i] = 0;
            for j in (i + 1)..n {
                if graph.any_strong_connection(&maps[i], &maps[j]).is_some() {
                    dist[i][j] = 1;
                    dist[j][i] = 1;
                    pred[i][j] = Some(j);
                    pred[j][i] = Some(i);
                }
            }
        }

        for k in 0..n {
            for u in 0..n {
                if dist[u][k] == UNREACHABLE {
                    continue;
                }
                for v in 0..n {
                    if u == v || dist[k][v] == UNREACHABLE {
                        continue;
                    }
                    let through = dist[u][k] + dist[k][v];
                    if through < dist[u][v] {
                        dist[u][v] = through;
                        pred[u][v] = pred[u][k];
                    }
                }
            }
        }

        debug!("Shortest-path index built over {n} maps");
        Self { dist, pred }
    }

    /// Hop count between two map indices, `None` if unreachable
    pub fn distance(&self, from: usize, to: usize) -> Option<u32> {
        match self.dist[from][to] {
            UNREACHABLE => None,
            d => Some(d),
        }
    }

    /// Next map on a shortest path from `from` toward `to`
    pub fn next_hop(&self, from: usize, to: usize) -> Option<usize> {
        self.pred[from][to]
    }

    /// Map indices from `from` to `to` inclusive
    pub fn chain(&self, graph: &MapGraph, from: usize, to: usize) -> Result<Vec<usize>> {
        let mut chain = vec![from];
        let mut current = from;
        while current != to {
            let next = self.next_hop(current, to).ok_or_else(|| Error::Unreachable {
                from: graph.maps()[from].clone(),
                to: graph.maps()[to].clone(),
            })?;
            // A predecessor walk can never be longer than the map count
            if chain.len() > graph.map_count() {
                return Err(Error::PredecessorCycle {
                    from: graph.maps()[from].clone(),
                    to: graph.maps()[to].clone(),
                    at: graph.maps()[current].clone(),
                });
            }
            chain.push(next);
            current = next;
        }
        Ok(chain)
    }

    /// Express `coord`, given in `from_map`'s frame, in `to_map`'s frame
    pub fn translate(
        &self,
        graph: &MapGraph,
        coord: Vec3,
        from_map: &str,
        to_map: &str,
    ) -> Result<Vec3> {
        let from = graph.require(from_map)?;
        let to = graph.require(to_map)?;

        let mut coord = coord;
        for hop in self.chain(graph, from, to)?.windows(2) {
            let current = &graph.maps()[hop[0]];
            let next = &graph.maps()[hop[1]];
            let landmark =
                graph
                    .any_strong_connection(next, current)
                    .ok_or_else(|| Error::MissingLandmark {
                        from: current.clone(),
                        to: next.clone(),
                    })?;
            coord += graph.landmark_origin(next, landmark) - graph.landmark_origin(current, landmark);
        }
        Ok(coord)
    }

    /// Lay out the spine: the maps on the shortest path from start to destination
    pub fn build_spine(&self, graph: &MapGraph, start_map: &str, dest_map: &str) -> Result<Spine> {
        let start = graph.require(start_map)?;
        let dest = graph.require(dest_map)?;
        let maps = self
            .chain(graph, start, dest)?
            .into_iter()
            .map(|i| graph.maps()[i].clone())
            .collect();
        Ok(Spine { maps })
    }
}

/// Ordered maps from the start map (index 0) to the destination map (last)
#[derive(Debug, Clone, PartialEq)]
pub struct Spine {
    maps: Vec<String>,
}

impl Spine {
    pub fn maps(&self) -> &[String] {
        &self.maps
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    pub fn map(&self, index: usize) -> &str {
        &self.maps[index]
    }

    pub fn index_of(&self, map: &str) -> Option<usize> {
        self.maps.iter().position(|m| m == map)
    }

    pub fn contains(&self, map: &str) -> bool {
        self.index_of(map).is_some()
    }

    pub fn start_index(&self) -> usize {
        0
    }

    pub fn dest_index(&self) -> usize {
        self.maps.len().saturating_sub(1)
    }
}
