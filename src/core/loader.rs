//! Graph and waypoint file readers
//!
//! Graph files hold one transition per line:
//!
//! ```text
//! "c1a0","c1a0toc1a0d","c1a0d","-192 1664 -28"
//! ```
//!
//! Waypoint files differ per engine family. GoldSrc dumps are `map | x y z`
//! with integer components; Source dumps are eight whitespace separated
//! tokens with the map first and X/Y/Z at positions 2, 4 and 6.

use std::path::Path;

use log::{debug, info, warn};

use crate::core::config::GameFamily;
use crate::core::error::{Error, Result};
use crate::core::graph::{Edge, MapGraph};
use crate::core::paths::{PathIndex, Spine};
use crate::core::vector::Vec3;
use crate::core::waypoints::Waypoint;

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and parse a graph file
pub fn load_graph(path: &Path, family: GameFamily) -> Result<MapGraph> {
    let text = read_file(path)?;
    let edges = parse_graph(&text, family).map_err(|(line, message)| Error::Parse {
        file: path.to_path_buf(),
        line,
        message,
    })?;
    if edges.is_empty() {
        return Err(Error::InvalidInput(format!(
            "no transitions in graph file '{}'",
            path.display()
        )));
    }

    let graph = MapGraph::new(edges);
    info!(
        "Graph loaded: {} transitions across {} maps",
        graph.edges().len(),
        graph.map_count()
    );
    Ok(graph)
}

/// Parse graph text; errors carry a 1-based line number
pub fn parse_graph(
    text: &str,
    family: GameFamily,
) -> std::result::Result<Vec<Edge>, (usize, String)> {
    let mut edges = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        // blank trailing lines and comments fall out here
        if fields.len() != 4 {
            continue;
        }
        let fields: Vec<&str> = fields.iter().map(|f| strip_quotes(f)).collect();

        let components = fields[3]
            .split(' ')
            .map(|c| c.parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| (number + 1, format!("bad anchor '{}': {e}", fields[3])))?;
        let [x, y, z] = components[..] else {
            return Err((
                number + 1,
                format!("anchor '{}' must have three components", fields[3]),
            ));
        };
        let anchor = Vec3::new(x, y, z);

        let edge = match family {
            GameFamily::Source => {
                if fields[0] == fields[2] {
                    debug!("Skipping self transition on line {}", number + 1);
                    continue;
                }
                Edge::new(fields[0], fields[1], fields[2], anchor)
            }
            GameFamily::GoldSrc => Edge::new(fields[0], fields[1], fields[2], anchor.trunc()),
        };
        edges.push(edge);
    }

    Ok(edges)
}

/// Drop the first and last character of a quoted field
fn strip_quotes(field: &str) -> &str {
    let mut chars = field.chars();
    chars.next();
    chars.next_back();
    chars.as_str()
}

/// A waypoint as declared, in its own map's frame
#[derive(Debug, Clone, PartialEq)]
pub struct RawWaypoint {
    pub map: String,
    pub coord: Vec3,
}

/// Parse waypoint text in the family's format; unrecognised lines are skipped
pub fn parse_waypoints(
    text: &str,
    family: GameFamily,
) -> std::result::Result<Vec<RawWaypoint>, (usize, String)> {
    let mut waypoints = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.trim_end_matches(&['\r', '\n'][..]);
        match family {
            GameFamily::Source => {
                let data: Vec<&str> = line.split_whitespace().collect();
                if data.len() != 8 {
                    continue;
                }
                let coord = [data[2], data[4], data[6]]
                    .iter()
                    .map(|c| c.parse::<f64>())
                    .collect::<std::result::Result<Vec<f64>, _>>()
                    .map_err(|e| (number + 1, format!("bad waypoint coordinate: {e}")))?;
                waypoints.push(RawWaypoint {
                    map: data[0].to_string(),
                    coord: Vec3::new(coord[0], coord[1], coord[2]),
                });
            }
            GameFamily::GoldSrc => {
                let data: Vec<&str> = line.split(" | ").collect();
                if data.len() != 2 {
                    continue;
                }
                let coord = data[1]
                    .split(' ')
                    .map(|c| c.trim().parse::<i64>())
                    .collect::<std::result::Result<Vec<i64>, _>>()
                    .map_err(|e| (number + 1, format!("bad waypoint coordinate: {e}")))?;
                let [x, y, z] = coord[..] else {
                    return Err((number + 1, "waypoint needs three coordinates".to_string()));
                };
                waypoints.push(RawWaypoint {
                    map: data[0].to_string(),
                    coord: Vec3::new(x as f64, y as f64, z as f64),
                });
            }
        }
    }

    Ok(waypoints)
}

/// Load waypoints and bring them into the common frame of `start_map`
///
/// Source waypoints are kept only for spine maps other than the destination.
/// Waypoints on maps the graph does not know, or that no strong chain links
/// to the start map, can never be matched and are dropped with a warning.
pub fn load_waypoints(
    path: &Path,
    family: GameFamily,
    graph: &MapGraph,
    index: &PathIndex,
    spine: &Spine,
    start_map: &str,
) -> Result<Vec<Waypoint>> {
    let text = read_file(path)?;
    let raw = parse_waypoints(&text, family).map_err(|(line, message)| Error::Parse {
        file: path.to_path_buf(),
        line,
        message,
    })?;
    resolve_waypoints(raw, family, graph, index, spine, start_map)
}

pub fn resolve_waypoints(
    raw: Vec<RawWaypoint>,
    family: GameFamily,
    graph: &MapGraph,
    index: &PathIndex,
    spine: &Spine,
    start_map: &str,
) -> Result<Vec<Waypoint>> {
    let searchable = &spine.maps()[..spine.dest_index()];
    let mut waypoints = Vec::with_capacity(raw.len());

    for waypoint in raw {
        if family == GameFamily::Source && !searchable.contains(&waypoint.map) {
            continue;
        }
        match index.translate(graph, waypoint.coord, &waypoint.map, start_map) {
            Ok(coord) => waypoints.push(Waypoint::new(&waypoint.map, coord)),
            Err(Error::UnknownMap { name, .. }) => {
                warn!("Skipping waypoint on unknown map '{name}'");
            }
            Err(Error::Unreachable { .. }) => {
                warn!(
                    "Skipping waypoint on '{}': not connected to '{start_map}'",
                    waypoint.map
                );
            }
            Err(other) => return Err(other),
        }
    }

    info!("Waypoints loaded: {}", waypoints.len());
    Ok(waypoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_graph_goldsrc_truncates() {
        let text = "\"c1a0\",\"lm01\",\"c1a0d\",\"-192.7 1664.2 -28.9\"\n\
                    \"c1a0d\",\"lm01\",\"c1a0\",\"0 0 0\"\n\
                    \n";
        let edges = parse_graph(text, GameFamily::GoldSrc).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].from, "c1a0");
        assert_eq!(edges[0].landmark, "lm01");
        assert_eq!(edges[0].to, "c1a0d");
        assert_eq!(edges[0].anchor, Vec3::new(-192.0, 1664.0, -28.0));
    }

    #[test]
    fn test_parse_graph_goldsrc_small_negative_anchor_prints_zero() {
        let text = "\"c1a0\",\"lm01\",\"c1a0d\",\"-0.5 3 4\"\n";
        let edges = parse_graph(text, GameFamily::GoldSrc).unwrap();
        assert_eq!(edges[0].anchor.to_string(), "0 3 4");
    }

    #[test]
    fn test_parse_graph_source_drops_self_transitions() {
        let text = "\"d1_a\",\"lm\",\"d1_a\",\"1 2 3\"\n\
                    \"d1_a\",\"lm\",\"d1_b\",\"1.5 2.25 3\"\n";
        let edges = parse_graph(text, GameFamily::Source).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].anchor, Vec3::new(1.5, 2.25, 3.0));
    }

    #[test]
    fn test_parse_graph_bad_anchor_reports_line() {
        let text = "\"a\",\"l\",\"b\",\"1 2 3\"\n\"b\",\"l\",\"a\",\"1 x 3\"\n";
        let (line, message) = parse_graph(text, GameFamily::GoldSrc).unwrap_err();
        assert_eq!(line, 2);
        assert!(message.contains("1 x 3"));
    }

    #[test]
    fn test_parse_waypoints_goldsrc() {
        let text = "c1a0 | 10 -20 36\nnot a waypoint\nc1a1 | 0 0 0\n";
        let waypoints = parse_waypoints(text, GameFamily::GoldSrc).unwrap();
        assert_eq!(
            waypoints,
            vec![
                RawWaypoint {
                    map: "c1a0".to_string(),
                    coord: Vec3::new(10.0, -20.0, 36.0)
                },
                RawWaypoint {
                    map: "c1a1".to_string(),
                    coord: Vec3::ZERO
                },
            ]
        );
    }

    #[test]
    fn test_parse_waypoints_source() {
        let text = "d1_canals_01 x: 12.5 y: -3 z: 64.25 saved\nshort line\n";
        let waypoints = parse_waypoints(text, GameFamily::Source).unwrap();
        assert_eq!(waypoints.len(), 1);
        assert_eq!(waypoints[0].map, "d1_canals_01");
        assert_eq!(waypoints[0].coord, Vec3::new(12.5, -3.0, 64.25));
    }

    #[test]
    fn test_resolve_waypoints_translates_and_filters() {
        let graph = MapGraph::new(vec![
            Edge::new("a", "ab", "b", Vec3::new(0.0, 0.0, 0.0)),
            Edge::new("b", "ab", "a", Vec3::new(10.0, 0.0, 0.0)),
            Edge::new("island", "x", "a", Vec3::ZERO),
        ]);
        let index = PathIndex::build(&graph);
        let spine = index.build_spine(&graph, "a", "b").unwrap();
        let raw = vec![
            RawWaypoint {
                map: "b".to_string(),
                coord: Vec3::new(10.0, 0.0, 0.0),
            },
            RawWaypoint {
                map: "island".to_string(),
                coord: Vec3::ZERO,
            },
            RawWaypoint {
                map: "unknown".to_string(),
                coord: Vec3::ZERO,
            },
        ];

        let waypoints =
            resolve_waypoints(raw.clone(), GameFamily::GoldSrc, &graph, &index, &spine, "a")
                .unwrap();
        assert_eq!(waypoints, vec![Waypoint::new("b", Vec3::ZERO)]);

        // Source keeps only spine maps before the destination
        let waypoints =
            resolve_waypoints(raw, GameFamily::Source, &graph, &index, &spine, "a").unwrap();
        assert!(waypoints.is_empty());
    }
}
