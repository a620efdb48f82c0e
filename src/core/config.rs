//! Per-game configuration
//!
//! Each supported game ships a `config_<game>.json` next to its graph and
//! waypoint files:
//!
//! ```json
//! {
//!   "graphFile": "graph_hl1.csv",
//!   "waypointsFile": "waypoints_hl1.txt",
//!   "bannedTransitions": [["c1a0d", "c1a0dtoc1a0e", "c1a0e"]],
//!   "voidMaps": ["c2a5"],
//!   "warpStartMap": "c1a0",
//!   "isSourceOE": false
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::core::error::{Error, Result};
use crate::core::vector::Vec3;

/// Engine family; decides data formats, match radius and console dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameFamily {
    /// Source engine (original episode builds), real-valued coordinates
    Source,
    /// GoldSrc engine, integer coordinates, positions set through BXT
    GoldSrc,
}

impl GameFamily {
    pub fn from_source_flag(is_source_oe: bool) -> Self {
        if is_source_oe {
            GameFamily::Source
        } else {
            GameFamily::GoldSrc
        }
    }

    /// Default radius within which a state counts as reaching a waypoint
    pub fn waypoint_distance(self) -> f64 {
        match self {
            GameFamily::Source => 4000.0,
            GameFamily::GoldSrc => 800.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGameConfig {
    graph_file: PathBuf,
    waypoints_file: PathBuf,
    #[serde(default)]
    banned_transitions: Vec<[String; 3]>,
    #[serde(default)]
    void_maps: Vec<String>,
    warp_start_map: String,
    #[serde(rename = "isSourceOE")]
    is_source_oe: bool,
    #[serde(default)]
    waypoint_distance: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub graph_file: PathBuf,
    pub waypoints_file: PathBuf,
    pub banned: BannedTransitions,
    pub void_maps: HashSet<String>,
    /// Start of the spine; its frame is the common coordinate frame
    pub start_map: String,
    pub family: GameFamily,
    pub waypoint_distance: f64,
}

impl GameConfig {
    /// Path of the configuration file for `game` inside `dir`
    pub fn path_for(dir: &Path, game: &str) -> PathBuf {
        dir.join(format!("config_{game}.json"))
    }

    /// Load `config_<game>.json` from `dir`; data file paths resolve against `dir`
    pub fn load(dir: &Path, game: &str) -> Result<Self> {
        let path = Self::path_for(dir, game);
        let text = std::fs::read_to_string(&path).map_err(|source| Error::Io {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_json(&text, dir).map_err(|err| match err {
            Error::Json { source, .. } => Error::Json {
                path: path.clone(),
                source,
            },
            other => other,
        })?;
        debug!(
            "Loaded {} ({:?}, {} banned transitions, {} void maps)",
            path.display(),
            config.family,
            config.banned.len(),
            config.void_maps.len()
        );
        Ok(config)
    }

    pub fn from_json(text: &str, base_dir: &Path) -> Result<Self> {
        let raw: RawGameConfig = serde_json::from_str(text).map_err(|source| Error::Json {
            path: PathBuf::new(),
            source,
        })?;

        let family = GameFamily::from_source_flag(raw.is_source_oe);
        let waypoint_distance = match raw.waypoint_distance {
            Some(d) if d > 0.0 => d,
            Some(d) => {
                return Err(Error::InvalidInput(format!(
                    "waypointDistance must be positive, got {d}"
                )))
            }
            None => family.waypoint_distance(),
        };

        Ok(Self {
            graph_file: base_dir.join(raw.graph_file),
            waypoints_file: base_dir.join(raw.waypoints_file),
            banned: BannedTransitions::new(raw.banned_transitions),
            void_maps: raw.void_maps.into_iter().collect(),
            start_map: raw.warp_start_map,
            family,
            waypoint_distance,
        })
    }
}

/// `(from, landmark, to)` transitions the search must not use
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BannedTransitions {
    triples: Vec<[String; 3]>,
    lookup: HashSet<(String, String, String)>,
}

impl BannedTransitions {
    pub fn new<I, S>(triples: I) -> Self
    where
        I: IntoIterator<Item = [S; 3]>,
        S: Into<String>,
    {
        let mut banned = Self::default();
        for [from, landmark, to] in triples {
            let triple = [from.into(), landmark.into(), to.into()];
            let key = (triple[0].clone(), triple[1].clone(), triple[2].clone());
            if banned.lookup.insert(key) {
                banned.triples.push(triple);
            }
        }
        banned
    }

    pub fn contains(&self, from: &str, landmark: &str, to: &str) -> bool {
        self.lookup
            .contains(&(from.to_string(), landmark.to_string(), to.to_string()))
    }

    /// Triples in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &[String; 3]> {
        self.triples.iter()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }
}

/// Target of the search: a map and a position in that map's frame
#[derive(Debug, Clone, PartialEq)]
pub struct Destination {
    pub map: String,
    pub coord: Vec3,
    /// Text as given on the command line, echoed in every solution
    pub description: String,
}

impl Destination {
    /// Parse `"<map> at: x, y, z"`
    ///
    /// Components may carry a trailing unit suffix and are truncated toward
    /// zero, the form position readouts are copied from.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = |why: &str| Error::InvalidInput(format!("destination '{text}': {why}"));

        let (map, coords) = text
            .split_once(" at: ")
            .ok_or_else(|| invalid("expected '<map> at: x, y, z'"))?;
        let map = map.trim();
        if map.is_empty() {
            return Err(invalid("missing map name"));
        }

        let components = coords
            .split(',')
            .map(|part| parse_component(part).ok_or_else(|| invalid("bad coordinate")))
            .collect::<Result<Vec<f64>>>()?;
        let [x, y, z] = components[..] else {
            return Err(invalid("expected three coordinates"));
        };

        Ok(Self {
            map: map.to_string(),
            coord: Vec3::new(x, y, z).trunc(),
            description: text.trim().to_string(),
        })
    }
}

fn parse_component(part: &str) -> Option<f64> {
    let trimmed = part
        .trim()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic());
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
