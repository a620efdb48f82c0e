//! Error types for swarp-route
//!
//! Every failure the library can report is a configuration or data problem
//! detected before the search starts, or an internal consistency violation of
//! the shortest-path index. Finding no route is not an error.

use std::path::PathBuf;
use strsim::{jaro_winkler, normalized_levenshtein};

/// Main error type for swarp-route operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File could not be opened or read
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Game configuration is not valid JSON or misses a field
    #[error("Invalid game configuration '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A data file line could not be parsed
    #[error("{}:{line}: {message}", .file.display())]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// Map name not present in the graph
    #[error("Map '{name}' not found in graph{}", suggestion_suffix(.suggestion))]
    UnknownMap {
        name: String,
        suggestion: Option<String>,
    },

    /// No chain of strong connections joins the two maps
    #[error("Map '{to}' is not reachable from '{from}' through strong connections")]
    Unreachable { from: String, to: String },

    /// The shortest-path index links two maps that share no strong landmark
    #[error("Internal inconsistency: no strong landmark between '{from}' and '{to}'")]
    MissingLandmark { from: String, to: String },

    /// Following next-hop links from one map never reaches the other
    #[error("Internal inconsistency: shortest-path chain from '{from}' to '{to}' loops at '{at}'")]
    PredecessorCycle { from: String, to: String, at: String },

    /// Invalid configuration or parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

fn suggestion_suffix(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{name}'?)"),
        None => String::new(),
    }
}

impl Error {
    /// Build an `UnknownMap` error with a fuzzy suggestion drawn from `known`
    pub fn unknown_map<S: AsRef<str>>(name: &str, known: &[S]) -> Self {
        Error::UnknownMap {
            name: name.to_string(),
            suggestion: suggest_map(name, known),
        }
    }
}

/// Suggest the closest known map name for a misspelled one
///
/// Blends Jaro-Winkler (70%) with normalized Levenshtein (30%). Map names are
/// short and often differ only in a trailing digit or letter (`c1a0d` vs
/// `c1a0e`), so a shared-prefix bonus is added for inputs of four or more
/// characters. Candidates below 0.65 are never suggested.
pub fn suggest_map<S: AsRef<str>>(name: &str, known: &[S]) -> Option<String> {
    let input = name.to_lowercase();
    let min_threshold = 0.65;

    let mut best_match = None;
    let mut best_score = 0.0f64;

    for candidate in known {
        let candidate = candidate.as_ref();
        let candidate_lower = candidate.to_lowercase();

        // Exact case-insensitive match: the caller got the case wrong, say so
        if candidate_lower == input {
            return Some(candidate.to_string());
        }

        let jw_score = jaro_winkler(&input, &candidate_lower);
        let lev_score = normalized_levenshtein(&input, &candidate_lower);
        let mut score = (jw_score * 0.7) + (lev_score * 0.3);

        let prefix_len = input
            .chars()
            .zip(candidate_lower.chars())
            .take_while(|(a, b)| a == b)
            .count();
        if input.chars().count() >= 4 && prefix_len >= 4 {
            score += 0.1 * (prefix_len as f64 / input.chars().count() as f64);
        }

        if score >= min_threshold && score > best_score {
            best_score = score;
            best_match = Some(candidate.to_string());
        }
    }

    best_match
}

/// Convenience result type for swarp-route operations
pub type Result<T> = std::result::Result<T, Error>;
