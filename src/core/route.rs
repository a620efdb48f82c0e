//! Route transitions
//!
//! The search walks from the destination back toward the start, so a route is
//! recorded in search order and reversed for presentation. Each transition is
//! printed with the one-letter code the in-game save-warp plugin uses:
//!
//! | code | transition                        |
//! |------|-----------------------------------|
//! | `l`  | spine step toward the start map   |
//! | `k`  | spine step toward the destination |
//! | `x`  | warp                              |
//! | `v`  | backward warp                     |

use std::fmt;
use std::sync::Arc;

use crate::core::paths::Spine;

/// One step of a route; `map` is the spine index the step departs from in search order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Transition {
    SpineBackward { map: usize, landmark: Arc<str> },
    SpineForward { map: usize, landmark: Arc<str> },
    Warp { map: usize, landmark: Arc<str> },
    BackwardWarp { map: usize, landmark: Arc<str> },
}

impl Transition {
    pub fn code(&self) -> char {
        match self {
            Transition::SpineBackward { .. } => 'l',
            Transition::SpineForward { .. } => 'k',
            Transition::Warp { .. } => 'x',
            Transition::BackwardWarp { .. } => 'v',
        }
    }

    pub fn map(&self) -> usize {
        match self {
            Transition::SpineBackward { map, .. }
            | Transition::SpineForward { map, .. }
            | Transition::Warp { map, .. }
            | Transition::BackwardWarp { map, .. } => *map,
        }
    }

    pub fn landmark(&self) -> &str {
        match self {
            Transition::SpineBackward { landmark, .. }
            | Transition::SpineForward { landmark, .. }
            | Transition::Warp { landmark, .. }
            | Transition::BackwardWarp { landmark, .. } => landmark,
        }
    }

    /// Token form, e.g. `l(c1a0,landmark_01)`
    pub fn display<'a>(&'a self, spine: &'a Spine) -> impl fmt::Display + 'a {
        TransitionDisplay {
            transition: self,
            spine,
        }
    }
}

struct TransitionDisplay<'a> {
    transition: &'a Transition,
    spine: &'a Spine,
}

impl fmt::Display for TransitionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{})",
            self.transition.code(),
            self.spine.map(self.transition.map()),
            self.transition.landmark()
        )
    }
}

/// Transitions in search order (destination first)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Route {
    steps: Vec<Transition>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[Transition] {
        &self.steps
    }

    /// A copy of this route extended by one transition
    pub fn with(&self, step: Transition) -> Self {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        Self { steps }
    }

    /// True when a spine step is immediately undone by the opposite spine step
    pub fn contains_backtrack(&self) -> bool {
        self.steps.windows(2).any(|pair| {
            matches!(
                (&pair[0], &pair[1]),
                (Transition::SpineForward { .. }, Transition::SpineBackward { .. })
                    | (Transition::SpineBackward { .. }, Transition::SpineForward { .. })
            )
        })
    }

    /// Transitions in play order (start first)
    pub fn forward(&self) -> impl Iterator<Item = &Transition> {
        self.steps.iter().rev()
    }

    /// Play-order codes only, e.g. `llxk`
    pub fn compact(&self) -> String {
        self.forward().map(Transition::code).collect()
    }

    /// Play-order tokens separated by spaces
    pub fn tokens(&self, spine: &Spine) -> String {
        self.forward()
            .map(|t| t.display(spine).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
