//! Concurrent route search
//!
//! The search starts at the destination and walks the spine backwards toward
//! the start map, trying plain spine steps and every warp from each map. A
//! state that lands near a waypoint on its own map is a solution; the search
//! keeps going past it, so one run reports every route it finds up to the
//! maximum length.
//!
//! # Work distribution
//!
//! A fixed pool of OS threads shares one unbounded crossbeam channel. A
//! pending counter acts as a wait group: it is raised before a state is sent
//! and lowered only after that state's children have been sent, so it reaches
//! zero exactly when nothing is queued or in flight. The worker that drops it
//! to zero posts one shutdown message per worker.
//!
//! # Deduplication
//!
//! Each `(coordinate, spine index)` pair is expanded at most once per run.
//! Coordinates are quantized to 1/1024 unit before hashing so that float noise
//! from different warp orders collapses to the same key. The visited set lock
//! is held only for the check-and-insert.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use crate::core::context::RoutingContext;
use crate::core::route::{Route, Transition};
use crate::core::vector::Vec3;
use crate::core::warps::Direction;

/// Called with the route length each time the search reaches a new depth
pub type ProgressCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Options for a search run
#[derive(Clone)]
pub struct SearchOptions {
    /// Worker threads; zero is treated as one
    pub threads: usize,
    pub progress: Option<ProgressCallback>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            progress: None,
        }
    }
}

impl std::fmt::Debug for SearchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOptions")
            .field("threads", &self.threads)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// A point in the search space; `coord` is in the common frame
#[derive(Debug, Clone)]
pub struct SearchState {
    pub map_index: usize,
    pub coord: Vec3,
    pub void_crossed: bool,
    pub route: Route,
}

/// Dedup key: quantized coordinate plus spine index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateKey {
    x: i64,
    y: i64,
    z: i64,
    map_index: usize,
}

impl StateKey {
    /// Fixed-point resolution, 2^-10 game units
    pub const QUANTUM: f64 = 1.0 / 1024.0;

    pub fn new(coord: Vec3, map_index: usize) -> Self {
        let q = |v: f64| (v / Self::QUANTUM).round() as i64;
        Self {
            x: q(coord.x),
            y: q(coord.y),
            z: q(coord.z),
            map_index,
        }
    }
}

/// A route that ends within reach of a waypoint
#[derive(Debug, Clone)]
pub struct Solution {
    /// Spine index of the matched waypoint's map
    pub map_index: usize,
    pub map: String,
    /// Where the route leaves the traveler, common frame
    pub state_coord: Vec3,
    /// Same point in the waypoint map's own frame
    pub position: Vec3,
    /// Distance to the matched waypoint
    pub distance: f64,
    pub vertical_shift: f64,
    /// Transitions in search order
    pub route: Route,
}

impl Solution {
    pub fn key(&self) -> StateKey {
        StateKey::new(self.state_coord, self.map_index)
    }
}

/// Counters reported when a run completes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSummary {
    /// Distinct states taken off the queue
    pub states_visited: usize,
    /// States that survived pruning and produced children
    pub states_expanded: usize,
    pub solutions: usize,
    /// Longest route dequeued
    pub deepest_route: usize,
}

enum Message {
    State(SearchState),
    Shutdown,
}

pub struct Search<'a> {
    ctx: &'a RoutingContext,
    options: SearchOptions,
}

impl<'a> Search<'a> {
    pub fn new(ctx: &'a RoutingContext, options: SearchOptions) -> Self {
        Self { ctx, options }
    }

    /// Run to completion, handing each solution to `on_solution` as it is found
    ///
    /// `on_solution` is called concurrently from worker threads; a sink that
    /// writes several lines must lock its output itself. If it panics, the
    /// other workers drain the queue and the panic is re-raised here.
    pub fn run<F>(&self, on_solution: F) -> SearchSummary
    where
        F: Fn(&Solution) + Sync,
    {
        let workers = self.options.threads.max(1);
        let (tx, rx) = unbounded();
        let shared = Shared {
            ctx: self.ctx,
            tx,
            workers,
            pending: AtomicUsize::new(0),
            visited: Mutex::new(FxHashSet::default()),
            deepest: Mutex::new(0),
            expanded: AtomicUsize::new(0),
            solutions: AtomicUsize::new(0),
            progress: self.options.progress.clone(),
            on_solution: &on_solution,
        };

        shared.enqueue(SearchState {
            map_index: self.ctx.dest_index(),
            coord: self.ctx.dest_coord(),
            void_crossed: false,
            route: Route::new(),
        });

        std::thread::scope(|scope| {
            for id in 0..workers {
                let rx = rx.clone();
                let shared = &shared;
                scope.spawn(move || shared.work(id, rx));
            }
        });

        let summary = SearchSummary {
            states_visited: shared.visited.lock().len(),
            states_expanded: shared.expanded.load(Ordering::Relaxed),
            solutions: shared.solutions.load(Ordering::Relaxed),
            deepest_route: *shared.deepest.lock(),
        };
        debug!("Search finished: {summary:?}");
        summary
    }
}

struct Shared<'a, F> {
    ctx: &'a RoutingContext,
    tx: Sender<Message>,
    workers: usize,
    pending: AtomicUsize,
    visited: Mutex<FxHashSet<StateKey>>,
    deepest: Mutex<usize>,
    expanded: AtomicUsize,
    solutions: AtomicUsize,
    progress: Option<ProgressCallback>,
    on_solution: &'a F,
}

impl<F> Shared<'_, F> {
    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            for _ in 0..self.workers {
                let _ = self.tx.send(Message::Shutdown);
            }
        }
    }
}

/// Marks one dequeued state as finished when dropped
struct InFlight<'s, 'a, F>(&'s Shared<'a, F>);

impl<F> Drop for InFlight<'_, '_, F> {
    fn drop(&mut self) {
        self.0.finish_one();
    }
}

impl<F> Shared<'_, F>
where
    F: Fn(&Solution) + Sync,
{
    fn work(&self, id: usize, rx: Receiver<Message>) {
        debug!("Worker {id} started");
        let mut processed = 0usize;
        while let Ok(message) = rx.recv() {
            match message {
                Message::Shutdown => break,
                Message::State(state) => {
                    // released on unwind as well
                    let _in_flight = InFlight(self);
                    self.process(state);
                    processed += 1;
                }
            }
        }
        debug!("Worker {id} done after {processed} states");
    }

    fn enqueue(&self, state: SearchState) {
        self.pending.fetch_add(1, Ordering::SeqCst);
        // The receiver outlives every sender use: workers only stop on Shutdown
        let _ = self.tx.send(Message::State(state));
    }

    fn process(&self, state: SearchState) {
        let ctx = self.ctx;
        let index = state.map_index;

        if !self
            .visited
            .lock()
            .insert(StateKey::new(state.coord, index))
        {
            return;
        }

        let route_len = state.route.len();
        self.note_depth(route_len);

        if index < ctx.start_index() || index > ctx.dest_index() || state.route.contains_backtrack()
        {
            return;
        }

        if route_len > 0 {
            self.check_solution(&state);
        }

        if route_len >= ctx.max_route_len() {
            return;
        }
        self.expanded.fetch_add(1, Ordering::Relaxed);

        let void_crossed = state.void_crossed || ctx.is_void(index);

        if index > ctx.start_index() {
            if let Some(landmark) = ctx.step_backward(index) {
                self.enqueue(SearchState {
                    map_index: index - 1,
                    coord: state.coord,
                    void_crossed,
                    route: state.route.with(Transition::SpineBackward {
                        map: index,
                        landmark: landmark.clone(),
                    }),
                });
            }
        }

        if index < ctx.dest_index() {
            if let Some(landmark) = ctx.step_forward(index) {
                self.enqueue(SearchState {
                    map_index: index + 1,
                    coord: state.coord,
                    void_crossed,
                    route: state.route.with(Transition::SpineForward {
                        map: index,
                        landmark: landmark.clone(),
                    }),
                });
            }
        }

        for warp in ctx.warps(index) {
            let landmark = warp.landmark.clone();
            let step = match warp.direction {
                Direction::Forward => Transition::Warp {
                    map: index,
                    landmark,
                },
                Direction::Backward => Transition::BackwardWarp {
                    map: index,
                    landmark,
                },
            };
            self.enqueue(SearchState {
                map_index: warp.target,
                coord: state.coord - warp.displacement,
                void_crossed,
                route: state.route.with(step),
            });
        }
    }

    fn check_solution(&self, state: &SearchState) {
        let ctx = self.ctx;
        let map = ctx.spine().map(state.map_index);
        let Some(hit) = ctx.waypoints().nearest(state.coord, state.void_crossed) else {
            return;
        };
        if hit.map != map {
            return;
        }

        let solution = Solution {
            map_index: state.map_index,
            map: map.to_string(),
            state_coord: state.coord,
            position: ctx.to_map_frame(state.coord, state.map_index),
            distance: hit.distance,
            vertical_shift: hit.vertical_shift,
            route: state.route.clone(),
        };
        self.solutions.fetch_add(1, Ordering::Relaxed);
        (self.on_solution)(&solution);
    }

    /// Advisory only; never affects which states are explored
    fn note_depth(&self, route_len: usize) {
        {
            let mut deepest = self.deepest.lock();
            if route_len <= *deepest {
                return;
            }
            *deepest = route_len;
        }
        if let Some(progress) = &self.progress {
            progress(route_len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key_quantization() {
        let a = StateKey::new(Vec3::new(1.0, 2.0, 3.0), 4);
        let b = StateKey::new(Vec3::new(1.0 + 1e-9, 2.0 - 1e-9, 3.0), 4);
        assert_eq!(a, b);

        let c = StateKey::new(Vec3::new(1.0 + 1.0 / 256.0, 2.0, 3.0), 4);
        assert_ne!(a, c);

        let d = StateKey::new(Vec3::new(1.0, 2.0, 3.0), 5);
        assert_ne!(a, d);
    }

    #[test]
    fn test_default_options_use_all_cpus() {
        let options = SearchOptions::default();
        assert_eq!(options.threads, num_cpus::get());
        assert!(options.progress.is_none());
    }
}
