//! End-to-end search scenarios on small in-memory graphs

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use swarp_route::report;
use swarp_route::{
    BannedTransitions, ContextParams, Destination, Direction, Edge, GameFamily, MapGraph,
    RoutingContext, Search, SearchOptions, SearchSummary, Solution, StateKey, Transition, Vec3,
};

/// a - b - c, landmark `ab` between a/b and `bc` between b/c
fn chain() -> MapGraph {
    MapGraph::new(vec![
        Edge::new("a", "ab", "b", Vec3::new(0.0, 0.0, 0.0)),
        Edge::new("b", "ab", "a", Vec3::new(10.0, 0.0, 0.0)),
        Edge::new("b", "bc", "c", Vec3::new(0.0, 0.0, 0.0)),
        Edge::new("c", "bc", "b", Vec3::new(10.0, 0.0, 0.0)),
    ])
}

/// a - b = c - d with two landmarks between b and c
fn ladder() -> MapGraph {
    MapGraph::new(vec![
        Edge::new("a", "ab", "b", Vec3::new(0.0, 0.0, 0.0)),
        Edge::new("b", "ab", "a", Vec3::new(100.0, 0.0, 0.0)),
        Edge::new("b", "bc", "c", Vec3::new(0.0, 50.0, 0.0)),
        Edge::new("c", "bc", "b", Vec3::new(0.0, 0.0, 0.0)),
        Edge::new("b", "bc2", "c", Vec3::new(200.0, 0.0, 0.0)),
        Edge::new("c", "bc2", "b", Vec3::new(0.0, 300.0, 0.0)),
        Edge::new("c", "cd", "d", Vec3::new(30.0, 0.0, 0.0)),
        Edge::new("d", "cd", "c", Vec3::new(0.0, 0.0, 0.0)),
    ])
}

fn params(start: &str, dest: &str, max_route_len: usize) -> ContextParams {
    ContextParams {
        family: GameFamily::GoldSrc,
        start_map: start.to_string(),
        destination: Destination::parse(dest).unwrap(),
        banned: BannedTransitions::default(),
        void_maps: HashSet::new(),
        waypoint_distance: GameFamily::GoldSrc.waypoint_distance(),
        max_route_len,
    }
}

fn collect(ctx: &RoutingContext, threads: usize) -> (SearchSummary, Vec<Solution>) {
    let found = Mutex::new(Vec::new());
    let options = SearchOptions {
        threads,
        progress: None,
    };
    let summary = Search::new(ctx, options).run(|solution| found.lock().push(solution.clone()));
    (summary, found.into_inner())
}

/// Re-apply a route from the destination and check it lands on the solution
///
/// Several warps can share target, landmark and direction, so every matching
/// candidate is tried.
fn replays(
    ctx: &RoutingContext,
    steps: &[Transition],
    index: usize,
    coord: Vec3,
    solution: &Solution,
) -> bool {
    let Some((step, rest)) = steps.split_first() else {
        return index == solution.map_index && StateKey::new(coord, index) == solution.key();
    };
    if step.map() != index {
        return false;
    }
    let next = rest.first().map(Transition::map).unwrap_or(solution.map_index);

    match step {
        Transition::SpineBackward { landmark, .. } => {
            ctx.step_backward(index) == Some(landmark)
                && replays(ctx, rest, index - 1, coord, solution)
        }
        Transition::SpineForward { landmark, .. } => {
            ctx.step_forward(index) == Some(landmark)
                && replays(ctx, rest, index + 1, coord, solution)
        }
        Transition::Warp { landmark, .. } | Transition::BackwardWarp { landmark, .. } => {
            let direction = match step {
                Transition::Warp { .. } => Direction::Forward,
                _ => Direction::Backward,
            };
            ctx.warps(index)
                .iter()
                .filter(|w| w.target == next && w.landmark == *landmark && w.direction == direction)
                .any(|w| replays(ctx, rest, w.target, coord - w.displacement, solution))
        }
    }
}

#[test]
fn test_chain_finds_plain_spine_route() {
    let ctx = RoutingContext::build(
        &chain(),
        vec![("a".to_string(), Vec3::ZERO)],
        params("a", "c at: 5, 0, 0", 2),
    )
    .unwrap();
    assert_eq!(ctx.dest_coord(), Vec3::new(-15.0, 0.0, 0.0));

    let (summary, solutions) = collect(&ctx, 1);
    assert_eq!(summary.solutions, 2);
    assert_eq!(summary.deepest_route, 2);
    assert_eq!(solutions.len(), 2);

    let spine_route = solutions
        .iter()
        .find(|s| s.route.compact() == "ll")
        .expect("two spine steps back to the start map");
    assert_eq!(spine_route.map, "a");
    assert_eq!(spine_route.map_index, 0);
    assert_eq!(spine_route.position, Vec3::new(-15.0, 0.0, 0.0));
    assert_eq!(spine_route.distance, 15.0);
    assert_eq!(spine_route.vertical_shift, 0.0);
    assert_eq!(spine_route.route.tokens(ctx.spine()), "l(b,ab) l(c,bc)");

    // warp from a re-targeted through bc: lands 10 units further along x
    let warp_route = solutions
        .iter()
        .find(|s| s.route.compact() == "xl")
        .expect("warp route");
    assert_eq!(warp_route.position, Vec3::new(-5.0, 0.0, 0.0));
    assert_eq!(warp_route.distance, 5.0);
}

#[test]
fn test_concurrent_search_invariants() {
    let max_len = 6;
    let ctx = RoutingContext::build(
        &ladder(),
        vec![
            ("a".to_string(), Vec3::ZERO),
            ("b".to_string(), Vec3::new(100.0, 0.0, 0.0)),
            ("c".to_string(), Vec3::ZERO),
        ],
        params("a", "d at: 10, 20, 0", max_len),
    )
    .unwrap();
    assert_eq!(ctx.spine().maps(), ["a", "b", "c", "d"]);

    let (summary, solutions) = collect(&ctx, 4);
    assert!(!solutions.is_empty());
    assert_eq!(summary.solutions, solutions.len());
    assert!(summary.deepest_route <= max_len);
    assert!(summary.states_expanded <= summary.states_visited);

    let mut keys = HashSet::new();
    for solution in &solutions {
        assert!(keys.insert(solution.key()), "duplicate state reported");
        assert!(!solution.route.is_empty());
        assert!(solution.route.len() <= max_len);
        assert!(!solution.route.contains_backtrack());
        assert!(solution.map_index < ctx.dest_index());
        assert_eq!(solution.map, ctx.spine().map(solution.map_index));
        assert!(solution.distance < ctx.waypoints().threshold());
        assert_eq!(
            solution.position,
            ctx.to_map_frame(solution.state_coord, solution.map_index)
        );
        assert!(
            replays(
                &ctx,
                solution.route.steps(),
                ctx.dest_index(),
                ctx.dest_coord(),
                solution
            ),
            "route {} does not reproduce its state",
            solution.route.compact()
        );
    }
}

#[test]
fn test_single_and_multi_threaded_agree_on_shortest_routes() {
    let ctx = RoutingContext::build(
        &chain(),
        vec![("a".to_string(), Vec3::ZERO)],
        params("a", "c at: 5, 0, 0", 1),
    )
    .unwrap();
    // one transition only reaches b, which has no waypoint
    let (single, _) = collect(&ctx, 1);
    let (multi, _) = collect(&ctx, 8);
    assert_eq!(single.solutions, 0);
    assert_eq!(single, multi);
}

#[test]
fn test_banned_spine_step_falls_back_to_warp() {
    let mut p = params("a", "c at: 5, 0, 0", 4);
    p.banned = BannedTransitions::new([["a", "ab", "b"]]);
    let ctx = RoutingContext::build(&chain(), vec![("a".to_string(), Vec3::ZERO)], p).unwrap();
    assert!(ctx.step_backward(1).is_none());

    let (_, solutions) = collect(&ctx, 2);
    assert!(!solutions.is_empty());
    for solution in &solutions {
        assert!(solution
            .route
            .steps()
            .iter()
            .all(|step| !matches!(step, Transition::SpineBackward { map: 1, .. })));
    }
}

#[test]
fn test_fully_banned_pair_has_no_solutions() {
    let graph = MapGraph::new(vec![
        Edge::new("a", "ab", "b", Vec3::ZERO),
        Edge::new("b", "ab", "a", Vec3::new(10.0, 0.0, 0.0)),
    ]);
    let mut p = params("a", "b at: 0, 0, 0", 10);
    p.banned = BannedTransitions::new([["a", "ab", "b"]]);
    let ctx = RoutingContext::build(&graph, vec![("a".to_string(), Vec3::ZERO)], p).unwrap();

    let (summary, solutions) = collect(&ctx, 2);
    assert!(solutions.is_empty());
    assert_eq!(summary.solutions, 0);
    assert_eq!(summary.states_visited, 1);
}

#[test]
fn test_void_crossing_matches_waypoint_above() {
    let waypoints = vec![("a".to_string(), Vec3::new(0.0, 0.0, 5000.0))];

    let ctx = RoutingContext::build(&chain(), waypoints.clone(), params("a", "c at: 5, 0, 0", 2))
        .unwrap();
    let (summary, _) = collect(&ctx, 1);
    assert_eq!(summary.solutions, 0);

    let mut p = params("a", "c at: 5, 0, 0", 2);
    p.void_maps.insert("c".to_string());
    let ctx = RoutingContext::build(&chain(), waypoints, p).unwrap();
    let (_, solutions) = collect(&ctx, 1);
    let solution = solutions
        .iter()
        .find(|s| s.route.compact() == "ll")
        .expect("spine route across the void");
    assert_eq!(solution.vertical_shift, 5000.0);
    assert_eq!(solution.distance, 15.0);

    let block = report::format_solution(&ctx, solution);
    assert!(block.contains("bxt_ch_set_pos -15 0 5000"));
    assert!(block.contains("bxt_ch_set_pos_offset 0 0 -5000"));
    assert!(block.contains("Destination: c at: 5, 0, 0"));
}

#[test]
fn test_panicking_sink_does_not_stall_workers() {
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        let ctx = RoutingContext::build(
            &ladder(),
            vec![("a".to_string(), Vec3::ZERO)],
            params("a", "d at: 10, 20, 0", 6),
        )
        .unwrap();
        let fired = AtomicBool::new(false);
        let outcome = std::panic::catch_unwind(AssertUnwindSafe(|| {
            let options = SearchOptions {
                threads: 2,
                progress: None,
            };
            Search::new(&ctx, options).run(|_| {
                if !fired.swap(true, Ordering::SeqCst) {
                    panic!("sink failed");
                }
            })
        }));
        let _ = done_tx.send(outcome.is_err());
    });

    let panicked = done_rx
        .recv_timeout(Duration::from_secs(10))
        .expect("search returned after the sink panicked");
    assert!(panicked, "the sink panic is re-raised by run");
}

#[test]
fn test_zero_max_len_finishes_without_solutions() {
    let ctx = RoutingContext::build(
        &chain(),
        vec![("a".to_string(), Vec3::ZERO)],
        params("a", "c at: 5, 0, 0", 0),
    )
    .unwrap();
    let (summary, solutions) = collect(&ctx, 2);
    assert!(solutions.is_empty());
    assert_eq!(summary.states_visited, 1);
    assert_eq!(summary.states_expanded, 0);
}
