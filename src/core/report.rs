//! Console output: solution blocks and diagnostic dumps

use std::fmt::Write as _;

use crate::core::config::{BannedTransitions, GameFamily};
use crate::core::context::RoutingContext;
use crate::core::search::{SearchSummary, Solution};
use crate::core::vector::Vec3;
use crate::core::warps::WarpTable;

const RULE: &str = "====================";

/// Commands that put the player at `position` on `map`
pub fn position_command(family: GameFamily, map: &str, position: Vec3) -> String {
    match family {
        GameFamily::Source => format!("map {map};setpos {position}"),
        GameFamily::GoldSrc => {
            format!("map {map};w 70;noclip;god;notarget;bxt_ch_set_pos {position}")
        }
    }
}

/// Multi-line block describing one solution, newline terminated
pub fn format_solution(ctx: &RoutingContext, solution: &Solution) -> String {
    // the player is placed above the drop point and falls the rest of the way
    let shift = Vec3::new(0.0, 0.0, -solution.vertical_shift);
    let position = solution.position - shift;

    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "   Destination: {}", ctx.destination().description);
    let _ = writeln!(out, "   {} - {}", solution.distance as i64, solution.map);
    let _ = writeln!(
        out,
        "   {}",
        position_command(ctx.family(), &solution.map, position)
    );
    if !shift.is_zero() {
        let _ = writeln!(out, "   bxt_ch_set_pos_offset {shift}");
    }
    let _ = writeln!(out, "   // {}", solution.route.compact());
    let _ = writeln!(out, "   // {}", solution.route.tokens(ctx.spine()));
    let _ = writeln!(out, "{RULE}");
    out
}

/// Every warp as found, one per line, with the landmark the save is taken through
pub fn format_raw_warps(table: &WarpTable) -> String {
    let mut out = String::new();
    for warp in table.raw() {
        let _ = writeln!(out, "{warp}");
    }
    out
}

/// Warp table dump, one indented line per entry under each map
pub fn format_warps(table: &WarpTable) -> String {
    let mut out = String::from("\nWarps:\n");
    for (map, entries) in table.iter() {
        let _ = writeln!(out, "+  {map}");
        for entry in entries {
            let _ = writeln!(out, "     {entry}");
        }
    }
    out
}

/// Ban list in the form the in-game plugin reads
pub fn format_swarp_config(banned: &BannedTransitions) -> String {
    let mut out = String::from("\nConfig:\n swarp_ban_clear\n");
    for [from, landmark, to] in banned.iter() {
        let _ = writeln!(out, " swarp_ban {from} {landmark} {to}");
    }
    out.push_str(" swarp_rebuild_graph\n\n");
    out
}

pub fn format_banner(ctx: &RoutingContext, threads: usize) -> String {
    format!(
        "Searching for path to {}\nWaypoints loaded: {}\nWarps loaded: {}\nThread count: {}\n",
        ctx.destination().description,
        ctx.waypoints().len(),
        ctx.warp_table().raw_count(),
        threads
    )
}

pub fn format_summary(summary: &SearchSummary) -> String {
    format!(
        "Complete! {} solutions, {} states visited, {} expanded, deepest route {}",
        summary.solutions, summary.states_visited, summary.states_expanded, summary.deepest_route
    )
}
