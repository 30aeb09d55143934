//! Route the tetrahedron with every strategy and print a one-line summary each.
//!
//! Purpose
//! - Quick, reproducible look at what each strategy produces on the smallest
//!   closed mesh: trail length, kissing loops, worst open loops.
//!
//! References
//! - Code: crates/polyroute/src/route/mod.rs::route

use std::time::Instant;

use polyroute::api::{route, tetrahedron, RouterCfg, Strategy};

fn main() {
    let g = tetrahedron();
    let cfg = RouterCfg::default();
    for strategy in [Strategy::ATrail, Strategy::Euler, Strategy::Sterna, Strategy::Xtrna] {
        let start = Instant::now();
        let routed = route(&g, strategy, &cfg).expect("tetrahedron routes with every strategy");
        let ms = start.elapsed().as_secs_f64() * 1e3;
        let cost = routed.route.kissing_loop_cost();
        println!(
            "strategy={} edges={} trail={} kissing_loops={} worst_open={} ms={:.3}",
            strategy.name(),
            routed.graph.edges.len(),
            routed.route.len(),
            routed.route.kissing_loops.len(),
            cost.worst,
            ms
        );
    }
}
