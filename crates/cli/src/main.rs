use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use polyroute::api::{grid, octahedron, plane, quad_grid, tetrahedron};
use polyroute::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

use provenance::{write_sidecar, Payload};

#[derive(Parser)]
#[command(name = "polyroute")]
#[command(about = "Route closed edge traversals over mesh graphs")]
struct Cmd {
    /// JSON router config; missing fields take their defaults
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log search progress (debug level)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Algo {
    Atrail,
    Euler,
    Sterna,
    Xtrna,
}

impl From<Algo> for Strategy {
    fn from(algo: Algo) -> Self {
        match algo {
            Algo::Atrail => Strategy::ATrail,
            Algo::Euler => Strategy::Euler,
            Algo::Sterna => Strategy::Sterna,
            Algo::Xtrna => Strategy::Xtrna,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Shape {
    Tetrahedron,
    Octahedron,
    Grid,
    QuadGrid,
    Plane,
}

#[derive(Subcommand)]
enum Action {
    /// Write a fixture mesh as a graph JSON document
    Mesh {
        #[arg(long, value_enum)]
        shape: Shape,
        /// Vertices per side for grid shapes
        #[arg(long, default_value_t = 4)]
        size: usize,
        #[arg(long)]
        out: String,
    },
    /// Route a graph JSON document and write the route JSON document
    Route {
        #[arg(long, value_enum)]
        algo: Algo,
        #[arg(long)]
        input: String,
        #[arg(long)]
        out: String,
        /// Override the seed of every seeded strategy
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print a summary of a route JSON document
    Inspect {
        #[arg(long)]
        input: String,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();
    let cfg = load_cfg(cmd.config.as_deref())?;
    match cmd.action {
        Action::Mesh { shape, size, out } => mesh(shape, size, &out),
        Action::Route {
            algo,
            input,
            out,
            seed,
        } => {
            let cfg = match seed {
                Some(seed) => cfg.with_seed(seed),
                None => cfg,
            };
            run_route(algo.into(), &input, &out, &cfg)
        }
        Action::Inspect { input } => {
            let summary = inspect(&input)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Action::Report => report(&cfg),
    }
}

fn load_cfg(path: Option<&str>) -> Result<RouterCfg> {
    let Some(path) = path else {
        return Ok(RouterCfg::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading config {path}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing config {path}"))
}

fn write_artifact(out: &str, body: &str) -> Result<()> {
    let out_path = Path::new(out);
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(out_path, body).with_context(|| format!("writing {out}"))
}

fn fixture(shape: Shape, size: usize) -> Graph {
    match shape {
        Shape::Tetrahedron => tetrahedron(),
        Shape::Octahedron => octahedron(),
        Shape::Grid => grid(size, size),
        Shape::QuadGrid => quad_grid(size, size),
        Shape::Plane => plane(size, size),
    }
}

fn mesh(shape: Shape, size: usize, out: &str) -> Result<()> {
    anyhow::ensure!(size >= 2, "grid shapes need at least 2 vertices per side");
    let g = fixture(shape, size);
    tracing::info!(
        shape = ?shape,
        vertices = g.vertices.len(),
        edges = g.edges.len(),
        faces = g.faces.len(),
        "mesh"
    );
    write_artifact(out, &g.to_json()?)?;
    write_sidecar(out, Payload::new(json!({ "shape": format!("{shape:?}"), "size": size })))?;
    Ok(())
}

fn run_route(strategy: Strategy, input: &str, out: &str, cfg: &RouterCfg) -> Result<()> {
    let text = fs::read_to_string(input).with_context(|| format!("reading graph {input}"))?;
    let g = Graph::from_json(&text).with_context(|| format!("parsing graph {input}"))?;
    let routed = route(&g, strategy, cfg)
        .with_context(|| format!("routing {input} with {}", strategy.name()))?;
    let cost = routed.route.kissing_loop_cost();
    tracing::info!(
        strategy = strategy.name(),
        trail = routed.route.len(),
        kissing_loops = routed.route.kissing_loops.len(),
        worst_open = cost.worst,
        "route"
    );
    write_artifact(out, &routed.route.to_json(&routed.graph, strategy)?)?;
    let params = json!({ "algo": strategy.name(), "cfg": serde_json::to_value(cfg)? });
    write_sidecar(out, Payload::new(params).with_input(input))?;
    Ok(())
}

fn inspect(input: &str) -> Result<serde_json::Value> {
    let text = fs::read_to_string(input).with_context(|| format!("reading route {input}"))?;
    let (strategy, g, route) =
        Route::from_json(&text).with_context(|| format!("parsing route {input}"))?;
    let expected = match strategy {
        Strategy::ATrail | Strategy::Euler => 1,
        Strategy::Sterna | Strategy::Xtrna => 2,
    };
    let counts = route.visit_counts(g.edges.len());
    let cost = route.kissing_loop_cost();
    Ok(json!({
        "strategy": strategy.name(),
        "vertices": g.vertices.len(),
        "edges": g.edges.len(),
        "faces": g.faces.len(),
        "trail": route.len(),
        "closed": route.is_closed(&g),
        "covers_every_edge": counts.iter().all(|&c| c == expected),
        "immediate_repetition": route.has_immediate_repetition(&g),
        "kissing_loops": route.kissing_loops.len(),
        "worst_open_kissing_loops": cost.worst,
        "tree_edges": route.tree_edges.len(),
    }))
}

fn report(cfg: &RouterCfg) -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "version": polyroute::VERSION,
        "cfg": serde_json::to_value(cfg)?,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn mesh_route_inspect_pipeline() {
        let dir = tempdir().unwrap();
        let mesh_path = dir.path().join("tet.json");
        let mesh_out = mesh_path.to_str().unwrap();
        mesh(Shape::Tetrahedron, 2, mesh_out).unwrap();
        assert!(dir.path().join("tet.provenance.json").exists());

        for (algo, expected_trail) in [(Algo::Xtrna, 12), (Algo::Sterna, 12), (Algo::Euler, 9)] {
            let route_path = dir.path().join(format!("tet.{algo:?}.json"));
            let route_out = route_path.to_str().unwrap();
            run_route(algo.into(), mesh_out, route_out, &RouterCfg::default()).unwrap();
            let summary = inspect(route_out).unwrap();
            assert_eq!(summary["trail"], expected_trail, "{algo:?}");
            assert_eq!(summary["closed"], true, "{algo:?}");
            assert_eq!(summary["covers_every_edge"], true, "{algo:?}");
        }
    }

    #[test]
    fn face_less_grid_fails_single_cover_with_context() {
        let dir = tempdir().unwrap();
        let mesh_path = dir.path().join("grid.json");
        let mesh_out = mesh_path.to_str().unwrap();
        mesh(Shape::Grid, 3, mesh_out).unwrap();
        let out = dir.path().join("grid.route.json");
        let err = run_route(Strategy::ATrail, mesh_out, out.to_str().unwrap(), &RouterCfg::default())
            .unwrap_err();
        assert!(format!("{err:#}").contains("face information"));
        assert!(!out.exists());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"xtrna": {"max_resamples": 5}}"#).unwrap();
        let cfg = load_cfg(path.to_str()).unwrap();
        assert_eq!(cfg.xtrna.max_resamples, 5);
        assert_eq!(cfg.sterna, RouterCfg::default().sterna);
    }
}
