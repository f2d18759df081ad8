//! stlview terminal viewer
//!
//! Loads STL files (or the built-in demo spheres) and renders them in the
//! terminal.
//! Controls:
//!   - Arrow keys / left drag: Rotate
//!   - PgUp / PgDn / scroll: Zoom
//!   - O / P: Orthographic / perspective projection
//!   - T: Face the model straight on
//!   - W: Toggle wireframe
//!   - Left click: Pick a point
//!   - Q / ESC: Quit

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use stlview_core::picker::DEFAULT_VERTEX_THRESHOLD;
use stlview_core::{LoadPolicy, Mesh, PickMode, Scene, ViewerConfig};
use stlview_terminal::TerminalApp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PickModeArg {
    /// Point on the nearest surface under the cursor
    Surface,
    /// Vertex nearest the viewer close to the cursor ray
    Vertex,
}

#[derive(Parser, Debug)]
#[command(name = "stlview-terminal")]
#[command(about = "View STL files in the terminal", long_about = None)]
struct Args {
    /// STL files to load, ASCII or binary
    files: Vec<PathBuf>,

    /// Show the demo scene of eight spheres instead of files
    #[arg(long, conflicts_with = "files")]
    spheres: bool,

    /// Picking strategy
    #[arg(long, value_enum, default_value = "surface")]
    pick_mode: PickModeArg,

    /// Ray distance within which a vertex can be picked
    #[arg(long, default_value_t = DEFAULT_VERTEX_THRESHOLD)]
    vertex_threshold: f32,

    /// Discard the whole file on a decode error instead of keeping the
    /// facets read so far
    #[arg(long)]
    strict: bool,
}

impl Args {
    fn config(&self) -> ViewerConfig {
        let pick_mode = match self.pick_mode {
            PickModeArg::Surface => PickMode::Surface,
            PickModeArg::Vertex => PickMode::NearestVertex {
                max_distance: self.vertex_threshold,
            },
        };
        let load_policy = if self.strict {
            LoadPolicy::Strict
        } else {
            LoadPolicy::BestEffort
        };
        ViewerConfig::default()
            .with_pick_mode(pick_mode)
            .with_load_policy(load_policy)
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut scene = Scene::new(args.config());

    if args.spheres {
        scene.load_demo_spheres();
    } else if args.files.is_empty() {
        scene.add_mesh(Mesh::cube(2.0));
        scene.autoscale();
    } else {
        let outcomes = scene.load_files(args.files.as_slice());
        for outcome in &outcomes {
            match &outcome.result {
                Ok(summary) => println!(
                    "{}: {} facets ({:?}, {} degenerate skipped)",
                    outcome.path.display(),
                    summary.facets,
                    summary.format,
                    summary.degenerate
                ),
                Err(err) => eprintln!("{}: {err}", outcome.path.display()),
            }
        }
        if scene.extent().is_none() {
            bail!("no geometry loaded");
        }
    }

    let mut app = TerminalApp::new(scene).context("failed to query terminal size")?;
    app.run().context("terminal renderer failed")?;

    Ok(())
}
