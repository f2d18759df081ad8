//! Example: Print what the decoder makes of an STL file, optionally
//! re-encoding it in the other format.
//!
//! Usage: cargo run --example stl_info -- path/to/file.stl [converted.stl]

use anyhow::{Context, Result};
use std::env;
use stlview_core::stl::{load_stl, save_stl};
use stlview_core::{LoadPolicy, Mesh, StlFormat};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let Some(input) = args.get(1) else {
        eprintln!(
            "Usage: {} <stl-file> [converted.stl]",
            args.first().map_or("stl_info", String::as_str)
        );
        return Ok(());
    };

    let mut mesh = Mesh::new();
    let summary = load_stl(input, &mut mesh, LoadPolicy::Strict).with_context(|| format!("failed to load {input}"))?;

    let bounds = mesh.bounding_box();
    println!("format:     {:?}", summary.format);
    println!("facets:     {} ({} degenerate skipped)", summary.facets, summary.degenerate);
    println!("vertices:   {}", mesh.vertices().len());
    println!("edges:      {}", mesh.edges().len());
    println!("bounds:     {:?} .. {:?}", bounds.min, bounds.max);
    println!("center:     {:?}", bounds.center());
    println!("size:       {}", bounds.size());

    if let Some(output) = args.get(2) {
        let format = match summary.format {
            StlFormat::Ascii => StlFormat::Binary,
            StlFormat::Binary => StlFormat::Ascii,
        };
        save_stl(&mesh, output, format).with_context(|| format!("failed to write {output}"))?;
        println!("wrote {output} as {format:?}");
    }

    Ok(())
}
