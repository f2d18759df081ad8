//! stlview core library: STL decoding, mesh consolidation and picking.
//!
//! This crate holds everything the viewer front ends share: the STL codec,
//! the indexed mesh with exact vertex merging, wireframe edge extraction,
//! sphere generation, the ray-casting picker and the scene that ties them
//! to the current view.

pub mod camera;
pub mod config;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod orbit;
pub mod picker;
pub mod scene;
pub mod sphere;
pub mod stl;

// Re-export commonly used types
pub use camera::{Camera, ProjectionMode};
pub use config::ViewerConfig;
pub use error::{StlError, StlResult};
pub use geometry::{Aabb, Ray, Triangle};
pub use mesh::{Color, Mesh};
pub use orbit::Orbit;
pub use picker::{Hit, PickMode, ViewState, Viewport};
pub use scene::{FileOutcome, Scene};
pub use stl::{DecodeSummary, LoadPolicy, StlFormat};
