//! STL reader and writer for the binary and ASCII encodings.
//!
//! # Format detection
//!
//! A stream whose first six bytes are `solid ` (any case) is ASCII, anything
//! else is binary. Stored facet normals are ignored in both encodings: the
//! normal is recomputed from the vertex winding, and facets whose computed
//! normal has zero length are skipped.
//!
//! # Binary format
//!
//! ```text
//! UINT8[80]    - Header (ignored)
//! UINT32       - Number of triangles
//! foreach triangle
//!     REAL32[3] - Normal vector (ignored)
//!     REAL32[3] - Vertex 1
//!     REAL32[3] - Vertex 2
//!     REAL32[3] - Vertex 3
//!     UINT16    - Attribute byte count (ignored)
//! end
//! ```
//!
//! # ASCII format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid name
//! ```
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

use nalgebra::Vector3;
use nom::{
    bytes::complete::take_till1,
    character::complete::multispace0,
    combinator::{all_consuming, map},
    number::complete::{double, le_f32, le_u16},
    sequence::{preceded, tuple},
    IResult,
};
use tracing::{debug, info, warn};

use crate::error::{StlError, StlResult};
use crate::geometry::RawFacet;
use crate::mesh::Mesh;

/// Binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one binary facet record (normal + 3 vertices + attribute).
const RECORD_SIZE: usize = 50;

/// Which STL encoding a stream uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StlFormat {
    Ascii,
    Binary,
}

/// What happens to the target mesh when decoding fails part-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Keep the facets read before the failure.
    #[default]
    BestEffort,
    /// Clear the mesh so a failed load leaves nothing behind.
    Strict,
}

/// Outcome of a successful decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    pub format: StlFormat,
    /// Facets added to the mesh.
    pub facets: usize,
    /// Zero-area facets that were skipped.
    pub degenerate: usize,
}

impl DecodeSummary {
    fn new(format: StlFormat) -> Self {
        Self {
            format,
            facets: 0,
            degenerate: 0,
        }
    }

    fn emit(&mut self, mesh: &mut Mesh, facet: &RawFacet) {
        let [v0, v1, v2] = facet.vertices;
        if mesh.add_facet(v0, v1, v2) {
            self.facets += 1;
        } else {
            self.degenerate += 1;
            debug!("skipping degenerate facet {:?}", facet.vertices);
        }
    }
}

/// Load an STL file into `mesh`.
///
/// # Errors
///
/// Returns [`StlError::Open`] without touching `mesh` when the file cannot
/// be opened, and any decode error from [`decode_stl`].
pub fn load_stl<P: AsRef<Path>>(path: P, mesh: &mut Mesh, policy: LoadPolicy) -> StlResult<DecodeSummary> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| StlError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loading STL file {}", path.display());
    decode_stl(BufReader::new(file), mesh, policy)
}

/// Decode an STL stream into `mesh` and rebuild its edges.
///
/// Facets are appended through the mesh's vertex consolidation. On failure,
/// the facets decoded so far are kept (with edges) under
/// [`LoadPolicy::BestEffort`], or the mesh is cleared under
/// [`LoadPolicy::Strict`].
///
/// # Errors
///
/// Returns an error on read failure, an ASCII grammar violation, or a
/// truncated binary header or record.
///
/// ASCII input that ends inside a facet is [`StlError::UnexpectedEof`],
/// so under [`LoadPolicy::Strict`] the whole mesh is cleared. Input that
/// ends between facets, with or without `endsolid`, decodes cleanly.
pub fn decode_stl<R: Read>(mut reader: R, mesh: &mut Mesh, policy: LoadPolicy) -> StlResult<DecodeSummary> {
    let mut header = [0u8; HEADER_SIZE + 4];
    let got = read_full(&mut reader, &mut header[..6])?;

    let format = if got == 6 && header[..6].eq_ignore_ascii_case(b"solid ") {
        StlFormat::Ascii
    } else {
        StlFormat::Binary
    };

    let mut summary = DecodeSummary::new(format);
    let result = match format {
        StlFormat::Ascii => {
            let mut text = Vec::new();
            reader.read_to_end(&mut text)?;
            decode_ascii(&text, mesh, &mut summary)
        }
        StlFormat::Binary => {
            let got = got + read_full(&mut reader, &mut header[got..])?;
            if got < header.len() {
                Err(StlError::TruncatedHeader { got })
            } else {
                let count = u32::from_le_bytes([
                    header[HEADER_SIZE],
                    header[HEADER_SIZE + 1],
                    header[HEADER_SIZE + 2],
                    header[HEADER_SIZE + 3],
                ]);
                decode_binary(reader, count, mesh, &mut summary)
            }
        }
    };

    match result {
        Ok(()) => {
            mesh.make_edges();
            info!(
                format = ?summary.format,
                facets = summary.facets,
                degenerate = summary.degenerate,
                "Decoded STL"
            );
            Ok(summary)
        }
        Err(err) => {
            warn!(
                facets = summary.facets,
                policy = ?policy,
                "STL decode failed: {err}"
            );
            match policy {
                LoadPolicy::BestEffort => mesh.make_edges(),
                LoadPolicy::Strict => mesh.clear(),
            }
            Err(err)
        }
    }
}

/// Fill `buf` as far as the stream allows, returning the byte count.
/// Only a zero-length read ends the stream.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn vector(input: &[u8]) -> IResult<&[u8], Vector3<f32>> {
    map(tuple((le_f32, le_f32, le_f32)), |(x, y, z)| Vector3::new(x, y, z))(input)
}

fn record(input: &[u8]) -> IResult<&[u8], RawFacet> {
    let (input, normal) = vector(input)?;
    let (input, v0) = vector(input)?;
    let (input, v1) = vector(input)?;
    let (input, v2) = vector(input)?;
    let (input, _attribute) = le_u16(input)?;
    Ok((
        input,
        RawFacet {
            normal,
            vertices: [v0.into(), v1.into(), v2.into()],
        },
    ))
}

fn decode_binary<R: Read>(mut reader: R, count: u32, mesh: &mut Mesh, summary: &mut DecodeSummary) -> StlResult<()> {
    debug!("binary STL with {count} facets");
    let mut buf = [0u8; RECORD_SIZE];
    for index in 0..count {
        let got = read_full(&mut reader, &mut buf)?;
        if got == 0 {
            debug!("stream ended after {index} of {count} records");
            break;
        }
        if got != RECORD_SIZE {
            return Err(StlError::TruncatedRecord { index, got });
        }
        let Ok((_, facet)) = record(&buf) else {
            return Err(StlError::TruncatedRecord { index, got });
        };
        summary.emit(mesh, &facet);
    }
    Ok(())
}

/// Position in the ASCII facet grammar: the token expected next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsciiState {
    /// `facet`, or `endsolid` to finish.
    Facet,
    Normal,
    /// Normal component 0..3.
    NormalCoord(usize),
    Outer,
    Loop,
    /// `vertex` keyword of corner 0..3.
    Vertex(usize),
    /// Component of a corner: (corner, axis).
    VertexCoord(usize, usize),
    EndLoop,
    EndFacet,
}

/// What a state accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    Keyword(&'static str),
    Real,
}

impl AsciiState {
    fn expect(self) -> Expect {
        match self {
            Self::Facet => Expect::Keyword("facet"),
            Self::Normal => Expect::Keyword("normal"),
            Self::Outer => Expect::Keyword("outer"),
            Self::Loop => Expect::Keyword("loop"),
            Self::Vertex(_) => Expect::Keyword("vertex"),
            Self::EndLoop => Expect::Keyword("endloop"),
            Self::EndFacet => Expect::Keyword("endfacet"),
            Self::NormalCoord(_) | Self::VertexCoord(..) => Expect::Real,
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Facet => Self::Normal,
            Self::Normal => Self::NormalCoord(0),
            Self::NormalCoord(2) => Self::Outer,
            Self::NormalCoord(axis) => Self::NormalCoord(axis + 1),
            Self::Outer => Self::Loop,
            Self::Loop => Self::Vertex(0),
            Self::Vertex(corner) => Self::VertexCoord(corner, 0),
            Self::VertexCoord(2, 2) => Self::EndLoop,
            Self::VertexCoord(corner, 2) => Self::Vertex(corner + 1),
            Self::VertexCoord(corner, axis) => Self::VertexCoord(corner, axis + 1),
            Self::EndLoop => Self::EndFacet,
            Self::EndFacet => Self::Facet,
        }
    }

    fn store(self, facet: &mut RawFacet, value: f32) {
        match self {
            Self::NormalCoord(axis) => facet.normal[axis] = value,
            Self::VertexCoord(corner, axis) => facet.vertices[corner][axis] = value,
            _ => {}
        }
    }
}

impl fmt::Display for AsciiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const AXES: [char; 3] = ['x', 'y', 'z'];
        match (self, self.expect()) {
            (Self::Facet, _) => write!(f, "`facet` or `endsolid`"),
            (Self::Vertex(corner), Expect::Keyword(k)) => write!(f, "`{k}` (corner {})", corner + 1),
            (Self::NormalCoord(axis), _) => write!(f, "normal {}", AXES[*axis]),
            (Self::VertexCoord(corner, axis), _) => write!(f, "vertex {} {}", corner + 1, AXES[*axis]),
            (_, Expect::Keyword(k)) => write!(f, "`{k}`"),
            (_, Expect::Real) => write!(f, "a number"),
        }
    }
}

fn is_delimiter(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

fn token(input: &[u8]) -> IResult<&[u8], &[u8]> {
    preceded(multispace0, take_till1(is_delimiter))(input)
}

fn real(input: &[u8]) -> IResult<&[u8], f64> {
    all_consuming(double)(input)
}

/// Parse a whole token as a finite number in `f32` range.
fn parse_real(token: &[u8]) -> Option<f32> {
    let (_, value) = real(token).ok()?;
    if !value.is_finite() || value.abs() > f64::from(f32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let value = value as f32;
    Some(value)
}

/// Whitespace-separated tokens; runs of delimiters collapse.
struct Tokens<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let (rest, tok) = token(self.rest).ok()?;
        self.rest = rest;
        Some(tok)
    }
}

/// Run the facet grammar over `text`, the bytes following `solid `.
///
/// The first token is the solid's name and may be anything. Input that ends
/// between facets is accepted without `endsolid`.
fn decode_ascii(text: &[u8], mesh: &mut Mesh, summary: &mut DecodeSummary) -> StlResult<()> {
    let mut state = AsciiState::Facet;
    let mut facet = RawFacet::default();

    for (n, tok) in (Tokens { rest: text }).enumerate() {
        if state == AsciiState::Facet && tok == b"endsolid" {
            return Ok(());
        }

        let advanced = match state.expect() {
            Expect::Keyword(keyword) => tok == keyword.as_bytes(),
            Expect::Real => match parse_real(tok) {
                Some(value) => {
                    state.store(&mut facet, value);
                    true
                }
                None => false,
            },
        };

        if !advanced {
            if n == 0 {
                continue;
            }
            let token = String::from_utf8_lossy(tok).into_owned();
            debug!("unrecognized token {token} in state {state:?}");
            return Err(StlError::UnexpectedToken { token, state });
        }

        if state == AsciiState::EndFacet {
            summary.emit(mesh, &facet);
        }
        state = state.next();
    }

    if state == AsciiState::Facet {
        Ok(())
    } else {
        Err(StlError::UnexpectedEof { state })
    }
}

/// Write `mesh` as binary STL with recomputed facet normals.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn encode_binary<W: Write>(mesh: &Mesh, mut writer: W) -> io::Result<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"binary STL written by stlview";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    let count = mesh.triangle_count() as u32;
    writer.write_all(&count.to_le_bytes())?;

    for tri in mesh.iter_triangles() {
        let normal = tri.calculate_normal().unwrap_or_else(Vector3::zeros);
        for v in std::iter::once(normal).chain(tri.vertices.iter().map(|p| p.coords)) {
            writer.write_all(&v.x.to_le_bytes())?;
            writer.write_all(&v.y.to_le_bytes())?;
            writer.write_all(&v.z.to_le_bytes())?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()
}

/// Write `mesh` as ASCII STL with recomputed facet normals.
///
/// Coordinates are written with Rust's shortest round-trip formatting, so
/// decoding the output reproduces the same `f32` values.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn encode_ascii<W: Write>(mesh: &Mesh, name: &str, mut writer: W) -> io::Result<()> {
    writeln!(writer, "solid {name}")?;

    for tri in mesh.iter_triangles() {
        let n = tri.calculate_normal().unwrap_or_else(Vector3::zeros);
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for p in &tri.vertices {
            writeln!(writer, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid {name}")?;
    writer.flush()
}

/// Save `mesh` to `path` in the given encoding.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn save_stl<P: AsRef<Path>>(mesh: &Mesh, path: P, format: StlFormat) -> StlResult<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    match format {
        StlFormat::Binary => encode_binary(mesh, writer)?,
        StlFormat::Ascii => encode_ascii(mesh, "stlview", writer)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::io::Cursor;

    fn facet(normal: [f32; 3], v0: [f32; 3], v1: [f32; 3], v2: [f32; 3]) -> RawFacet {
        RawFacet {
            normal: Vector3::from(normal),
            vertices: [Point3::from(v0), Point3::from(v1), Point3::from(v2)],
        }
    }

    fn binary_stl(facets: &[RawFacet], declared: u32) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_SIZE];
        data.extend_from_slice(&declared.to_le_bytes());
        for f in facets {
            for v in std::iter::once(f.normal).chain(f.vertices.iter().map(|p| p.coords)) {
                for c in v.iter() {
                    data.extend_from_slice(&c.to_le_bytes());
                }
            }
            data.extend_from_slice(&0u16.to_le_bytes());
        }
        data
    }

    fn square() -> Vec<RawFacet> {
        // Two facets sharing the edge (1,0,0)-(0,1,0); the stored normals
        // are garbage on purpose.
        vec![
            facet([9.0, 9.0, 9.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            facet([0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]),
        ]
    }

    const ASCII_SQUARE: &str = "solid square
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 0 1
    outer loop
      vertex 1 1 0
      vertex 0 1 0
      vertex 1 0 0
    endloop
  endfacet
endsolid square
";

    #[test]
    fn test_parse_binary_header() {
        let data = binary_stl(&[], 0);
        let mut mesh = Mesh::new();
        let summary = decode_stl(Cursor::new(data), &mut mesh, LoadPolicy::BestEffort).unwrap();
        assert_eq!(summary.format, StlFormat::Binary);
        assert_eq!(summary.facets, 0);
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_binary_facets_are_consolidated() {
        let data = binary_stl(&square(), 2);
        let mut mesh = Mesh::new();
        let summary = decode_stl(Cursor::new(data), &mut mesh, LoadPolicy::BestEffort).unwrap();

        assert_eq!(summary.facets, 2);
        assert_eq!(mesh.triangles().len(), 6);
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.edges().len(), 5);
        // Stored normals are replaced by the winding normal.
        for n in mesh.normals() {
            assert_eq!(*n, Vector3::new(0.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_binary_degenerate_facets_are_skipped() {
        let mut facets = square();
        facets.insert(1, facet([0.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [2.0, 2.0, 2.0]));
        let data = binary_stl(&facets, 3);

        let mut mesh = Mesh::new();
        let summary = decode_stl(Cursor::new(data), &mut mesh, LoadPolicy::BestEffort).unwrap();
        assert_eq!(summary.facets, 2);
        assert_eq!(summary.degenerate, 1);
        assert_eq!(mesh.triangles().len(), 6);
        assert!(mesh.vertices().len() <= 6);
    }

    #[test]
    fn test_binary_short_count_ends_cleanly() {
        // Header claims more records than the stream holds.
        let data = binary_stl(&square(), 10);
        let mut mesh = Mesh::new();
        let summary = decode_stl(Cursor::new(data), &mut mesh, LoadPolicy::BestEffort).unwrap();
        assert_eq!(summary.facets, 2);
    }

    #[test]
    fn test_binary_truncated_record() {
        let mut data = binary_stl(&square(), 2);
        data.truncate(data.len() - 10);

        let mut mesh = Mesh::new();
        let err = decode_stl(Cursor::new(data.clone()), &mut mesh, LoadPolicy::BestEffort).unwrap_err();
        assert!(matches!(err, StlError::TruncatedRecord { index: 1, got: 40 }));
        // First facet survives under best effort.
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.edges().len(), 3);

        let mut strict = Mesh::new();
        assert!(decode_stl(Cursor::new(data), &mut strict, LoadPolicy::Strict).is_err());
        assert!(strict.is_empty());
        assert!(strict.vertices().is_empty());
    }

    #[test]
    fn test_binary_truncated_header() {
        let mut mesh = Mesh::new();
        let err = decode_stl(Cursor::new(vec![0u8; 40]), &mut mesh, LoadPolicy::BestEffort).unwrap_err();
        assert!(matches!(err, StlError::TruncatedHeader { got: 40 }));

        let err = decode_stl(Cursor::new(Vec::new()), &mut mesh, LoadPolicy::BestEffort).unwrap_err();
        assert!(matches!(err, StlError::TruncatedHeader { got: 0 }));
    }

    #[test]
    fn test_binary_header_starting_with_solid_without_space() {
        let mut data = binary_stl(&square(), 2);
        data[..5].copy_from_slice(b"solid");
        let mut mesh = Mesh::new();
        let summary = decode_stl(Cursor::new(data), &mut mesh, LoadPolicy::BestEffort).unwrap();
        assert_eq!(summary.format, StlFormat::Binary);
        assert_eq!(summary.facets, 2);
    }

    #[test]
    fn test_ascii_square() {
        let mut mesh = Mesh::new();
        let summary = decode_stl(Cursor::new(ASCII_SQUARE), &mut mesh, LoadPolicy::BestEffort).unwrap();
        assert_eq!(summary.format, StlFormat::Ascii);
        assert_eq!(summary.facets, 2);
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.edges().len(), 5);
    }

    #[test]
    fn test_ascii_detection_is_case_insensitive() {
        let text = ASCII_SQUARE.replacen("solid", "SOLID", 1);
        let mut mesh = Mesh::new();
        let summary = decode_stl(Cursor::new(text), &mut mesh, LoadPolicy::BestEffort).unwrap();
        assert_eq!(summary.format, StlFormat::Ascii);
        assert_eq!(summary.facets, 2);
    }

    #[test]
    fn test_ascii_collapses_delimiter_runs() {
        let text = "solid  \t\r\n facet normal 0 0 0 outer\tloop\r\nvertex 0 0 0   vertex 1e0 0 0 \
                    vertex 0 +1.0 0 endloop endfacet\n\n\nendsolid";
        let mut mesh = Mesh::new();
        let summary = decode_stl(Cursor::new(text), &mut mesh, LoadPolicy::BestEffort).unwrap();
        assert_eq!(summary.facets, 1);
        assert_eq!(mesh.vertices()[2], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_ascii_missing_endsolid_keeps_parsed_facets() {
        // Cut inside the second facet, then a stray token.
        let cut = ASCII_SQUARE.find("vertex 0 1 0\n      vertex 1 0 0").unwrap();
        let text = format!("{}oops", &ASCII_SQUARE[..cut]);

        let mut mesh = Mesh::new();
        let err = decode_stl(Cursor::new(text.clone()), &mut mesh, LoadPolicy::BestEffort).unwrap_err();
        match err {
            StlError::UnexpectedToken { token, state } => {
                assert_eq!(token, "oops");
                assert_eq!(state, AsciiState::Vertex(1));
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.edges().len(), 3);

        let mut strict = Mesh::new();
        assert!(decode_stl(Cursor::new(text), &mut strict, LoadPolicy::Strict).is_err());
        assert!(strict.is_empty());
    }

    #[test]
    fn test_ascii_eof_between_facets_is_accepted() {
        let end = ASCII_SQUARE.find("endsolid").unwrap();
        let mut mesh = Mesh::new();
        let summary = decode_stl(Cursor::new(&ASCII_SQUARE[..end]), &mut mesh, LoadPolicy::BestEffort).unwrap();
        assert_eq!(summary.facets, 2);
    }

    #[test]
    fn test_ascii_eof_inside_facet() {
        let cut = ASCII_SQUARE.find("endloop").unwrap();
        let mut mesh = Mesh::new();
        let err = decode_stl(Cursor::new(&ASCII_SQUARE[..cut]), &mut mesh, LoadPolicy::BestEffort).unwrap_err();
        assert!(matches!(err, StlError::UnexpectedEof { state: AsciiState::EndLoop }));
        assert!(mesh.is_empty());

        // Cut inside the second facet: best effort keeps the first one,
        // strict drops both.
        let cut = ASCII_SQUARE.rfind("endloop").unwrap();
        let mut mesh = Mesh::new();
        let err = decode_stl(Cursor::new(&ASCII_SQUARE[..cut]), &mut mesh, LoadPolicy::BestEffort).unwrap_err();
        assert!(matches!(err, StlError::UnexpectedEof { state: AsciiState::EndLoop }));
        assert!(!mesh.is_empty());

        let mut strict = Mesh::new();
        let err = decode_stl(Cursor::new(&ASCII_SQUARE[..cut]), &mut strict, LoadPolicy::Strict).unwrap_err();
        assert!(matches!(err, StlError::UnexpectedEof { .. }));
        assert!(strict.is_empty());
    }

    #[test]
    fn test_ascii_out_of_range_number_fails() {
        let text = ASCII_SQUARE.replacen("vertex 1 1 0", "vertex 1e39 1 0", 1);
        let mut mesh = Mesh::new();
        let err = decode_stl(Cursor::new(text), &mut mesh, LoadPolicy::BestEffort).unwrap_err();
        assert!(matches!(
            err,
            StlError::UnexpectedToken { state: AsciiState::VertexCoord(0, 0), .. }
        ));
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_parse_real() {
        assert_eq!(parse_real(b"1.5"), Some(1.5));
        assert_eq!(parse_real(b"-2e3"), Some(-2000.0));
        assert_eq!(parse_real(b"-3.5e38"), None);
        assert_eq!(parse_real(b"1.0x"), None);
        assert_eq!(parse_real(b"vertex"), None);
        assert_eq!(parse_real(b"inf"), None);
        assert_eq!(parse_real(b"nan"), None);
    }

    #[test]
    fn test_state_table_walks_one_facet() {
        let mut state = AsciiState::Facet;
        let mut steps = 0;
        loop {
            state = state.next();
            steps += 1;
            if state == AsciiState::Facet {
                break;
            }
        }
        // facet normal x y z outer loop 3 * (vertex x y z) endloop endfacet
        assert_eq!(steps, 21);
    }

    #[test]
    fn test_binary_and_ascii_decode_to_same_geometry() {
        let cube = Mesh::cube(3.0);

        let mut binary = Vec::new();
        encode_binary(&cube, &mut binary).unwrap();
        let mut ascii = Vec::new();
        encode_ascii(&cube, "cube", &mut ascii).unwrap();

        let mut from_binary = Mesh::new();
        decode_stl(Cursor::new(binary), &mut from_binary, LoadPolicy::Strict).unwrap();
        let mut from_ascii = Mesh::new();
        decode_stl(Cursor::new(ascii), &mut from_ascii, LoadPolicy::Strict).unwrap();

        assert_eq!(from_binary.triangle_count(), 12);
        assert_eq!(from_ascii.triangle_count(), 12);

        let sorted = |mesh: &Mesh| {
            let mut v: Vec<[u32; 3]> = mesh
                .vertices()
                .iter()
                .map(|p| [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()])
                .collect();
            v.sort_unstable();
            v
        };
        assert_eq!(sorted(&from_binary), sorted(&from_ascii));
        assert_eq!(sorted(&from_binary), sorted(&cube));
    }
}
