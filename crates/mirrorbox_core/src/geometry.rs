//! The scene's single interleaved vertex table.
//!
//! Every object in the scene lives in one flat array of [`Vertex`] values,
//! addressed by a named [`GeometryRange`].  There is no index buffer: each
//! range is a plain triangle list or line list in the order the rasterizer
//! consumes it.
//!
//! | Range        | Offset | Count | Primitive |
//! |--------------|--------|-------|-----------|
//! | `Cube`       | 0      | 36    | triangles |
//! | `MirrorQuad` | 36     | 6     | triangles |
//! | `GridLines`  | 42     | 20    | lines     |
//!
//! The table is built from a small set of authored descriptors (cube faces,
//! mirror corners, grid segments) rather than one giant literal, so each
//! sub-range can be checked on its own.

use std::ops::Range;

/// One interleaved vertex: 11 × `f32`, 44 bytes, no padding.
///
/// The field order is the attribute order of the vertex buffer layout built
/// by the renderer; `bytemuck` reinterprets a slice of these as raw bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position (Z is up).
    pub position: [f32; 3],
    /// Linear RGB vertex colour.
    pub color: [f32; 3],
    /// Texture coordinate in 0..1.
    pub texcoord: [f32; 2],
    /// Surface normal; unit length by convention, zero for line geometry.
    pub normal: [f32; 3],
}

impl Vertex {
    /// Byte stride between consecutive vertices.
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    /// Byte offsets of each attribute inside a vertex.
    pub const POSITION_OFFSET: u64 = 0;
    pub const COLOR_OFFSET: u64 = 3 * 4;
    pub const TEXCOORD_OFFSET: u64 = 6 * 4;
    pub const NORMAL_OFFSET: u64 = 8 * 4;
}

/// How the rasterizer assembles a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Triangle list, 3 vertices per face.
    Triangles,
    /// Line list, 2 vertices per segment.
    Lines,
}

impl Primitive {
    /// Number of vertices consumed per primitive.
    pub fn vertices_per_primitive(self) -> u32 {
        match self {
            Primitive::Triangles => 3,
            Primitive::Lines => 2,
        }
    }
}

/// Names of the fixed sub-ranges of the vertex table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeName {
    Cube,
    MirrorQuad,
    GridLines,
}

impl RangeName {
    pub const ALL: [RangeName; 3] = [RangeName::Cube, RangeName::MirrorQuad, RangeName::GridLines];

    fn index(self) -> usize {
        match self {
            RangeName::Cube => 0,
            RangeName::MirrorQuad => 1,
            RangeName::GridLines => 2,
        }
    }
}

/// A contiguous `(offset, count, primitive)` slice of the vertex table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryRange {
    pub offset: u32,
    pub count: u32,
    pub primitive: Primitive,
}

impl GeometryRange {
    /// Vertex index range, ready for `draw(range, 0..1)`.
    #[inline]
    pub fn vertices(&self) -> Range<u32> {
        self.offset..self.offset + self.count
    }

    /// Returns `true` when the two ranges share at least one vertex.
    pub fn overlaps(&self, other: &GeometryRange) -> bool {
        self.offset < other.offset + other.count && other.offset < self.offset + self.count
    }
}

/// The packed vertex array plus its named ranges.  Immutable once built.
#[derive(Debug, Clone)]
pub struct VertexTable {
    vertices: Vec<Vertex>,
    ranges: [GeometryRange; 3],
}

impl VertexTable {
    /// All vertices in buffer order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// The table as raw bytes for a one-time GPU upload.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Looks up a named range.  Every [`RangeName`] is always present.
    #[inline]
    pub fn range(&self, name: RangeName) -> GeometryRange {
        self.ranges[name.index()]
    }

    /// Iterates `(name, range)` pairs in buffer order.
    pub fn ranges(&self) -> impl Iterator<Item = (RangeName, GeometryRange)> + '_ {
        RangeName::ALL.iter().map(move |&name| (name, self.range(name)))
    }
}

// ── Authored data ─────────────────────────────────────────────────────────────

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const BLACK: [f32; 3] = [0.0, 0.0, 0.0];
const NO_NORMAL: [f32; 3] = [0.0, 0.0, 0.0];

/// Corner visit order that splits a quad `a b c d` into triangles `abc` `cda`.
const QUAD_ORDER: [usize; 6] = [0, 1, 2, 2, 3, 0];

/// One quad: four `(position, texcoord)` corners sharing a normal.
struct Quad {
    normal: [f32; 3],
    corners: [([f32; 3], [f32; 2]); 4],
}

/// Normals are the authored table values, not derived from face position:
/// bottom and top carry ∓Y, back and front carry ∓Z.
#[rustfmt::skip]
const CUBE_FACES: [Quad; 6] = [
    // bottom, z = -0.5
    Quad { normal: [0.0, -1.0, 0.0], corners: [
        ([-0.5, -0.5, -0.5], [0.0, 0.0]), ([ 0.5, -0.5, -0.5], [1.0, 0.0]),
        ([ 0.5,  0.5, -0.5], [1.0, 1.0]), ([-0.5,  0.5, -0.5], [0.0, 1.0]),
    ]},
    // top, z = 0.5
    Quad { normal: [0.0, 1.0, 0.0], corners: [
        ([-0.5, -0.5,  0.5], [0.0, 0.0]), ([ 0.5, -0.5,  0.5], [1.0, 0.0]),
        ([ 0.5,  0.5,  0.5], [1.0, 1.0]), ([-0.5,  0.5,  0.5], [0.0, 1.0]),
    ]},
    // left, x = -0.5
    Quad { normal: [-1.0, 0.0, 0.0], corners: [
        ([-0.5,  0.5,  0.5], [1.0, 0.0]), ([-0.5,  0.5, -0.5], [1.0, 1.0]),
        ([-0.5, -0.5, -0.5], [0.0, 1.0]), ([-0.5, -0.5,  0.5], [0.0, 0.0]),
    ]},
    // right, x = 0.5
    Quad { normal: [1.0, 0.0, 0.0], corners: [
        ([ 0.5,  0.5,  0.5], [1.0, 0.0]), ([ 0.5,  0.5, -0.5], [1.0, 1.0]),
        ([ 0.5, -0.5, -0.5], [0.0, 1.0]), ([ 0.5, -0.5,  0.5], [0.0, 0.0]),
    ]},
    // back, y = -0.5
    Quad { normal: [0.0, 0.0, -1.0], corners: [
        ([-0.5, -0.5, -0.5], [0.0, 1.0]), ([ 0.5, -0.5, -0.5], [1.0, 1.0]),
        ([ 0.5, -0.5,  0.5], [1.0, 0.0]), ([-0.5, -0.5,  0.5], [0.0, 0.0]),
    ]},
    // front, y = 0.5
    Quad { normal: [0.0, 0.0, 1.0], corners: [
        ([-0.5,  0.5, -0.5], [0.0, 1.0]), ([ 0.5,  0.5, -0.5], [1.0, 1.0]),
        ([ 0.5,  0.5,  0.5], [1.0, 0.0]), ([-0.5,  0.5,  0.5], [0.0, 0.0]),
    ]},
];

/// Mirror surface: a 3 × 3 black quad level with the cube's bottom face.
#[rustfmt::skip]
const MIRROR: Quad = Quad { normal: [0.0, 1.0, 0.0], corners: [
    ([-1.5, -1.5, -0.5], [0.0, 0.0]), ([ 1.5, -1.5, -0.5], [1.0, 0.0]),
    ([ 1.5,  1.5, -0.5], [1.0, 1.0]), ([-1.5,  1.5, -0.5], [0.0, 1.0]),
]};

/// Height of the reference grid, just above the mirror plane.
const GRID_Z: f32 = -0.4;

/// Grid segments as `(start, end)` in the XY plane.
#[rustfmt::skip]
const GRID_SEGMENTS: [([f32; 2], [f32; 2]); 10] = [
    // outer frame
    ([ 2.4, -2.4], [-2.4, -2.4]),
    ([-2.4,  2.4], [ 2.4,  2.4]),
    ([ 2.4, -2.4], [ 2.4,  2.4]),
    ([-2.4, -2.4], [-2.4,  2.4]),
    // centre axes, twice as long as the frame
    ([ 0.0, -4.8], [ 0.0,  4.8]),
    ([-4.8,  0.0], [ 4.8,  0.0]),
    // quarter lines
    ([ 1.2, -2.4], [ 1.2,  2.4]),
    ([-2.4,  1.2], [ 2.4,  1.2]),
    ([-1.2, -2.4], [-1.2,  2.4]),
    ([-2.4, -1.2], [ 2.4, -1.2]),
];

fn push_quad(out: &mut Vec<Vertex>, quad: &Quad, color: [f32; 3]) {
    for &corner in &QUAD_ORDER {
        let (position, texcoord) = quad.corners[corner];
        out.push(Vertex { position, color, texcoord, normal: quad.normal });
    }
}

fn push_cube(out: &mut Vec<Vertex>) {
    for face in &CUBE_FACES {
        push_quad(out, face, WHITE);
    }
}

fn push_mirror(out: &mut Vec<Vertex>) {
    push_quad(out, &MIRROR, BLACK);
}

fn push_grid(out: &mut Vec<Vertex>) {
    for &(start, end) in &GRID_SEGMENTS {
        for [x, y] in [start, end] {
            out.push(Vertex {
                position: [x, y, GRID_Z],
                color: WHITE,
                texcoord: [0.0, 0.0],
                normal: NO_NORMAL,
            });
        }
    }
}

/// Named sub-ranges in buffer order, each with the routine that emits it.
const SUB_RANGES: [(RangeName, Primitive, fn(&mut Vec<Vertex>)); 3] = [
    (RangeName::Cube, Primitive::Triangles, push_cube),
    (RangeName::MirrorQuad, Primitive::Triangles, push_mirror),
    (RangeName::GridLines, Primitive::Lines, push_grid),
];

/// Builds the interleaved vertex array and its range table.
///
/// Pure function of the authored data above: no inputs, no failure modes.
pub fn build_vertex_buffer() -> VertexTable {
    let mut vertices = Vec::with_capacity(62);
    let mut ranges = [GeometryRange { offset: 0, count: 0, primitive: Primitive::Triangles }; 3];

    for (name, primitive, emit) in SUB_RANGES {
        let offset = vertices.len() as u32;
        emit(&mut vertices);
        let count = vertices.len() as u32 - offset;
        debug_assert_eq!(count % primitive.vertices_per_primitive(), 0);
        ranges[name.index()] = GeometryRange { offset, count, primitive };
    }

    VertexTable { vertices, ranges }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_match_authored_layout() {
        let table = build_vertex_buffer();
        assert_eq!(
            table.range(RangeName::Cube),
            GeometryRange { offset: 0, count: 36, primitive: Primitive::Triangles }
        );
        assert_eq!(
            table.range(RangeName::MirrorQuad),
            GeometryRange { offset: 36, count: 6, primitive: Primitive::Triangles }
        );
        assert_eq!(
            table.range(RangeName::GridLines),
            GeometryRange { offset: 42, count: 20, primitive: Primitive::Lines }
        );
        assert_eq!(table.vertices().len(), 62);
    }

    #[test]
    fn ranges_are_disjoint_and_cover_the_table() {
        let table = build_vertex_buffer();
        let ranges: Vec<_> = table.ranges().map(|(_, r)| r).collect();
        for (i, a) in ranges.iter().enumerate() {
            for b in &ranges[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
        let total: u32 = ranges.iter().map(|r| r.count).sum();
        assert_eq!(total as usize, table.vertices().len());
    }

    #[test]
    fn bytes_are_tightly_interleaved() {
        let table = build_vertex_buffer();
        assert_eq!(Vertex::STRIDE, 44);
        assert_eq!(table.bytes().len(), 62 * 44);

        // second float of the first vertex is the cube's min y
        let y = f32::from_ne_bytes(table.bytes()[4..8].try_into().unwrap());
        assert_eq!(y, -0.5);
    }

    #[test]
    fn cube_faces_are_two_triangles_each() {
        let table = build_vertex_buffer();
        let cube = &table.vertices()[table.range(RangeName::Cube).vertices().start as usize..][..36];
        for face in cube.chunks(6) {
            // abc / cda: vertex 2 repeats as 3, vertex 0 repeats as 5
            assert_eq!(face[2], face[3]);
            assert_eq!(face[0], face[5]);
            assert!(face.iter().all(|v| v.normal == face[0].normal));
            assert!(face.iter().all(|v| v.position.iter().all(|c| c.abs() == 0.5)));
        }
    }

    #[test]
    fn face_normals_are_the_authored_values() {
        let table = build_vertex_buffer();
        let cube = &table.vertices()[..36];
        let normals: Vec<[f32; 3]> = cube.chunks(6).map(|face| face[0].normal).collect();
        assert_eq!(
            normals,
            vec![
                [0.0, -1.0, 0.0],
                [0.0, 1.0, 0.0],
                [-1.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [0.0, 0.0, -1.0],
                [0.0, 0.0, 1.0],
            ]
        );

        let mirror = table.range(RangeName::MirrorQuad);
        assert!(table.vertices()[mirror.offset as usize..][..mirror.count as usize]
            .iter()
            .all(|v| v.normal == [0.0, 1.0, 0.0]));
    }

    #[test]
    fn mirror_is_black_and_level_with_cube_bottom() {
        let table = build_vertex_buffer();
        let mirror = table.range(RangeName::MirrorQuad);
        for v in &table.vertices()[mirror.offset as usize..][..mirror.count as usize] {
            assert_eq!(v.color, BLACK);
            assert_eq!(v.position[2], -0.5);
        }
    }

    #[test]
    fn grid_lines_sit_above_the_mirror() {
        let table = build_vertex_buffer();
        let grid = table.range(RangeName::GridLines);
        assert_eq!(grid.count % 2, 0);
        for v in &table.vertices()[grid.vertices().start as usize..] {
            assert_eq!(v.position[2], GRID_Z);
            assert_eq!(v.normal, NO_NORMAL);
        }
    }
}
