//! Lookup tables for tetrahedral polygonisation
//!
//! Each grid cube is split into 6 tetrahedra sharing the main diagonal
//! from corner 0 to corner 6. A tetrahedron has 4 vertices and 6 edges, so
//! there are 2^4 = 16 inside/outside configurations.

/// Corner offsets of a grid cube, in cell units
pub const CUBE_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0], // 0
    [1, 0, 0], // 1
    [1, 1, 0], // 2
    [0, 1, 0], // 3
    [0, 0, 1], // 4
    [1, 0, 1], // 5
    [1, 1, 1], // 6
    [0, 1, 1], // 7
];

/// Cube decomposition into tetrahedra (indices into [`CUBE_CORNERS`])
///
/// Every tetrahedron contains the 0-6 diagonal, so shared faces of
/// neighbouring cubes are split along the same face diagonal.
pub const CUBE_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 5, 1, 6],
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
];

/// Edge definitions for a tetrahedron
pub const EDGES: [[usize; 2]; 6] = [
    [0, 1], // Edge 0
    [0, 2], // Edge 1
    [0, 3], // Edge 2
    [1, 2], // Edge 3
    [1, 3], // Edge 4
    [2, 3], // Edge 5
];

/// For each case (0-15), which edges are crossed by the isosurface.
/// Bit i is set if edge i is crossed.
pub const EDGE_TABLE: [u8; 16] = compute_edge_table();

/// For each case, the crossed edges in polygon order, -1 terminated.
///
/// Three entries form a triangle, four form a quad to be split as
/// (0, 1, 2) + (0, 2, 3). Orientation is not encoded; the extractor
/// orients each triangle against the field gradient.
pub const POLYGON_TABLE: [[i8; 4]; 16] = compute_polygon_table();

const fn compute_edge_table() -> [u8; 16] {
    let mut table = [0u8; 16];
    let mut case_idx: usize = 0;

    while case_idx < 16 {
        let mut edge_mask = 0u8;
        let mut edge_idx = 0;

        while edge_idx < 6 {
            let v0 = EDGES[edge_idx][0];
            let v1 = EDGES[edge_idx][1];

            let v0_inside = (case_idx >> v0) & 1;
            let v1_inside = (case_idx >> v1) & 1;

            if v0_inside != v1_inside {
                edge_mask |= 1 << edge_idx;
            }

            edge_idx += 1;
        }

        table[case_idx] = edge_mask;
        case_idx += 1;
    }

    table
}

const fn edge_between(a: usize, b: usize) -> i8 {
    let mut i = 0;
    while i < 6 {
        let e = EDGES[i];
        if (e[0] == a && e[1] == b) || (e[0] == b && e[1] == a) {
            return i as i8;
        }
        i += 1;
    }
    -1
}

const fn compute_polygon_table() -> [[i8; 4]; 16] {
    let mut table = [[-1i8; 4]; 16];
    let mut case_idx: usize = 0;

    while case_idx < 16 {
        let inside_count = (case_idx as u8).count_ones();

        if inside_count == 1 || inside_count == 3 {
            // The odd vertex out: the only inside one, or the only outside one
            let lone_inside = inside_count == 1;
            let mut lone = 0;
            while lone < 4 {
                let is_inside = (case_idx >> lone) & 1 == 1;
                if is_inside == lone_inside {
                    break;
                }
                lone += 1;
            }

            let mut n = 0;
            let mut other = 0;
            while other < 4 {
                if other != lone {
                    table[case_idx][n] = edge_between(lone, other);
                    n += 1;
                }
                other += 1;
            }
        } else if inside_count == 2 {
            // Two in (a, b), two out (c, d): the quad runs a-c, a-d, b-d, b-c
            let mut inside = [0usize; 2];
            let mut outside = [0usize; 2];
            let (mut ni, mut no) = (0, 0);
            let mut v = 0;
            while v < 4 {
                if (case_idx >> v) & 1 == 1 {
                    inside[ni] = v;
                    ni += 1;
                } else {
                    outside[no] = v;
                    no += 1;
                }
                v += 1;
            }
            let (a, b) = (inside[0], inside[1]);
            let (c, d) = (outside[0], outside[1]);
            table[case_idx] = [
                edge_between(a, c),
                edge_between(a, d),
                edge_between(b, d),
                edge_between(b, c),
            ];
        }

        case_idx += 1;
    }

    table
}

/// Number of polygon corners for a case (0, 3 or 4)
#[inline]
pub const fn polygon_len(case_idx: usize) -> usize {
    let row = POLYGON_TABLE[case_idx];
    let mut n = 0;
    while n < 4 && row[n] >= 0 {
        n += 1;
    }
    n
}
