//! Triangle mesh buffers
//!
//! A [`Mesh`] is an unindexed triangle list with interleaved position and
//! normal data, laid out for direct upload to a vertex buffer.

use std::hash::Hasher;

use bytemuck::{Pod, Zeroable};

/// A vertex of an extracted surface
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position in field space
    pub position: [f32; 3],
    /// Unit outward surface normal
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }
}

/// Identity of one of the two buffers owned by a volume slot
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId {
    pub slot: u8,
    pub buffer: u8,
}

/// Triangle soup produced by one extraction pass
#[derive(Clone, Debug)]
pub struct Mesh {
    id: MeshId,
    vertices: Vec<MeshVertex>,
    /// Bumped on every completed extraction
    revision: u64,
    /// False while an extraction is running or after it was abandoned
    complete: bool,
}

impl Mesh {
    /// Create an empty, complete mesh
    pub fn new(id: MeshId) -> Self {
        Self {
            id,
            vertices: Vec::new(),
            revision: 0,
            complete: true,
        }
    }

    #[inline]
    pub fn id(&self) -> MeshId {
        self.id
    }

    #[inline]
    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Start a new extraction pass; keeps the allocation
    pub fn begin(&mut self) {
        self.vertices.clear();
        self.complete = false;
    }

    /// Append one triangle
    #[inline]
    pub fn push_triangle(&mut self, triangle: [MeshVertex; 3]) {
        self.vertices.extend_from_slice(&triangle);
    }

    /// Seal the current pass
    pub fn finish(&mut self) {
        self.complete = true;
        self.revision += 1;
    }

    /// Raw vertex bytes for GPU upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// FNV-1a hash of the vertex data (identity and revision excluded)
    pub fn checksum(&self) -> u64 {
        let mut hasher = Fnv1a::default();
        hasher.write(self.as_bytes());
        hasher.finish()
    }
}

struct Fnv1a(u64);

impl Default for Fnv1a {
    fn default() -> Self {
        Fnv1a(0xcbf2_9ce4_8422_2325)
    }
}

impl Hasher for Fnv1a {
    fn finish(&self) -> u64 {
        self.0
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(0x0100_0000_01b3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::size_of;

    fn id() -> MeshId {
        MeshId { slot: 0, buffer: 1 }
    }

    fn tri(z: f32) -> [MeshVertex; 3] {
        [
            MeshVertex::new([0.0, 0.0, z], [0.0, 0.0, 1.0]),
            MeshVertex::new([1.0, 0.0, z], [0.0, 0.0, 1.0]),
            MeshVertex::new([0.0, 1.0, z], [0.0, 0.0, 1.0]),
        ]
    }

    #[test]
    fn test_vertex_layout() {
        // 3 floats position + 3 floats normal
        assert_eq!(size_of::<MeshVertex>(), 24);
        assert_eq!(std::mem::align_of::<MeshVertex>(), 4);
    }

    #[test]
    fn test_extraction_pass_lifecycle() {
        let mut mesh = Mesh::new(id());
        assert!(mesh.is_complete());
        assert_eq!(mesh.revision(), 0);

        mesh.begin();
        assert!(!mesh.is_complete());
        mesh.push_triangle(tri(0.0));
        mesh.finish();

        assert!(mesh.is_complete());
        assert_eq!(mesh.revision(), 1);
        assert_eq!(mesh.triangle_count(), 1);
        assert_eq!(mesh.as_bytes().len(), 72);
    }

    #[test]
    fn test_checksum_tracks_content_not_identity() {
        let mut a = Mesh::new(MeshId { slot: 0, buffer: 0 });
        let mut b = Mesh::new(MeshId { slot: 2, buffer: 1 });
        for m in [&mut a, &mut b] {
            m.begin();
            m.push_triangle(tri(0.5));
            m.finish();
        }
        b.begin();
        b.push_triangle(tri(0.5));
        b.finish();
        assert_eq!(a.checksum(), b.checksum());

        b.begin();
        b.push_triangle(tri(0.25));
        b.finish();
        assert_ne!(a.checksum(), b.checksum());
    }

    #[test]
    fn test_begin_keeps_capacity() {
        let mut mesh = Mesh::new(id());
        mesh.begin();
        for _ in 0..100 {
            mesh.push_triangle(tri(1.0));
        }
        mesh.finish();
        let capacity = mesh.vertices.capacity();
        mesh.begin();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertices.capacity(), capacity);
    }
}
