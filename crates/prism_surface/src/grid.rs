//! Flat, lazily-filled scalar grid
//!
//! Corner samples are stored in one flat array indexed `(i * dim + j) * dim + k`.
//! Entries are tagged with a pass stamp so resetting the grid between passes
//! is O(1) and needs no reallocation.

/// Cube of `dim^3` scalar samples with per-pass validity
#[derive(Clone, Debug)]
pub struct ScalarGrid {
    dim: usize,
    values: Vec<f32>,
    stamps: Vec<u32>,
    stamp: u32,
}

impl ScalarGrid {
    /// Create a grid with `dim` samples per axis
    pub fn new(dim: usize) -> Self {
        let len = dim * dim * dim;
        Self {
            dim,
            values: vec![0.0; len],
            stamps: vec![0; len],
            stamp: 1,
        }
    }

    /// Samples per axis
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Resize, discarding all samples
    pub fn resize(&mut self, dim: usize) {
        let len = dim * dim * dim;
        self.dim = dim;
        self.values.clear();
        self.values.resize(len, 0.0);
        self.stamps.clear();
        self.stamps.resize(len, 0);
        self.stamp = 1;
    }

    /// Invalidate every sample
    pub fn reset(&mut self) {
        self.stamp = self.stamp.wrapping_add(1);
        if self.stamp == 0 {
            self.stamps.fill(0);
            self.stamp = 1;
        }
    }

    /// Flat index of a sample, or `None` if out of bounds
    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> Option<usize> {
        if i < self.dim && j < self.dim && k < self.dim {
            Some((i * self.dim + j) * self.dim + k)
        } else {
            None
        }
    }

    /// Sample written during the current pass
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<f32> {
        let idx = self.index(i, j, k)?;
        (self.stamps[idx] == self.stamp).then(|| self.values[idx])
    }

    /// Store a sample for the current pass; out-of-bounds writes are ignored
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, k: usize, value: f32) {
        if let Some(idx) = self.index(i, j, k) {
            self.values[idx] = value;
            self.stamps[idx] = self.stamp;
        }
    }

    /// Cached sample, computing it with `f` on first access this pass
    #[inline]
    pub fn get_or_insert_with(
        &mut self,
        i: usize,
        j: usize,
        k: usize,
        f: impl FnOnce() -> f32,
    ) -> Option<f32> {
        let idx = self.index(i, j, k)?;
        if self.stamps[idx] != self.stamp {
            self.values[idx] = f();
            self.stamps[idx] = self.stamp;
        }
        Some(self.values[idx])
    }
}
