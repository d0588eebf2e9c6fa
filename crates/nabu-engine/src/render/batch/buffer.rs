use crate::render::vertex::{Index, Vertex2D};

/// Offsets of a region returned by [`BatchBuffer::reserve`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
}

/// Growable vertex/index staging area for one frame slot.
///
/// Append-only within a frame: offsets grow monotonically, and a region is owned
/// by the caller that reserved it until [`reset`](Self::reset). Growth may move the
/// storage, but offsets stay valid because they index into the resized storage.
#[derive(Debug, Default)]
pub struct BatchBuffer {
    vertices: Vec<Vertex2D>,
    indices: Vec<Index>,

    vertex_high_water: u32,
    index_high_water: u32,

    grow_events: u32,
}

impl BatchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_capacity: usize, index_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity),
            indices: Vec::with_capacity(index_capacity),
            ..Self::default()
        }
    }

    /// Reserves `vertex_count` vertices and `index_count` indices at the end of the
    /// buffer. The region is zero-initialized.
    ///
    /// Capacity grows geometrically (next power of two) when needed; this never fails.
    pub fn reserve(&mut self, vertex_count: u32, index_count: u32) -> Reservation {
        let vertex_offset = self.vertices.len() as u32;
        let index_offset = self.indices.len() as u32;

        let grew_vertices = grow_for(&mut self.vertices, vertex_count as usize);
        let grew_indices = grow_for(&mut self.indices, index_count as usize);
        if grew_vertices || grew_indices {
            self.grow_events += 1;
            log::debug!(
                "batch buffer grew to {} vertices / {} indices",
                self.vertices.capacity(),
                self.indices.capacity()
            );
        }

        self.vertices
            .resize(self.vertices.len() + vertex_count as usize, Vertex2D::default());
        self.indices.resize(self.indices.len() + index_count as usize, 0);

        self.vertex_high_water = self.vertex_high_water.max(self.vertices.len() as u32);
        self.index_high_water = self.index_high_water.max(self.indices.len() as u32);

        Reservation {
            vertex_offset,
            vertex_count,
            index_offset,
            index_count,
        }
    }

    /// Mutable access to a previously reserved region.
    ///
    /// # Panics
    /// Panics if the reservation does not lie inside the buffer (it was made
    /// before the last [`reset`](Self::reset)).
    pub fn region_mut(&mut self, r: Reservation) -> (&mut [Vertex2D], &mut [Index]) {
        let v0 = r.vertex_offset as usize;
        let i0 = r.index_offset as usize;
        (
            &mut self.vertices[v0..v0 + r.vertex_count as usize],
            &mut self.indices[i0..i0 + r.index_count as usize],
        )
    }

    /// Logically truncates to zero length, keeping capacity for the next frame.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.grow_events = 0;
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex2D] {
        &self.vertices
    }

    #[inline]
    pub fn indices(&self) -> &[Index] {
        &self.indices
    }

    #[inline]
    pub fn vertex_len(&self) -> u32 {
        self.vertices.len() as u32
    }

    #[inline]
    pub fn index_len(&self) -> u32 {
        self.indices.len() as u32
    }

    #[inline]
    pub fn capacity(&self) -> (usize, usize) {
        (self.vertices.capacity(), self.indices.capacity())
    }

    /// Largest vertex/index lengths seen since creation.
    #[inline]
    pub fn high_water_marks(&self) -> (u32, u32) {
        (self.vertex_high_water, self.index_high_water)
    }

    /// Number of growth events since the last reset.
    #[inline]
    pub fn grow_events(&self) -> u32 {
        self.grow_events
    }
}

/// Ensures room for `additional` more elements, doubling to the next power of two.
/// Returns true if the storage had to grow.
fn grow_for<T>(v: &mut Vec<T>, additional: usize) -> bool {
    let required = v.len() + additional;
    if required <= v.capacity() {
        return false;
    }
    let target = required.next_power_of_two().max(64);
    v.reserve_exact(target - v.len());
    true
}
