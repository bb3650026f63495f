use crate::{DecodePosition, Error, Result, VertexDataAdapter};

/// Hard upper limit on unique vertices per meshlet; local triangle indices
/// are stored as bytes.
pub const MAX_VERTICES: usize = 255;

/// Hard upper limit on triangles per meshlet, matching the cluster sizes
/// mesh shading pipelines are prepared to schedule.
pub const MAX_TRIANGLES: usize = 512;

/// Default vertex budget used by the GPU-driven rendering consumers.
pub const DEFAULT_MAX_VERTICES: usize = 64;

/// Default triangle budget; 124 keeps `triangle_count * 3` 4-byte aligned
/// for consumers that pack the byte references into words.
pub const DEFAULT_MAX_TRIANGLES: usize = 124;

/// Locates one meshlet's data within the shared reference arrays of a
/// [`Meshlets`] collection.
///
/// The layout is GPU-facing: four 32-bit words, uploaded raw as a
/// structured buffer by cluster-culling compute shaders.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MeshletDescriptor {
    pub vertex_offset: u32,
    pub triangle_offset: u32,
    pub vertex_count: u32,
    pub triangle_count: u32,
}

/// A borrowed view of one meshlet's slices within a [`Meshlets`] collection.
#[derive(Copy, Clone)]
pub struct Meshlet<'data> {
    /// Global vertex ids, one per unique vertex referenced by this meshlet.
    pub vertices: &'data [u32],
    /// Local vertex indices, three per triangle, each `< vertices.len()`.
    pub triangles: &'data [u8],
}

impl Meshlet<'_> {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Resolves the local triangle references back to global vertex ids,
    /// three per triangle, producing an index buffer fragment equivalent to
    /// the meshlet's portion of the source mesh.
    pub fn resolve_global_indices(&self) -> Vec<u32> {
        self.triangles
            .iter()
            .map(|&local| self.vertices[local as usize])
            .collect()
    }
}

/// The result of meshlet clustering: descriptors plus the two shared
/// reference arrays they index into.
///
/// Meshlet slices are contiguous, disjoint, and appended in construction
/// order, so the three vectors can be uploaded to GPU buffers as-is.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Meshlets {
    pub meshlets: Vec<MeshletDescriptor>,
    pub vertices: Vec<u32>,
    pub triangles: Vec<u8>,
}

impl Meshlets {
    #[inline]
    pub fn len(&self) -> usize {
        self.meshlets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.meshlets.is_empty()
    }

    fn meshlet_from_descriptor(&self, meshlet: &MeshletDescriptor) -> Meshlet<'_> {
        Meshlet {
            vertices: &self.vertices[meshlet.vertex_offset as usize
                ..meshlet.vertex_offset as usize + meshlet.vertex_count as usize],
            triangles: &self.triangles[meshlet.triangle_offset as usize
                ..meshlet.triangle_offset as usize + meshlet.triangle_count as usize * 3],
        }
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Meshlet<'_> {
        self.meshlet_from_descriptor(&self.meshlets[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = Meshlet<'_>> {
        self.meshlets
            .iter()
            .map(|meshlet| self.meshlet_from_descriptor(meshlet))
    }
}

fn validate(
    indices: &[u32],
    vertex_count: usize,
    max_vertices: usize,
    max_triangles: usize,
) -> Result<()> {
    if vertex_count == 0 {
        return Err(Error::EmptyMesh("no vertices"));
    }
    if indices.is_empty() {
        return Err(Error::EmptyMesh("no indices"));
    }
    if indices.len() % 3 != 0 {
        return Err(Error::invalid_dynamic(format!(
            "index count ({}) must be a multiple of 3",
            indices.len()
        )));
    }
    if let Some(&index) = indices.iter().find(|&&index| index as usize >= vertex_count) {
        return Err(Error::invalid_dynamic(format!(
            "index value ({}) out of range of vertex count ({})",
            index, vertex_count
        )));
    }
    if max_vertices < 3 {
        return Err(Error::budget_too_small(
            "max_vertices must be at least 3 to hold one triangle",
        ));
    }
    if max_triangles < 1 {
        return Err(Error::budget_too_small("max_triangles must be at least 1"));
    }
    if max_vertices > MAX_VERTICES {
        return Err(Error::budget_too_large(
            "max_vertices must be <= 255 for byte-sized local indices",
        ));
    }
    if max_triangles > MAX_TRIANGLES {
        return Err(Error::budget_too_large("max_triangles must be <= 512"));
    }
    Ok(())
}

/// Per-vertex lists of incident triangles, in index-buffer order.
struct TriangleAdjacency {
    counts: Vec<u32>,
    offsets: Vec<u32>,
    data: Vec<u32>,
}

impl TriangleAdjacency {
    fn new(indices: &[u32], vertex_count: usize) -> Self {
        let mut counts = vec![0u32; vertex_count];
        for &index in indices {
            counts[index as usize] += 1;
        }

        let mut offsets = vec![0u32; vertex_count];
        let mut offset = 0u32;
        for (target, &count) in offsets.iter_mut().zip(counts.iter()) {
            *target = offset;
            offset += count;
        }

        let mut data = vec![0u32; indices.len()];
        let mut fill = offsets.clone();
        for (i, &index) in indices.iter().enumerate() {
            let slot = &mut fill[index as usize];
            data[*slot as usize] = (i / 3) as u32;
            *slot += 1;
        }

        TriangleAdjacency {
            counts,
            offsets,
            data,
        }
    }

    #[inline]
    fn triangles(&self, vertex: u32) -> &[u32] {
        let start = self.offsets[vertex as usize] as usize;
        &self.data[start..start + self.counts[vertex as usize] as usize]
    }
}

#[inline]
fn triangle_corners(indices: &[u32], triangle: u32) -> [u32; 3] {
    let base = triangle as usize * 3;
    [indices[base], indices[base + 1], indices[base + 2]]
}

/// Accumulates one cluster at a time and emits finished clusters into the
/// shared output arrays. The `vertex_slot` scratch table replaces a hash
/// map so output is a pure function of input order.
struct MeshletAccumulator<'a> {
    indices: &'a [u32],
    output: Meshlets,
    cluster: Vec<u32>,
    cluster_vertices: Vec<u32>,
    vertex_used: Vec<bool>,
    vertex_slot: Vec<u16>,
}

const SLOT_UNUSED: u16 = u16::MAX;

impl<'a> MeshletAccumulator<'a> {
    fn new(indices: &'a [u32], vertex_count: usize) -> Self {
        MeshletAccumulator {
            indices,
            output: Meshlets::default(),
            cluster: Vec::new(),
            cluster_vertices: Vec::new(),
            vertex_used: vec![false; vertex_count],
            vertex_slot: vec![SLOT_UNUSED; vertex_count],
        }
    }

    /// Number of the triangle's distinct vertices not yet in the cluster.
    fn fresh_vertex_count(&self, corners: [u32; 3]) -> usize {
        let mut fresh = 0;
        for i in 0..3 {
            let vertex = corners[i];
            if self.vertex_used[vertex as usize] || corners[..i].contains(&vertex) {
                continue;
            }
            fresh += 1;
        }
        fresh
    }

    /// Number of the triangle's distinct vertices already in the cluster.
    fn shared_vertex_count(&self, corners: [u32; 3]) -> usize {
        let mut shared = 0;
        for i in 0..3 {
            let vertex = corners[i];
            if !self.vertex_used[vertex as usize] || corners[..i].contains(&vertex) {
                continue;
            }
            shared += 1;
        }
        shared
    }

    fn fits(&self, corners: [u32; 3], max_vertices: usize, max_triangles: usize) -> bool {
        self.cluster.len() < max_triangles
            && self.cluster_vertices.len() + self.fresh_vertex_count(corners) <= max_vertices
    }

    fn add_triangle(&mut self, triangle: u32, corners: [u32; 3]) {
        self.cluster.push(triangle);
        for &vertex in &corners {
            if !self.vertex_used[vertex as usize] {
                self.vertex_used[vertex as usize] = true;
                self.cluster_vertices.push(vertex);
            }
        }
    }

    /// Emits the current cluster as one meshlet. Triangles are written in
    /// ascending source order; unique vertices in first-encounter order.
    fn flush(&mut self) {
        if self.cluster.is_empty() {
            return;
        }
        self.cluster.sort_unstable();

        let vertex_offset = self.output.vertices.len();
        let triangle_offset = self.output.triangles.len();

        for &triangle in &self.cluster {
            for vertex in triangle_corners(self.indices, triangle) {
                let slot = self.vertex_slot[vertex as usize];
                let slot = if slot == SLOT_UNUSED {
                    let next = (self.output.vertices.len() - vertex_offset) as u16;
                    self.vertex_slot[vertex as usize] = next;
                    self.output.vertices.push(vertex);
                    next
                } else {
                    slot
                };
                self.output.triangles.push(slot as u8);
            }
        }

        self.output.meshlets.push(MeshletDescriptor {
            vertex_offset: vertex_offset as u32,
            triangle_offset: triangle_offset as u32,
            vertex_count: (self.output.vertices.len() - vertex_offset) as u32,
            triangle_count: self.cluster.len() as u32,
        });

        for &vertex in &self.output.vertices[vertex_offset..] {
            self.vertex_slot[vertex as usize] = SLOT_UNUSED;
        }
        for &vertex in &self.cluster_vertices {
            self.vertex_used[vertex as usize] = false;
        }
        self.cluster.clear();
        self.cluster_vertices.clear();
    }

    fn finish(mut self) -> Meshlets {
        self.flush();
        self.output
    }
}

fn build_greedy(
    indices: &[u32],
    vertex_count: usize,
    max_vertices: usize,
    max_triangles: usize,
) -> Meshlets {
    let triangle_count = indices.len() / 3;
    let adjacency = TriangleAdjacency::new(indices, vertex_count);

    let mut acc = MeshletAccumulator::new(indices, vertex_count);
    let mut assigned = vec![false; triangle_count];
    let mut in_frontier = vec![false; triangle_count];
    let mut frontier: Vec<u32> = Vec::new();
    let mut assigned_count = 0usize;
    let mut cursor = 0usize;

    while assigned_count < triangle_count {
        // Seed from the leftover frontier when possible so consecutive
        // meshlets stay spatially adjacent; the lowest triangle id wins to
        // keep the choice deterministic.
        let seed = frontier
            .iter()
            .copied()
            .filter(|&t| !assigned[t as usize])
            .min();
        for &t in &frontier {
            in_frontier[t as usize] = false;
        }
        frontier.clear();

        let seed = match seed {
            Some(t) => t,
            None => {
                while assigned[cursor] {
                    cursor += 1;
                }
                cursor as u32
            }
        };

        let mut accept = |triangle: u32,
                          acc: &mut MeshletAccumulator<'_>,
                          assigned: &mut Vec<bool>,
                          in_frontier: &mut Vec<bool>,
                          frontier: &mut Vec<u32>| {
            let corners = triangle_corners(indices, triangle);
            assigned[triangle as usize] = true;
            assigned_count += 1;
            acc.add_triangle(triangle, corners);

            // Unassigned triangles sharing a full edge with this one become
            // growth candidates.
            for (a, b) in [(0, 1), (1, 2), (2, 0)] {
                for &other in adjacency.triangles(corners[a]) {
                    if other == triangle
                        || assigned[other as usize]
                        || in_frontier[other as usize]
                    {
                        continue;
                    }
                    if triangle_corners(indices, other).contains(&corners[b]) {
                        in_frontier[other as usize] = true;
                        frontier.push(other);
                    }
                }
            }
        };

        accept(seed, &mut acc, &mut assigned, &mut in_frontier, &mut frontier);

        // Grow breadth-first, always taking the admissible candidate that
        // reuses the most cluster vertices; ties fall to the lowest id.
        loop {
            let mut best: Option<u32> = None;
            let mut best_shared = 0usize;
            for &candidate in &frontier {
                if assigned[candidate as usize] {
                    continue;
                }
                let corners = triangle_corners(indices, candidate);
                if !acc.fits(corners, max_vertices, max_triangles) {
                    continue;
                }
                let shared = acc.shared_vertex_count(corners);
                let better = match best {
                    None => true,
                    Some(current) => {
                        shared > best_shared || (shared == best_shared && candidate < current)
                    }
                };
                if better {
                    best = Some(candidate);
                    best_shared = shared;
                }
            }
            match best {
                Some(triangle) => {
                    accept(triangle, &mut acc, &mut assigned, &mut in_frontier, &mut frontier)
                }
                None => break,
            }
        }

        acc.flush();
    }

    acc.finish()
}

/// Splits the mesh into a set of meshlets where each meshlet has a micro
/// index buffer indexing into meshlet vertices that refer to the original
/// vertex buffer.
///
/// Clusters are grown greedily over triangle adjacency, so triangles of a
/// meshlet form a spatially coherent patch and shared vertices are counted
/// once against the vertex budget. The resulting data can be fed to mesh
/// shading pipelines or to compute-culled indirect draws.
///
/// Given identical input, the output is byte-identical across runs; callers
/// may cache and compare built collections by content.
///
/// `max_vertices` must be in `3..=255` and `max_triangles` in `1..=512`
/// (see [`DEFAULT_MAX_VERTICES`] and [`DEFAULT_MAX_TRIANGLES`] for the
/// values the renderer consumers assume).
pub fn build_meshlets(
    indices: &[u32],
    vertices: &VertexDataAdapter<'_>,
    max_vertices: usize,
    max_triangles: usize,
) -> Result<Meshlets> {
    validate(indices, vertices.vertex_count, max_vertices, max_triangles)?;
    Ok(build_greedy(
        indices,
        vertices.vertex_count,
        max_vertices,
        max_triangles,
    ))
}

/// Same as [`build_meshlets`], but accepts a slice of any vertex type that
/// implements [`DecodePosition`].
pub fn build_meshlets_decoder<T: DecodePosition>(
    indices: &[u32],
    vertices: &[T],
    max_vertices: usize,
    max_triangles: usize,
) -> Result<Meshlets> {
    validate(indices, vertices.len(), max_vertices, max_triangles)?;
    Ok(build_greedy(
        indices,
        vertices.len(),
        max_vertices,
        max_triangles,
    ))
}

/// Splits the mesh into meshlets in input triangle order, without building
/// adjacency.
///
/// Triangles are appended to the current meshlet until either budget would
/// overflow, then a new meshlet is started. Cheaper than [`build_meshlets`]
/// and useful when the index buffer is already locality-optimized, at the
/// cost of vertex reuse on arbitrary input.
pub fn build_meshlets_scan(
    indices: &[u32],
    vertex_count: usize,
    max_vertices: usize,
    max_triangles: usize,
) -> Result<Meshlets> {
    validate(indices, vertex_count, max_vertices, max_triangles)?;

    let mut acc = MeshletAccumulator::new(indices, vertex_count);
    for triangle in 0..(indices.len() / 3) as u32 {
        let corners = triangle_corners(indices, triangle);
        if !acc.fits(corners, max_vertices, max_triangles) {
            acc.flush();
        }
        acc.add_triangle(triangle, corners);
    }
    Ok(acc.finish())
}
