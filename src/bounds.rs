use crate::{quantize_snorm, rcp_safe, DecodePosition, Error, Meshlet, Result, VertexDataAdapter};

/// Bounding data for one cluster, sufficient for frustum, backface and
/// occlusion culling.
///
/// For backface culling with orthographic projection, reject a cluster when
/// `dot(view, cone_axis) >= cone_cutoff`.
///
/// For perspective projection, use the apex:
/// `dot(normalize(cone_apex - camera_position), cone_axis) >= cone_cutoff`.
///
/// Alternatively the bounding sphere can stand in for the apex:
/// `dot(center - camera_position, cone_axis) >= cone_cutoff * length(center - camera_position) + radius`.
///
/// The `_s8` fields carry the cone quantized to 8-bit snorm values for
/// renderers that pack cluster data; the quantized cutoff is rounded up so
/// the quantized test stays conservative.
#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub center: [f32; 3],
    pub radius: f32,
    pub cone_apex: [f32; 3],
    pub cone_axis: [f32; 3],
    pub cone_cutoff: f32,
    pub cone_axis_s8: [i8; 3],
    pub cone_cutoff_s8: i8,
}

#[inline]
fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn normalize(v: [f32; 3]) -> [f32; 3] {
    let inv_length = rcp_safe(dot(v, v).sqrt());
    [v[0] * inv_length, v[1] * inv_length, v[2] * inv_length]
}

/// Ritter-style enclosing sphere: start from the most distant pair of
/// axis-extreme points, then grow to cover stragglers. Not minimal, but
/// deterministic and within a few percent of the optimum in practice.
fn bounding_sphere(points: &[[f32; 3]]) -> ([f32; 3], f32) {
    // extreme points along each axis
    let mut pmin = [0usize; 3];
    let mut pmax = [0usize; 3];
    for (i, point) in points.iter().enumerate() {
        for axis in 0..3 {
            if point[axis] < points[pmin[axis]][axis] {
                pmin[axis] = i;
            }
            if point[axis] > points[pmax[axis]][axis] {
                pmax[axis] = i;
            }
        }
    }

    // the pair with the widest separation seeds the sphere
    let mut best_axis = 0;
    let mut best_distance = 0f32;
    for axis in 0..3 {
        let delta = sub(points[pmax[axis]], points[pmin[axis]]);
        let distance = dot(delta, delta);
        if distance > best_distance {
            best_axis = axis;
            best_distance = distance;
        }
    }

    let a = points[pmin[best_axis]];
    let b = points[pmax[best_axis]];
    let mut center = [
        (a[0] + b[0]) / 2.0,
        (a[1] + b[1]) / 2.0,
        (a[2] + b[2]) / 2.0,
    ];
    let mut radius = best_distance.sqrt() / 2.0;

    for &point in points {
        let delta = sub(point, center);
        let distance = dot(delta, delta).sqrt();
        if distance > radius {
            // shift towards the straggler so both it and the far side of
            // the old sphere stay covered
            let shift = (distance - radius) / 2.0;
            let scale = shift * rcp_safe(distance);
            center[0] += delta[0] * scale;
            center[1] += delta[1] * scale;
            center[2] += delta[2] * scale;
            radius += shift;
        }
    }

    (center, radius)
}

/// `corners` holds triangle corner positions, three per triangle, already
/// resolved from the index data.
fn cluster_bounds_from_corners(corners: &[[f32; 3]]) -> Bounds {
    let (center, radius) = bounding_sphere(corners);

    // unit face normals; degenerate triangles contribute nothing
    let mut normals: Vec<[f32; 3]> = Vec::with_capacity(corners.len() / 3);
    let mut axis = [0f32; 3];
    for triangle in corners.chunks_exact(3) {
        let normal = cross(sub(triangle[1], triangle[0]), sub(triangle[2], triangle[0]));
        let length = dot(normal, normal).sqrt();
        if length == 0.0 {
            continue;
        }
        let inv_length = 1.0 / length;
        let normal = [
            normal[0] * inv_length,
            normal[1] * inv_length,
            normal[2] * inv_length,
        ];
        axis[0] += normal[0];
        axis[1] += normal[1];
        axis[2] += normal[2];
        normals.push(normal);
    }
    let axis = normalize(axis);

    let mut min_dot = 1f32;
    for &normal in &normals {
        min_dot = min_dot.min(dot(axis, normal));
    }

    let mut bounds = Bounds {
        center,
        radius,
        cone_apex: center,
        cone_axis: axis,
        // past 90 degrees of normal spread the cone can reject nothing
        cone_cutoff: 1.0,
        ..Bounds::default()
    };

    if !normals.is_empty() && min_dot > 0.0 {
        bounds.cone_cutoff = (1.0 - min_dot * min_dot).max(0.0).sqrt();

        // push the apex back along the axis far enough that every triangle
        // plane is on its front side
        let mut max_offset = 0f32;
        for (triangle, &normal) in corners.chunks_exact(3).zip(normals.iter()) {
            let axis_dot = dot(axis, normal);
            if axis_dot > 0.0 {
                let offset = dot(sub(center, triangle[0]), normal) / axis_dot;
                max_offset = max_offset.max(offset);
            }
        }
        bounds.cone_apex = [
            center[0] - axis[0] * max_offset,
            center[1] - axis[1] * max_offset,
            center[2] - axis[2] * max_offset,
        ];
    }

    for i in 0..3 {
        bounds.cone_axis_s8[i] = quantize_snorm(bounds.cone_axis[i], 8) as i8;
    }
    let mut cutoff_s8 = quantize_snorm(bounds.cone_cutoff, 8);
    if (cutoff_s8 as f32) / 127.0 < bounds.cone_cutoff && cutoff_s8 < 127 {
        cutoff_s8 += 1;
    }
    bounds.cone_cutoff_s8 = cutoff_s8 as i8;

    bounds
}

fn gather_corners(indices: &[u32], vertices: &VertexDataAdapter<'_>) -> Result<Vec<[f32; 3]>> {
    if indices.is_empty() {
        return Err(Error::EmptyMesh("no indices"));
    }
    if indices.len() % 3 != 0 {
        return Err(Error::invalid_dynamic(format!(
            "index count ({}) must be a multiple of 3",
            indices.len()
        )));
    }
    indices
        .iter()
        .map(|&index| vertices.position_at(index as usize))
        .collect()
}

/// Creates bounding volumes for an arbitrary cluster of triangles, given as
/// an index buffer fragment over the source vertex data.
///
/// The cluster is assumed to be of meshlet size; the computation is exact
/// in the number of triangles, so very large clusters are merely slow, not
/// wrong.
pub fn compute_cluster_bounds(
    indices: &[u32],
    vertices: &VertexDataAdapter<'_>,
) -> Result<Bounds> {
    let corners = gather_corners(indices, vertices)?;
    Ok(cluster_bounds_from_corners(&corners))
}

/// Same as [`compute_cluster_bounds`], but accepts a slice of any vertex
/// type that implements [`DecodePosition`].
pub fn compute_cluster_bounds_decoder<T: DecodePosition>(
    indices: &[u32],
    vertices: &[T],
) -> Result<Bounds> {
    if indices.is_empty() {
        return Err(Error::EmptyMesh("no indices"));
    }
    if indices.len() % 3 != 0 {
        return Err(Error::invalid_dynamic(format!(
            "index count ({}) must be a multiple of 3",
            indices.len()
        )));
    }
    let corners = indices
        .iter()
        .map(|&index| {
            vertices
                .get(index as usize)
                .map(|vertex| vertex.decode_position())
                .ok_or_else(|| {
                    Error::invalid_dynamic(format!(
                        "index value ({}) out of range of vertex count ({})",
                        index,
                        vertices.len()
                    ))
                })
        })
        .collect::<Result<Vec<[f32; 3]>>>()?;
    Ok(cluster_bounds_from_corners(&corners))
}

/// Creates bounding volumes for one built meshlet by resolving its local
/// triangle references back to global vertex ids first.
pub fn compute_meshlet_bounds(
    meshlet: Meshlet<'_>,
    vertices: &VertexDataAdapter<'_>,
) -> Result<Bounds> {
    let indices = meshlet.resolve_global_indices();
    compute_cluster_bounds(&indices, vertices)
}

/// Same as [`compute_meshlet_bounds`], but accepts a slice of any vertex
/// type that implements [`DecodePosition`].
pub fn compute_meshlet_bounds_decoder<T: DecodePosition>(
    meshlet: Meshlet<'_>,
    vertices: &[T],
) -> Result<Bounds> {
    let indices = meshlet.resolve_global_indices();
    compute_cluster_bounds_decoder(&indices, vertices)
}
