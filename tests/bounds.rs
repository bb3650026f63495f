use meshletize::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn adapter(positions: &[[f32; 3]]) -> VertexDataAdapter<'_> {
    VertexDataAdapter::new(typed_to_bytes(positions), 12, 0).unwrap()
}

fn assert_contains_corners(bounds: &Bounds, positions: &[[f32; 3]], indices: &[u32]) {
    for &index in indices {
        let p = positions[index as usize];
        let dx = p[0] - bounds.center[0];
        let dy = p[1] - bounds.center[1];
        let dz = p[2] - bounds.center[2];
        let distance = (dx * dx + dy * dy + dz * dz).sqrt();
        assert!(
            distance <= bounds.radius + 1e-4,
            "point {:?} outside sphere (center {:?}, radius {})",
            p,
            bounds.center,
            bounds.radius
        );
    }
}

#[test]
fn flat_triangle_cone() {
    let positions = [[0f32, 0f32, 0f32], [1f32, 0f32, 0f32], [0f32, 1f32, 0f32]];
    let indices = [0u32, 1, 2];

    let bounds = compute_cluster_bounds(&indices, &adapter(&positions)).unwrap();

    assert_contains_corners(&bounds, &positions, &indices);
    // a single flat triangle has zero normal spread
    assert!(bounds.cone_axis[2] > 0.99);
    assert!(bounds.cone_cutoff < 1e-3);
    assert_eq!(bounds.cone_axis_s8, [0, 0, 127]);
}

#[test]
fn flat_cluster_cone_stays_tight() {
    // a 4x4 grid in the XY plane, all face normals +Z
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for y in 0..5u32 {
        for x in 0..5u32 {
            positions.push([x as f32, y as f32, 0f32]);
        }
    }
    for y in 0..4u32 {
        for x in 0..4u32 {
            indices.extend_from_slice(&[
                y * 5 + x,
                y * 5 + x + 1,
                (y + 1) * 5 + x,
                (y + 1) * 5 + x,
                y * 5 + x + 1,
                (y + 1) * 5 + x + 1,
            ]);
        }
    }

    let bounds = compute_cluster_bounds(&indices, &adapter(&positions)).unwrap();

    assert_contains_corners(&bounds, &positions, &indices);
    assert!(bounds.cone_axis[2] > 0.99);
    assert!(bounds.cone_cutoff < 1e-3);
    // the apex sits on or behind every triangle plane
    assert!(bounds.cone_apex[2] <= 1e-4);
}

#[test]
fn degenerate_cluster_culls_nothing() {
    let positions = [[1f32, 2f32, 3f32]];
    let indices = [0u32, 0, 0];

    let bounds = compute_cluster_bounds(&indices, &adapter(&positions)).unwrap();

    assert_eq!(bounds.cone_cutoff, 1.0);
}

#[test]
fn opposing_normals_cull_nothing() {
    let positions = [[0f32, 0f32, 0f32], [1f32, 0f32, 0f32], [0f32, 1f32, 0f32]];
    // same triangle wound both ways
    let indices = [0u32, 1, 2, 0, 2, 1];

    let bounds = compute_cluster_bounds(&indices, &adapter(&positions)).unwrap();

    assert_eq!(bounds.cone_cutoff, 1.0);
}

#[test]
fn sphere_contains_random_clusters() {
    let mut rng = StdRng::seed_from_u64(0x626e_6473);

    for _ in 0..8 {
        let positions: Vec<[f32; 3]> = (0..50)
            .map(|_| {
                [
                    rng.gen_range(-10f32..10f32),
                    rng.gen_range(-10f32..10f32),
                    rng.gen_range(-10f32..10f32),
                ]
            })
            .collect();
        let indices: Vec<u32> = (0..30 * 3).map(|_| rng.gen_range(0..50u32)).collect();

        let bounds = compute_cluster_bounds(&indices, &adapter(&positions)).unwrap();

        assert_contains_corners(&bounds, &positions, &indices);
        assert!(bounds.cone_cutoff >= 0.0 && bounds.cone_cutoff <= 1.0);
    }
}

#[test]
fn quantized_cutoff_is_conservative() {
    let mut rng = StdRng::seed_from_u64(0x636f_6e65);

    for _ in 0..8 {
        let positions: Vec<[f32; 3]> = (0..12)
            .map(|_| {
                [
                    rng.gen_range(-1f32..1f32),
                    rng.gen_range(-1f32..1f32),
                    rng.gen_range(-1f32..1f32),
                ]
            })
            .collect();
        let indices: Vec<u32> = (0..4 * 3).map(|_| rng.gen_range(0..12u32)).collect();

        let bounds = compute_cluster_bounds(&indices, &adapter(&positions)).unwrap();

        if bounds.cone_cutoff_s8 < 127 {
            assert!(f32::from(bounds.cone_cutoff_s8) / 127.0 >= bounds.cone_cutoff);
        }
        for axis in 0..3 {
            assert!((f32::from(bounds.cone_axis_s8[axis]) / 127.0 - bounds.cone_axis[axis]).abs() < 0.01);
        }
    }
}

#[test]
fn meshlet_bounds_match_cluster_bounds() {
    let positions = [
        [0f32, 0f32, 0f32],
        [1f32, 0f32, 0f32],
        [1f32, 1f32, 0f32],
        [0f32, 1f32, 0f32],
    ];
    let indices = [0u32, 1, 2, 0, 2, 3];
    let vertices = adapter(&positions);

    let collection = build_meshlets(&indices, &vertices, 64, 124).unwrap();
    let meshlet = collection.get(0);

    let from_meshlet = compute_meshlet_bounds(meshlet, &vertices).unwrap();
    let from_indices =
        compute_cluster_bounds(&meshlet.resolve_global_indices(), &vertices).unwrap();

    assert_eq!(from_meshlet, from_indices);
}

#[test]
fn decoder_variants_agree() {
    let positions = [[0f32, 0f32, 0f32], [2f32, 0f32, 0f32], [0f32, 2f32, 0f32]];
    let indices = [0u32, 1, 2];

    let from_adapter = compute_cluster_bounds(&indices, &adapter(&positions)).unwrap();
    let from_decoder = compute_cluster_bounds_decoder(&indices, &positions).unwrap();

    assert_eq!(from_adapter, from_decoder);
}

#[test]
fn rejects_bad_input() {
    let positions = [[0f32; 3]; 3];

    let empty = compute_cluster_bounds(&[], &adapter(&positions));
    assert!(matches!(empty, Err(Error::EmptyMesh(_))));

    let unaligned = compute_cluster_bounds(&[0, 1], &adapter(&positions));
    assert!(matches!(unaligned, Err(Error::InvalidMesh(_))));

    let out_of_range = compute_cluster_bounds_decoder(&[0, 1, 3], &positions);
    assert!(matches!(out_of_range, Err(Error::InvalidMesh(_))));
}

#[test]
fn per_meshlet_bounds_on_built_mesh() {
    let mut positions = Vec::new();
    let mut indices = Vec::new();
    for y in 0..17u32 {
        for x in 0..17u32 {
            positions.push([x as f32, y as f32, ((x + y) % 3) as f32 * 0.1]);
        }
    }
    for y in 0..16u32 {
        for x in 0..16u32 {
            indices.extend_from_slice(&[
                y * 17 + x,
                y * 17 + x + 1,
                (y + 1) * 17 + x,
                (y + 1) * 17 + x,
                y * 17 + x + 1,
                (y + 1) * 17 + x + 1,
            ]);
        }
    }
    let vertices = adapter(&positions);

    let collection = build_meshlets(&indices, &vertices, 64, 124).unwrap();
    for meshlet in collection.iter() {
        let bounds = compute_meshlet_bounds(meshlet, &vertices).unwrap();
        assert_contains_corners(&bounds, &positions, &meshlet.resolve_global_indices());
        // near-flat grid, so every meshlet cone should be usable
        assert!(bounds.cone_cutoff < 1.0);
    }
}
