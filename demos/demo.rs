use meshletize::{
    analyze_meshlets, build_meshlets_decoder, compute_meshlet_bounds_decoder, meshlet_debug_color,
};

use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "demo",
    about = "Builds meshlets from an OBJ mesh and prints cluster statistics"
)]
struct Opt {
    /// OBJ file to cluster
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Maximum unique vertices per meshlet
    #[structopt(long, default_value = "64")]
    max_vertices: usize,

    /// Maximum triangles per meshlet
    #[structopt(long, default_value = "124")]
    max_triangles: usize,
}

fn main() {
    let opt = Opt::from_args();

    let load_options = tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    };
    let (models, _) = tobj::load_obj(&opt.input, &load_options).expect("failed to load OBJ");

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    for model in &models {
        let base = positions.len() as u32;
        for position in model.mesh.positions.chunks_exact(3) {
            positions.push([position[0], position[1], position[2]]);
        }
        indices.extend(model.mesh.indices.iter().map(|&index| base + index));
    }

    println!(
        "# {:?}: {} vertices, {} triangles",
        opt.input,
        positions.len(),
        indices.len() / 3
    );

    let meshlets =
        build_meshlets_decoder(&indices, &positions, opt.max_vertices, opt.max_triangles)
            .expect("meshlet build failed");
    let stats = analyze_meshlets(&meshlets, positions.len());

    println!(
        "meshlets: {}, vertex refs: {}, triangles: {}",
        stats.meshlet_count, stats.vertex_refs, stats.triangle_count
    );
    println!(
        "avg vertices: {:.1}/{}  avg triangles: {:.1}/{}  duplication: {:.2}",
        stats.avg_vertices,
        opt.max_vertices,
        stats.avg_triangles,
        opt.max_triangles,
        stats.duplication
    );

    for (index, meshlet) in meshlets.iter().enumerate().take(8) {
        let bounds = compute_meshlet_bounds_decoder(meshlet, &positions)
            .expect("failed to compute meshlet bounds");
        let color = meshlet_debug_color(index);
        println!(
            "meshlet {}: {} vertices, {} triangles, center ({:.2} {:.2} {:.2}), radius {:.2}, cone cutoff {:.2}, color ({:.2} {:.2} {:.2})",
            index,
            meshlet.vertices.len(),
            meshlet.triangle_count(),
            bounds.center[0],
            bounds.center[1],
            bounds.center[2],
            bounds.radius,
            bounds.cone_cutoff,
            color[0],
            color[1],
            color[2]
        );
    }
    if meshlets.len() > 8 {
        println!("... {} more", meshlets.len() - 8);
    }
}
