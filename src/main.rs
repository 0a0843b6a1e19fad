use std::process::ExitCode;

use glam::Vec3;
use tracing::{error, info, warn};

use voxel_landscape::{generate_world, logging, model::CHUNK_SIZE, TextureIndexes, WorldConfig};

fn main() -> ExitCode {
    logging::init();

    let config = match WorldConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    info!(?config, "starting");

    let mut world = generate_world(&config);

    // slots of the demo texture array
    let textures: TextureIndexes = [("Grass", 0), ("Dirt", 1), ("Stones", 2)].into_iter().collect();
    let summary = world.rebuild_all(&textures);
    info!(
        chunks = summary.chunks,
        faces = summary.faces,
        triangles = summary.faces * 2,
        colliders = summary.colliders,
        "landscape built"
    );

    let unmapped: usize = world
        .chunks()
        .filter_map(|c| c.mesh())
        .map(|m| m.unmapped_block_types.len())
        .sum();
    if unmapped > 0 {
        warn!(unmapped, "some block types had no texture slot");
    }

    // drop a ray onto the middle of the world
    let [sx, sy, sz] = config.extents;
    let origin = config.origin.to_world_coord();
    let size = CHUNK_SIZE as f32;
    let top = origin.1 as f32 + sy as f32 * size + 1.0;
    let start = Vec3::new(
        origin.0 as f32 + sx as f32 * size / 2.0 + 0.5,
        top,
        origin.2 as f32 + sz as f32 * size / 2.0 + 0.5,
    );
    match world.raycast(start, Vec3::NEG_Y, top - origin.1 as f32 + 1.0) {
        Some(hit) => info!(point = ?hit.point, chunk = ?hit.chunk, "ground below world centre"),
        None => warn!(?start, "no ground below world centre"),
    }

    let local_x = sx * CHUNK_SIZE / 2;
    let local_z = sz * CHUNK_SIZE / 2;
    info!(height = world.get_height_at(local_x, local_z), "terrain height at world centre");

    ExitCode::SUCCESS
}
