//! Headless streaming demo
//!
//! Walks a viewpoint across noise terrain and prints what the render side
//! receives. No window or GPU is involved; a thread stands in for the
//! renderer and drains the command channel.

use anyhow::Context;
use cgmath::Point3;
use hearth_stream::{
    camera::{create_shared_viewpoint, move_viewpoint},
    world::{log_world_stats, StreamingScheduler},
    ChannelRenderSink, RenderCommand, StreamingConfig,
};
use std::sync::Arc;
use std::thread;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => StreamingConfig::load(path.as_ref()).context("loading streaming config")?,
        None => StreamingConfig::default(),
    };
    let tick_interval = config.tick_interval();
    let chunk_size = config.chunk_size as f32;

    let viewpoint = create_shared_viewpoint(Point3::new(0.0, 40.0, 0.0));
    let (sink, commands) = ChannelRenderSink::unbounded();

    let renderer = thread::Builder::new()
        .name("render-drain".to_string())
        .spawn(move || {
            let mut uploads = 0usize;
            let mut removals = 0usize;
            let mut faces = 0usize;
            let mut bytes = 0usize;
            for command in commands {
                match command {
                    RenderCommand::Upload { mesh, .. } => {
                        uploads += 1;
                        faces += mesh.face_count();
                        // What a GPU upload of this chunk would copy
                        bytes += mesh.position_bytes().len()
                            + mesh.uv_bytes().len()
                            + mesh.index_bytes().len();
                    }
                    RenderCommand::Remove { .. } => removals += 1,
                }
            }
            (uploads, removals, faces, bytes)
        })
        .context("spawning render thread")?;

    let mut scheduler =
        StreamingScheduler::with_defaults(config, Arc::new(viewpoint.clone()), Box::new(sink))
            .context("creating streaming scheduler")?;

    // Walk along +x, one chunk every 20 ticks
    for step in 0..200u32 {
        let x = (step / 20) as f32 * chunk_size;
        move_viewpoint(&viewpoint, Point3::new(x, 40.0, 0.0));

        let stats = scheduler.tick()?;
        if step % 20 == 19 {
            println!(
                "tick {:>4}: resident {:>4}, visible {:>4}, evicted {:>3}",
                stats.tick, stats.resident, stats.visible, stats.evicted
            );
        }
        thread::sleep(tick_interval);
    }

    log_world_stats(scheduler.stores());
    let terrain = scheduler.terrain_stats();
    let mesh = scheduler.mesh_stats();
    println!(
        "terrain jobs: {} ok, {} failed | mesh jobs: {} ok, {} failed",
        terrain.processed, terrain.failed, mesh.processed, mesh.failed
    );

    scheduler.shutdown();
    // Dropping the scheduler drops the sink and closes the channel
    drop(scheduler);

    let (uploads, removals, faces, bytes) = renderer
        .join()
        .map_err(|_| anyhow::anyhow!("render thread panicked"))?;
    println!(
        "render side: {} uploads, {} removals, {} faces, {} KiB of vertex data",
        uploads,
        removals,
        faces,
        bytes / 1024
    );
    Ok(())
}
