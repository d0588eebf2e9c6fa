//! Headless driver for the 2D batch renderer.
//!
//! `nabu-studio [frames] [--null]` renders an animated scene for `frames`
//! frames (default 120) and logs per-frame statistics.

mod scene;

use anyhow::{bail, Result};

use nabu_engine::device::{create_device, Backend, GraphicsDevice};
use nabu_engine::device::gpu::{WgpuDevice, WgpuInit};
use nabu_engine::logging::{init_logging, LoggingConfig};
use nabu_engine::render::{FrameStatus, RenderContext2D, Renderer2DConfig};

use scene::Assets;

struct Args {
    frames: u64,
    backend: Backend,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self> {
        let mut out = Args {
            frames: 120,
            backend: Backend::Wgpu,
        };
        for arg in args {
            match arg.as_str() {
                "--null" => out.backend = Backend::Null,
                s => match s.parse() {
                    Ok(n) => out.frames = n,
                    Err(_) => bail!("usage: nabu-studio [frames] [--null] (unexpected {s:?})"),
                },
            }
        }
        Ok(out)
    }
}

/// Creates the device and registers the scene's textures.
///
/// Falls back to the null backend when no adapter is available.
async fn open_device(backend: Backend, init: WgpuInit) -> Result<(Box<dyn GraphicsDevice>, Assets)> {
    if backend == Backend::Wgpu {
        match WgpuDevice::new_headless(init.clone()).await {
            Ok(mut device) => {
                let assets = Assets::register(&mut device)?;
                return Ok((Box::new(device), assets));
            }
            Err(e) => log::warn!("wgpu unavailable ({e:#}); using the null backend"),
        }
    }

    let device = create_device(Backend::Null, init).await?;
    Ok((device, Assets::placeholder()))
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let args = Args::parse(std::env::args().skip(1))?;
    let init = WgpuInit::default();
    let (width, height) = (init.width as f32, init.height as f32);

    let (mut device, mut assets) = pollster::block_on(open_device(args.backend, init.clone()))?;
    let mut ctx = RenderContext2D::new(Renderer2DConfig::default());

    let mut failed = 0u64;
    for frame in 0..args.frames {
        if let Err(e) = ctx.begin_frame(&mut device) {
            log::error!("frame {frame}: {e}; recreating device");
            (device, assets) = pollster::block_on(open_device(args.backend, init.clone()))?;
            ctx.discard_fences();
            failed += 1;
            continue;
        }

        scene::draw(&mut ctx, &assets, frame, width, height);

        match ctx.flush(&mut device) {
            FrameStatus::Completed(stats) => {
                if frame % 30 == 0 {
                    log::info!(
                        "frame {frame}: {} draws, {} binds, {} vertices, {} indices",
                        stats.draw_calls,
                        stats.state_binds,
                        stats.vertices,
                        stats.indices
                    );
                }
            }
            FrameStatus::Failed { error, dropped_commands, .. } => {
                log::warn!("frame {frame} failed ({error}), {dropped_commands} commands dropped; recreating device");
                (device, assets) = pollster::block_on(open_device(args.backend, init.clone()))?;
                ctx.discard_fences();
                failed += 1;
            }
        }
    }

    log::info!("{} frames rendered, {failed} failed", args.frames);
    Ok(())
}
