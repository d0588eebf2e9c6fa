use std::f32::consts::TAU;

use anyhow::Result;

use nabu_engine::coords::{IRect, Mat3x2, Rect, Vec2};
use nabu_engine::device::TextureHandle;
use nabu_engine::device::gpu::WgpuDevice;
use nabu_engine::paint::Color;
use nabu_engine::render::{
    BlendState, Glyph, LineCap, RasterizerState, RenderContext2D, SamplerState, Vertex2D,
};

const CHECKER_SIZE: u32 = 32;
const PANEL_TARGET: (u32, u32) = (256, 128);

/// Textures the scene samples from.
pub struct Assets {
    checker: TextureHandle,
    panel: TextureHandle,
}

impl Assets {
    pub fn register(device: &mut WgpuDevice) -> Result<Self> {
        let checker = device.insert_texture(CHECKER_SIZE, CHECKER_SIZE, &checkerboard(CHECKER_SIZE, 8))?;
        let panel = device.create_render_target(PANEL_TARGET.0, PANEL_TARGET.1)?;
        Ok(Self { checker, panel })
    }

    /// Handles for backends that accept anything.
    pub fn placeholder() -> Self {
        Self {
            checker: TextureHandle(1),
            panel: TextureHandle(2),
        }
    }
}

fn checkerboard(size: u32, cell: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let v = if (x / cell + y / cell) % 2 == 0 { 230 } else { 40 };
            out.extend_from_slice(&[v, v, v, 255]);
        }
    }
    out
}

/// Draws one frame of the demo scene.
pub fn draw(ctx: &mut RenderContext2D, assets: &Assets, frame: u64, width: f32, height: f32) {
    let t = frame as f32 / 60.0;

    draw_panel(ctx, assets, t);

    // Background bands.
    for i in 0..8 {
        let shade = 0.15 + i as f32 * 0.05;
        ctx.draw_rect(
            Rect::new(0.0, i as f32 * height / 8.0, width, height / 8.0),
            Color::new(shade, shade * 0.9, shade * 1.2, 1.0),
        );
    }

    // Orbiting circles and rings.
    let center = Vec2::new(width * 0.3, height * 0.5);
    for i in 0..12 {
        let a = t + i as f32 / 12.0 * TAU;
        let p = center + Vec2::new(a.cos(), a.sin()) * 160.0;
        ctx.draw_circle(p, 18.0 + (i % 3) as f32 * 6.0, Color::from_u8(255, 120 + i * 10, 60, 220));
    }
    ctx.draw_circle_frame(center, 60.0, 8.0, Color::WHITE, Color::new(0.3, 0.6, 1.0, 1.0));
    ctx.draw_circle_pie(center, 50.0, t, (t * 0.5).sin().abs() * TAU, Color::new(1.0, 0.9, 0.2, 0.8));

    ctx.draw_circle_arc(center, 100.0, 6.0, -t, TAU * 0.3, Color::new(1.0, 0.5, 0.1, 1.0));

    {
        let mut glow = ctx.scoped_blend_state(BlendState::ADDITIVE);
        for i in 0..6 {
            glow.draw_circle(center, 40.0 + i as f32 * 12.0, Color::new(0.2, 0.1, 0.4, 0.15));
        }
    }

    // Translucent ellipses blended with premultiplied alpha.
    {
        let mut tint = ctx.scoped_blend_state(BlendState::PREMULTIPLIED);
        let e = Vec2::new(width * 0.5, height * 0.5);
        let pulse = 0.4 + 0.3 * (t * 2.0).sin();
        tint.draw_ellipse(e, 120.0, 40.0, Color::new(0.2, 0.8, 1.0, 1.0).with_alpha(pulse).premultiplied());
        tint.draw_ellipse_frame(e, 120.0, 40.0, 3.0, Color::WHITE.premultiplied(), Color::TRANSPARENT);
    }

    // Rotating card.
    {
        let spin = Mat3x2::rotate_at(t, Vec2::new(width * 0.7, height * 0.3));
        let mut card = ctx.scoped_transform(spin);
        card.draw_round_rect(Rect::new(width * 0.7 - 90.0, height * 0.3 - 50.0, 180.0, 100.0), 16.0, Color::WHITE);
        card.draw_rect_frame(Rect::new(width * 0.7 - 90.0, height * 0.3 - 50.0, 180.0, 100.0), 3.0, Color::BLACK);
    }

    // Lines and curves.
    let wave: Vec<Vec2> = (0..=48)
        .map(|i| {
            let x = 40.0 + i as f32 * (width - 80.0) / 48.0;
            Vec2::new(x, height - 80.0 + (x * 0.02 + t * 3.0).sin() * 30.0)
        })
        .collect();
    ctx.draw_polyline(&wave, 4.0, Color::new(0.4, 1.0, 0.6, 1.0), false, LineCap::Round);
    ctx.draw_line(Vec2::new(40.0, 40.0), Vec2::new(width - 40.0, 40.0), 2.0, Color::WHITE, LineCap::Square);
    ctx.draw_cubic_bezier(
        [
            Vec2::new(width * 0.55, height * 0.9),
            Vec2::new(width * 0.6, height * 0.5),
            Vec2::new(width * 0.9, height * (0.7 + 0.2 * t.sin())),
            Vec2::new(width * 0.95, height * 0.55),
        ],
        3.0,
        Color::new(1.0, 0.4, 0.7, 1.0),
    );
    ctx.draw_quadratic_bezier(
        [Vec2::new(width * 0.5, 60.0), Vec2::new(width * 0.6, 200.0), Vec2::new(width * 0.7, 60.0)],
        2.0,
        Color::new(0.9, 0.9, 0.3, 1.0),
    );

    // Textured panel (the render target filled above) inside a clipped region.
    {
        let mut clip = ctx.scoped_rasterizer_state(RasterizerState::SCISSOR_2D);
        let mut clip = clip.scoped_scissor_rect(Some(IRect::new(40, 80, 300, 160)));
        clip.draw_textured_rect(assets.panel, Rect::new(40.0, 80.0, 256.0, 128.0), Rect::UNIT, Color::WHITE);
    }

    // Checkerboard tiles sampled as glyphs.
    let glyphs: Vec<Glyph> = (0..8)
        .map(|i| {
            let uv = Rect::new((i % 4) as f32 * 0.25, (i / 4) as f32 * 0.25, 0.25, 0.25);
            Glyph::new(Rect::new(i as f32 * 20.0, 0.0, 16.0, 16.0), uv)
        })
        .collect();
    {
        let mut nearest = ctx.scoped_sampler_state(0, SamplerState::CLAMP_NEAREST);
        nearest.draw_glyph_run(assets.checker, Vec2::new(40.0, height - 40.0), &glyphs, Color::WHITE);
    }

    // Checker medallion and a gradient sprite.
    ctx.draw_textured_circle(assets.checker, Vec2::new(width - 80.0, height - 80.0), 48.0, Rect::UNIT, Color::WHITE);
    ctx.draw_textured_sprite(assets.checker, &fan_sprite(Vec2::new(width - 200.0, 120.0), 50.0, t), &FAN_INDICES);
}

const FAN_INDICES: [u32; 9] = [0, 1, 2, 0, 2, 3, 0, 3, 4];

/// Four-blade sprite around `center` with per-vertex colors and UVs.
fn fan_sprite(center: Vec2, radius: f32, t: f32) -> [Vertex2D; 5] {
    let mut out = [Vertex2D::new(center, Vec2::new(0.5, 0.5), Color::WHITE); 5];
    for (i, v) in out[1..].iter_mut().enumerate() {
        let a = t + i as f32 * TAU / 8.0;
        let dir = Vec2::new(a.cos(), a.sin());
        let hue = i as f32 / 4.0;
        *v = Vertex2D::new(
            center + dir * radius,
            Vec2::new(0.5, 0.5) + dir * 0.5,
            Color::new(1.0 - hue, 0.4, hue, 1.0),
        );
    }
    out
}

/// Renders the checkerboard into the offscreen panel target.
fn draw_panel(ctx: &mut RenderContext2D, assets: &Assets, t: f32) {
    let mut target = ctx.scoped_render_target(Some(assets.panel));
    let mut target = target.scoped_sampler_state(0, SamplerState::REPEAT_LINEAR);
    let scroll = t * 0.25;
    target.draw_textured_rect(
        assets.checker,
        Rect::new(0.0, 0.0, PANEL_TARGET.0 as f32, PANEL_TARGET.1 as f32),
        Rect::new(scroll, 0.0, 4.0, 2.0),
        Color::WHITE,
    );
    target.draw_circle(Vec2::new(128.0, 64.0), 40.0, Color::new(0.9, 0.2, 0.2, 0.8));
}
