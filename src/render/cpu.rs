use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    document::model::{Document, ImageLayer, Layer, LayerContent, SolidLayer, TextLayer},
    foundation::{
        core::{Rgba8Premul, normalize_rel_path},
        error::{StampError, StampResult},
    },
    render::{
        FrameRGBA,
        decode::decode_image,
        text::{TextBrushRgba8, TextLayoutEngine},
    },
};

#[derive(Clone)]
struct ImagePaint {
    paint: vello_cpu::Image,
    w: u32,
    h: u32,
}

#[derive(Clone)]
struct FontCache {
    font: vello_cpu::peniko::FontData,
    family: String,
}

/// Flattens a [`Document`] into a premultiplied RGBA8 frame.
///
/// Fonts and images are loaded from `assets_root` on first use and cached by normalized path,
/// so rendering the same document repeatedly only re-shapes text.
pub struct CpuRenderer {
    assets_root: PathBuf,
    ctx: Option<vello_cpu::RenderContext>,
    text_engine: TextLayoutEngine,
    fonts: HashMap<String, FontCache>,
    images: HashMap<String, ImagePaint>,
}

impl CpuRenderer {
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            assets_root: assets_root.into(),
            ctx: None,
            text_engine: TextLayoutEngine::new(),
            fonts: HashMap::new(),
            images: HashMap::new(),
        }
    }

    #[tracing::instrument(skip_all, fields(width = doc.canvas.width, height = doc.canvas.height))]
    pub fn render(&mut self, doc: &Document) -> StampResult<FrameRGBA> {
        doc.canvas.validate()?;
        let w: u16 = doc
            .canvas
            .width
            .try_into()
            .map_err(|_| StampError::render("canvas width exceeds u16"))?;
        let h: u16 = doc
            .canvas
            .height
            .try_into()
            .map_err(|_| StampError::render("canvas height exceeds u16"))?;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();

        let background = doc
            .background
            .map(|c| c.to_rgba8_premul())
            .unwrap_or_else(Rgba8Premul::white);
        ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(premul_to_color(background));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w as f64, h as f64));

        let drawn = self.draw_layers(&doc.layers, doc, &mut ctx);
        let out = drawn.map(|()| {
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.render_to_pixmap(&mut pixmap);
            FrameRGBA {
                width: doc.canvas.width,
                height: doc.canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            }
        });
        self.ctx = Some(ctx);
        out
    }

    fn draw_layers(
        &mut self,
        layers: &[Layer],
        doc: &Document,
        ctx: &mut vello_cpu::RenderContext,
    ) -> StampResult<()> {
        for layer in layers.iter().filter(|l| l.visible) {
            let opacity = layer.opacity.clamp(0.0, 1.0) as f32;
            if opacity <= 0.0 {
                continue;
            }
            if opacity < 1.0 {
                ctx.push_opacity_layer(opacity);
            }
            let drawn = match &layer.content {
                LayerContent::Solid(s) => {
                    self.draw_solid(s, doc, ctx);
                    Ok(())
                }
                LayerContent::Image(i) => self.draw_image(i, ctx),
                LayerContent::Text(t) => self.draw_text(t, ctx),
                LayerContent::Group(g) => self.draw_layers(&g.layers, doc, ctx),
            };
            if opacity < 1.0 {
                ctx.pop_layer();
            }
            drawn.map_err(|e| match e {
                StampError::Render(msg) => {
                    StampError::render(format!("layer '{}': {msg}", layer.name))
                }
                other => other,
            })?;
        }
        Ok(())
    }

    fn draw_solid(&self, s: &SolidLayer, doc: &Document, ctx: &mut vello_cpu::RenderContext) {
        let rect = match s.rect {
            Some(r) => vello_cpu::kurbo::Rect::new(r.x, r.y, r.x + r.width, r.y + r.height),
            None => vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                doc.canvas.width as f64,
                doc.canvas.height as f64,
            ),
        };
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(premul_to_color(s.color.to_rgba8_premul()));
        ctx.fill_rect(&rect);
    }

    fn draw_image(
        &mut self,
        layer: &ImageLayer,
        ctx: &mut vello_cpu::RenderContext,
    ) -> StampResult<()> {
        let p = self.image_paint_for(&layer.source)?;
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((layer.x, layer.y)));
        ctx.set_paint(p.paint);
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0, 0.0, p.w as f64, p.h as f64,
        ));
        Ok(())
    }

    fn draw_text(
        &mut self,
        layer: &TextLayer,
        ctx: &mut vello_cpu::RenderContext,
    ) -> StampResult<()> {
        let font = self.font_for(&layer.font_source)?;
        let layout = self.text_engine.layout_plain(
            &layer.text,
            &font.family,
            layer.size_px as f32,
            TextBrushRgba8::from(layer.color.to_rgba8()),
            layer.max_width_px.map(|v| v as f32),
        )?;

        ctx.set_transform(vello_cpu::kurbo::Affine::translate((layer.x, layer.y)));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                // Positioned glyphs carry the line baseline, so (x, y) is the top of the block.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(())
    }

    fn read_bytes(&self, rel: &str) -> StampResult<(String, Vec<u8>)> {
        let norm = normalize_rel_path(rel)?;
        let p = self.assets_root.join(Path::new(&norm));
        let bytes = std::fs::read(&p).map_err(|e| {
            StampError::render(format!("failed to read asset '{}': {e}", p.display()))
        })?;
        Ok((norm, bytes))
    }

    fn font_for(&mut self, source: &str) -> StampResult<FontCache> {
        let key = normalize_rel_path(source)?;
        if let Some(f) = self.fonts.get(&key) {
            return Ok(f.clone());
        }
        let (key, bytes) = self.read_bytes(source)?;
        let family = self.text_engine.register_font(&bytes)?;
        tracing::debug!(font = %key, family = %family, "loaded font");
        let out = FontCache {
            font: vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0),
            family,
        };
        self.fonts.insert(key, out.clone());
        Ok(out)
    }

    fn image_paint_for(&mut self, source: &str) -> StampResult<ImagePaint> {
        let key = normalize_rel_path(source)?;
        if let Some(p) = self.images.get(&key) {
            return Ok(p.clone());
        }
        let (key, bytes) = self.read_bytes(source)?;
        let prepared = decode_image(&bytes)?;
        let pixmap =
            pixmap_from_premul_bytes(&prepared.rgba8_premul, prepared.width, prepared.height)?;
        let out = ImagePaint {
            paint: vello_cpu::Image {
                image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
                sampler: vello_cpu::peniko::ImageSampler::default(),
            },
            w: prepared.width,
            h: prepared.height,
        };
        tracing::debug!(image = %key, width = out.w, height = out.h, "loaded image");
        self.images.insert(key, out.clone());
        Ok(out)
    }
}

fn premul_to_color(c: Rgba8Premul) -> vello_cpu::peniko::Color {
    let mut px = c.to_array();
    crate::render::decode::unpremultiply_rgba8_in_place(&mut px);
    vello_cpu::peniko::Color::from_rgba8(px[0], px[1], px[2], px[3])
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> StampResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StampError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StampError::render("image height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(StampError::render("image byte len mismatch"));
    }
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}
