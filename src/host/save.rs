use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use image::ImageEncoder as _;

use crate::{
    foundation::error::{StampError, StampResult},
    host::SaveOptions,
    render::{FrameRGBA, decode::unpremultiply_rgba8_in_place},
};

/// Force the lowercase extension of the format onto `path`.
pub fn normalize_extension(path: &Path, opts: &SaveOptions) -> PathBuf {
    path.with_extension(opts.format().extension())
}

/// Encode `frame` and write it to `path` (extension normalized). The parent directory must exist.
pub fn write_frame(frame: &FrameRGBA, path: &Path, opts: &SaveOptions) -> StampResult<PathBuf> {
    let target = normalize_extension(path, opts);
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(StampError::render("frame byte len mismatch"));
    }

    let mut rgba = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut rgba);
    }

    let file = File::create(&target).map_err(|e| StampError::save(&target, e))?;
    let mut out = BufWriter::new(file);
    let encoded = match *opts {
        SaveOptions::Jpeg { quality } => {
            let rgb = flatten_over_white(&rgba);
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
                .write_image(
                    &rgb,
                    frame.width,
                    frame.height,
                    image::ExtendedColorType::Rgb8,
                )
        }
        SaveOptions::Png => image::codecs::png::PngEncoder::new(&mut out).write_image(
            &rgba,
            frame.width,
            frame.height,
            image::ExtendedColorType::Rgba8,
        ),
    };
    encoded.map_err(|e| StampError::save(&target, e))?;
    out.flush().map_err(|e| StampError::save(&target, e))?;

    Ok(target)
}

/// Straight RGBA8 to RGB8 composited over opaque white; JPEG carries no alpha.
fn flatten_over_white(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = px[3] as u32;
        for &c in &px[..3] {
            let v = (c as u32 * a + 255 * (255 - a) + 127) / 255;
            rgb.push(v as u8);
        }
    }
    rgb
}
