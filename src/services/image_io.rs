use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

use perceptual_color::Srgb;

use crate::error::ImageError;
use crate::models::PixelGrid;

/// Decode an image file into a pixel grid.
///
/// PNG goes through [`load_png`]; JPEG and BMP are decoded with the `image`
/// crate, with transparency composited against white as for PNG.
pub fn load_image(path: &Path) -> Result<PixelGrid, ImageError> {
    let is_png = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        return load_png(path);
    }

    let decoded = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba
        .pixels()
        .map(|p| {
            let [r, g, b, a] = p.0;
            over_white(r, g, b, a)
        })
        .collect();
    let grid = PixelGrid::new(width, height, pixels)?;
    tracing::debug!(path = %path.display(), width, height, "Decoded image");
    Ok(grid)
}

/// Decode a PNG file into a pixel grid.
pub fn load_png(path: &Path) -> Result<PixelGrid, ImageError> {
    let file = File::open(path)?;
    let grid = decode_png(BufReader::new(file))?;
    tracing::debug!(
        path = %path.display(),
        width = grid.width(),
        height = grid.height(),
        "Decoded PNG"
    );
    Ok(grid)
}

/// Decode PNG data of any color type and bit depth.
///
/// Palette and low bit depth images are expanded, 16-bit channels are
/// reduced to 8 bits and transparency is composited against white.
pub fn decode_png<R: Read>(reader: R) -> Result<PixelGrid, ImageError> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let data = &buf[..info.buffer_size()];

    if info.bit_depth != png::BitDepth::Eight {
        return Err(ImageError::UnsupportedLayout(format!(
            "{:?} bit samples",
            info.bit_depth
        )));
    }

    let pixels: Vec<Srgb> = match info.color_type {
        png::ColorType::Rgb => data
            .chunks_exact(3)
            .map(|p| Srgb::from_u8(p[0], p[1], p[2]))
            .collect(),
        png::ColorType::Rgba => data
            .chunks_exact(4)
            .map(|p| over_white(p[0], p[1], p[2], p[3]))
            .collect(),
        png::ColorType::Grayscale => data.iter().map(|&v| Srgb::from_u8(v, v, v)).collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .map(|p| over_white(p[0], p[0], p[0], p[1]))
            .collect(),
        png::ColorType::Indexed => {
            return Err(ImageError::UnsupportedLayout(
                "indexed color after expansion".to_string(),
            ))
        }
    };

    PixelGrid::new(info.width, info.height, pixels)
}

/// Alpha composite against white.
fn over_white(r: u8, g: u8, b: u8, a: u8) -> Srgb {
    match a {
        255 => Srgb::from_u8(r, g, b),
        0 => Srgb::from_u8(255, 255, 255),
        _ => {
            let af = a as u16;
            let blend = |c: u8| ((c as u16 * af + 255 * (255 - af)) / 255) as u8;
            Srgb::from_u8(blend(r), blend(g), blend(b))
        }
    }
}

/// Encode a grid as an 8-bit RGB PNG.
pub fn encode_png(grid: &PixelGrid) -> Result<Vec<u8>, ImageError> {
    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, grid.width(), grid.height());
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder
            .write_header()
            .map_err(|e| ImageError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(&grid.to_rgb8())
            .map_err(|e| ImageError::PngEncode(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Write a grid as a PNG file, typically the downsampled thumbnail that was
/// analysed.
pub fn write_png(grid: &PixelGrid, path: &Path) -> Result<(), ImageError> {
    let data = encode_png(grid)?;
    std::fs::write(path, data)?;
    Ok(())
}
