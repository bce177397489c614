use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::PaletteIoError;
use crate::models::{Palette, PaletteRecord};

const PALETTE_SUFFIX: &str = ".palette.json";

/// Path of the palette file for `name` inside `dir`.
pub fn palette_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}{PALETTE_SUFFIX}"))
}

/// Write `record` as pretty JSON to `<dir>/<name>.palette.json`.
pub fn write_palette(record: &PaletteRecord, dir: &Path, name: &str) -> Result<PathBuf, PaletteIoError> {
    let path = palette_path(dir, name);
    let json = serde_json::to_string_pretty(record).map_err(|source| PaletteIoError::Json {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, json).map_err(|source| PaletteIoError::Io {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), colors = record.colors.len(), "Wrote palette");
    Ok(path)
}

pub fn read_record(path: &Path) -> Result<PaletteRecord, PaletteIoError> {
    let content = std::fs::read_to_string(path).map_err(|source| PaletteIoError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| PaletteIoError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Read one palette file.
///
/// Colors are rebuilt from their stored sRGB values. The stored hex must
/// still parse so hand-edited files with broken colors are caught.
pub fn read_palette(path: &Path) -> Result<Palette, PaletteIoError> {
    let record = read_record(path)?;
    for color in &record.colors {
        color
            .hex
            .parse::<perceptual_color::Srgb>()
            .map_err(|source| PaletteIoError::Color {
                hex: color.hex.clone(),
                source,
            })?;
    }
    Ok(record.to_palette())
}

/// Every `*.palette.json` directly inside `dir`, keyed by name.
pub fn read_palettes_in_dir(dir: &Path) -> Result<BTreeMap<String, Palette>, PaletteIoError> {
    let entries = std::fs::read_dir(dir).map_err(|source| PaletteIoError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut palettes = BTreeMap::new();
    for entry in entries {
        let path = entry
            .map_err(|source| PaletteIoError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        let Some(name) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(PALETTE_SUFFIX))
        else {
            continue;
        };
        let name = name.to_string();
        palettes.insert(name, read_palette(&path)?);
    }
    Ok(palettes)
}

/// All colors of several palette files, in file order.
pub fn read_palettes(paths: &[PathBuf]) -> Result<Palette, PaletteIoError> {
    let mut colors = Vec::new();
    for path in paths {
        colors.extend(read_palette(path)?.iter().copied());
    }
    Ok(Palette::new(colors))
}
