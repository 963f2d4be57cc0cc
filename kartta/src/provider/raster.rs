use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{DynamicImage, GenericImageView};
use parking_lot::Mutex;

use super::{MapProvider, Metadata, RegistrationContext};
use crate::error::ProviderError;
use crate::map::Map;
use crate::pixel::{PixelBuf, PixelRect};

/// Pixel layout produced by default for a raster map.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8 bit grayscale.
    Luma8,
    /// RGB565, little-endian.
    Rgb565,
    /// 8 bits per channel RGB.
    #[default]
    Rgb8,
    /// 8 bits per channel RGBA.
    Rgba8,
}

impl PixelFormat {
    /// Bits per pixel.
    pub fn bpp(&self) -> u8 {
        match self {
            Self::Luma8 => 8,
            Self::Rgb565 => 16,
            Self::Rgb8 => 24,
            Self::Rgba8 => 32,
        }
    }

    /// Name used in map metadata.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Luma8 => "luma8",
            Self::Rgb565 => "rgb565",
            Self::Rgb8 => "rgb8",
            Self::Rgba8 => "rgba8",
        }
    }
}

impl FromStr for PixelFormat {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "luma8" | "gray8" => Ok(Self::Luma8),
            "rgb565" => Ok(Self::Rgb565),
            "rgb8" | "rgb24" => Ok(Self::Rgb8),
            "rgba8" | "rgba32" => Ok(Self::Rgba8),
            _ => Err(ProviderError::BadMetadata(format!(
                "unknown pixel format '{s}'"
            ))),
        }
    }
}

#[derive(Debug)]
struct RasterMap {
    path: PathBuf,
    format: PixelFormat,
}

/// Provider for maps stored as ordinary image files (PNG, JPEG).
///
/// Recognized metadata keys:
/// * `filename` - path to the image, relative names are resolved against the catalog directory;
/// * `pixel-format` - `rgb8` (default), `rgba8`, `luma8` or `rgb565`;
/// * `datum` - datum name, WGS84 if not given;
/// * `projection` - projection name, `merc` if not given, with its parameters as further keys.
#[derive(Debug, Default)]
pub struct RasterProvider {
    sources: Mutex<HashSet<PathBuf, ahash::RandomState>>,
}

impl RasterProvider {
    /// Name of the provider.
    pub const NAME: &'static str = "raster";

    /// Creates a new provider.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MapProvider for RasterProvider {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn finish(&mut self) {
        self.sources.get_mut().clear();
    }

    fn add_map(
        &self,
        map: &mut Map,
        metadata: &Metadata,
        context: &RegistrationContext<'_>,
    ) -> Result<(), ProviderError> {
        let path = context
            .resolve(metadata.require("filename")?)
            .canonicalize()?;
        let format: PixelFormat = metadata.parse("pixel-format")?.unwrap_or_default();
        let crs = context.crs(metadata)?;

        if self.sources.lock().contains(&path) {
            return Err(ProviderError::DuplicateSource(path.display().to_string()));
        }

        let (width, height) = image::image_dimensions(&path)?;
        map.set_dimensions(width, height);
        map.set_crs(crs)
            .map_err(|err| ProviderError::BadMetadata(err.to_string()))?;

        if !self.sources.lock().insert(path.clone()) {
            return Err(ProviderError::DuplicateSource(path.display().to_string()));
        }
        log::debug!("Added raster map {} ({width}x{height})", path.display());
        map.set_provider_state(RasterMap { path, format });

        Ok(())
    }

    fn get_map_info(&self, map: &Map, base_path: Option<&Path>) -> Result<Metadata, ProviderError> {
        let state = state(map)?;
        let base = base_path
            .map(|base| base.canonicalize().unwrap_or_else(|_| base.to_path_buf()));
        let file_name = base
            .as_deref()
            .and_then(|base| state.path.strip_prefix(base).ok())
            .unwrap_or(state.path.as_path());

        let mut metadata = Metadata::new()
            .with("filename", file_name.to_string_lossy())
            .with("pixel-format", state.format.name());
        metadata.insert_crs(map.crs());

        Ok(metadata)
    }

    fn get_pixels(&self, map: &Map, rect: &PixelRect) -> Result<PixelBuf, ProviderError> {
        let state = state(map)?;
        if !rect.fits_within(map.width(), map.height()) {
            return Err(ProviderError::OutOfBounds {
                rect: *rect,
                width: map.width(),
                height: map.height(),
            });
        }

        let bpp = if rect.bpp == 0 {
            state.format.bpp()
        } else {
            rect.bpp
        };
        let image = image::open(&state.path)?;
        if image.dimensions() != (map.width(), map.height()) {
            return Err(ProviderError::BadMetadata(format!(
                "{} changed size since it was added",
                state.path.display()
            )));
        }

        let part = image.crop_imm(rect.x, rect.y, rect.width, rect.height);
        PixelBuf::new(rect.with_bpp(bpp), encode(&part, bpp)?)
    }

    fn free_map(&self, map: &mut Map) {
        if let Some(state) = map.take_provider_state() {
            if let Ok(state) = state.downcast::<RasterMap>() {
                self.sources.lock().remove(&state.path);
            }
        }
    }
}

fn state(map: &Map) -> Result<&RasterMap, ProviderError> {
    map.provider_state::<RasterMap>().ok_or_else(|| {
        ProviderError::BadMetadata("map was not added by the raster provider".into())
    })
}

fn encode(image: &DynamicImage, bpp: u8) -> Result<Vec<u8>, ProviderError> {
    let bytes = match bpp {
        8 => image.to_luma8().into_raw(),
        16 => image
            .to_rgb8()
            .pixels()
            .flat_map(|p| {
                let [r, g, b] = p.0.map(u16::from);
                (((r >> 3) << 11) | ((g >> 2) << 5) | (b >> 3)).to_le_bytes()
            })
            .collect(),
        24 => image.to_rgb8().into_raw(),
        32 => image.to_rgba8().into_raw(),
        other => return Err(ProviderError::UnsupportedDepth(other)),
    };

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use image::{Rgb, RgbImage};
    use kartta_types::geo::{Datum, DatumTable, GeoArea, ProjectionParams, ProjectionType};
    use kartta_types::latlon;

    fn write_image(dir: &Path, name: &str, width: u32, height: u32) {
        RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 200]))
            .save(dir.join(name))
            .expect("image is written");
    }

    fn new_map() -> Map {
        Map::new(GeoArea::new(latlon!(60.0, 24.0), latlon!(60.5, 25.0)))
    }

    #[test]
    fn add_reads_dimensions_and_crs() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_image(dir.path(), "map.png", 40, 30);
        let datums = DatumTable::standard();
        let context = RegistrationContext {
            datums: &datums,
            base_path: Some(dir.path()),
        };
        let metadata = Metadata::new()
            .with("filename", "map.png")
            .with("datum", "finland hayford")
            .with("projection", "tmerc")
            .with("lon_0", "27")
            .with("x_0", "3500000");

        let provider = RasterProvider::new();
        let mut map = new_map();
        provider
            .add_map(&mut map, &metadata, &context)
            .expect("map is added");

        assert_eq!((map.width(), map.height()), (40, 30));
        assert_eq!(map.datum(), &Datum::FINLAND_HAYFORD);
        assert_eq!(
            map.crs().projection_type(),
            &ProjectionType::TransverseMercator(
                ProjectionParams::DEFAULT
                    .with_central_meridian(27.0)
                    .with_false_easting(3_500_000.0)
            )
        );

        let info = provider
            .get_map_info(&map, Some(dir.path()))
            .expect("info");
        assert_eq!(info.get("filename"), Some("map.png"));
        assert_eq!(info.get("datum"), Some("Finland Hayford"));
        assert_eq!(info.get("projection"), Some("tmerc"));
        assert_eq!(info.get("lon_0"), Some("27"));
    }

    #[test]
    fn duplicate_file_is_rejected_until_freed() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_image(dir.path(), "map.png", 4, 4);
        let datums = DatumTable::standard();
        let context = RegistrationContext {
            datums: &datums,
            base_path: Some(dir.path()),
        };
        let metadata = Metadata::new().with("filename", "map.png");

        let provider = RasterProvider::new();
        let mut first = new_map();
        provider
            .add_map(&mut first, &metadata, &context)
            .expect("first add");
        assert_matches!(
            provider.add_map(&mut new_map(), &metadata, &context),
            Err(ProviderError::DuplicateSource(_))
        );

        provider.free_map(&mut first);
        provider
            .add_map(&mut new_map(), &metadata, &context)
            .expect("added after free");
    }

    #[test]
    fn bad_metadata() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_image(dir.path(), "map.png", 4, 4);
        let datums = DatumTable::standard();
        let context = RegistrationContext {
            datums: &datums,
            base_path: Some(dir.path()),
        };
        let provider = RasterProvider::new();

        assert_matches!(
            provider.add_map(&mut new_map(), &Metadata::new(), &context),
            Err(ProviderError::BadMetadata(_))
        );
        assert_matches!(
            provider.add_map(
                &mut new_map(),
                &Metadata::new()
                    .with("filename", "map.png")
                    .with("datum", "Tokyo"),
                &context
            ),
            Err(ProviderError::BadMetadata(_))
        );
        assert_matches!(
            provider.add_map(
                &mut new_map(),
                &Metadata::new().with("filename", "missing.png"),
                &context
            ),
            Err(ProviderError::Io(_))
        );
    }

    #[test]
    fn get_pixels_crops_and_converts() {
        let dir = tempfile::tempdir().expect("temp dir");
        write_image(dir.path(), "map.png", 16, 8);
        let datums = DatumTable::standard();
        let context = RegistrationContext {
            datums: &datums,
            base_path: Some(dir.path()),
        };
        let provider = RasterProvider::new();
        let mut map = new_map();
        provider
            .add_map(&mut map, &Metadata::new().with("filename", "map.png"), &context)
            .expect("map is added");

        let pixels = provider
            .get_pixels(&map, &PixelRect::new(3, 2, 4, 2))
            .expect("decoded");
        assert_eq!(pixels.bpp(), 24);
        assert_eq!(pixels.bytes().len(), 4 * 2 * 3);
        assert_eq!(pixels.pixel(3, 2), Some(&[3u8, 2, 200][..]));
        assert_eq!(pixels.pixel(6, 3), Some(&[6u8, 3, 200][..]));

        let rgba = provider
            .get_pixels(&map, &PixelRect::new(0, 0, 2, 2).with_bpp(32))
            .expect("decoded");
        assert_eq!(rgba.pixel(1, 1), Some(&[1u8, 1, 200, 255][..]));

        let rgb565 = provider
            .get_pixels(&map, &PixelRect::new(8, 4, 1, 1).with_bpp(16))
            .expect("decoded");
        let value = u16::from_le_bytes([rgb565.bytes()[0], rgb565.bytes()[1]]);
        assert_eq!(value, (1 << 11) | (1 << 5) | (200 >> 3));

        assert_matches!(
            provider.get_pixels(&map, &PixelRect::new(10, 0, 7, 1)),
            Err(ProviderError::OutOfBounds { .. })
        );
        assert_matches!(
            provider.get_pixels(&map, &PixelRect::new(0, 0, 1, 1).with_bpp(12)),
            Err(ProviderError::UnsupportedDepth(12))
        );
    }
}
