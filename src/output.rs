//! Output artifacts: flagged coordinate triples, JSON persistence, and
//! the overlay image.

use crate::config::OutputConfig;
use crate::errors::MappingError;
use crate::session::MappingReport;
use crate::types::{CameraFrame, CoordinateMap, Point};
use image::{Rgb, RgbImage};
use std::fs;
use std::path::{Path, PathBuf};

/// Export map slots as `[x, y, flag]` triples, one per light index.
///
/// Mapped slots carry their coordinate and flag 0. Unmapped slots carry
/// flag 1 and are filled with the smallest detected x and y instead of a
/// sentinel, so a consumer that ignores the flag still sees coordinates
/// inside the strand's bounding box. An all-unmapped map falls back to
/// the origin.
pub fn to_triples(map: &CoordinateMap) -> Vec<[i32; 3]> {
    let default_x = map
        .slots()
        .iter()
        .flatten()
        .map(|p| p.x)
        .min()
        .unwrap_or(0);
    let default_y = map
        .slots()
        .iter()
        .flatten()
        .map(|p| p.y)
        .min()
        .unwrap_or(0);

    map.slots()
        .iter()
        .map(|slot| match slot {
            Some(point) => [point.x, point.y, 0],
            None => [default_x, default_y, 1],
        })
        .collect()
}

/// Write the triples for a map to `<path>` as JSON.
pub fn write_map_json<P: AsRef<Path>>(map: &CoordinateMap, path: P) -> Result<(), MappingError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            MappingError::OutputError(format!("Failed to create output directory: {}", e))
        })?;
    }
    let json = serde_json::to_string(&to_triples(map))
        .map_err(|e| MappingError::OutputError(format!("Failed to serialize map: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| MappingError::OutputError(format!("Failed to write map file: {}", e)))?;
    log::info!("Coordinate map saved to {:?}", path);
    Ok(())
}

/// Render mapped positions onto a desaturated copy of a captured frame.
pub fn render_overlay(
    frame: &CameraFrame,
    map: &CoordinateMap,
) -> Result<RgbImage, MappingError> {
    let mut img = RgbImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| {
            MappingError::OutputError("frame buffer does not match its dimensions".to_string())
        })?;

    for pixel in img.pixels_mut() {
        let luma =
            ((299 * pixel[0] as u32 + 587 * pixel[1] as u32 + 114 * pixel[2] as u32) / 1000) as u8;
        *pixel = Rgb([luma, luma, luma]);
    }

    for slot in map.slots().iter().flatten() {
        draw_marker(&mut img, *slot, 5, Rgb([255, 0, 0]));
    }
    Ok(img)
}

/// Render and save the overlay PNG.
pub fn save_overlay<P: AsRef<Path>>(
    frame: &CameraFrame,
    map: &CoordinateMap,
    path: P,
) -> Result<(), MappingError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            MappingError::OutputError(format!("Failed to create output directory: {}", e))
        })?;
    }
    let img = render_overlay(frame, map)?;
    img.save(path)
        .map_err(|e| MappingError::OutputError(format!("Failed to write overlay image: {}", e)))?;
    log::info!("Overlay image saved to {:?}", path);
    Ok(())
}

/// Write the JSON map (and overlay, when configured and a reference
/// frame is available) for a completed run. Returns the JSON path.
pub fn write_artifacts(
    report: &MappingReport,
    config: &OutputConfig,
) -> Result<PathBuf, MappingError> {
    let dir = Path::new(&config.directory);
    let json_path = dir.join(format!("{}.json", config.map_name));
    write_map_json(report.map(), &json_path)?;

    if config.write_overlay {
        match &report.reference_frame {
            Some(frame) => {
                save_overlay(frame, report.map(), dir.join(format!("{}.png", config.map_name)))?
            }
            None => log::warn!("No reference frame available, skipping overlay"),
        }
    }
    Ok(json_path)
}

/// Circle outline marker. Radius is small, so sampling the perimeter is
/// plenty dense.
fn draw_marker(img: &mut RgbImage, center: Point, radius: i32, color: Rgb<u8>) {
    let steps = 8 * radius.max(1);
    for step in 0..steps {
        let angle = std::f64::consts::TAU * step as f64 / steps as f64;
        let x = center.x + (radius as f64 * angle.cos()).round() as i32;
        let y = center.y + (radius as f64 * angle.sin()).round() as i32;
        if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}
