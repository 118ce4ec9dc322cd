//! Blob detection over captured frames.

use crate::errors::MappingError;
use crate::types::{CameraFrame, Point};

/// Extracts bright blob centers from a frame.
///
/// "Nothing found" is an empty set, never an error; errors are reserved
/// for malformed input.
pub trait BlobDetector {
    /// Centers of all contiguous bright regions at least `min_blob_size`
    /// pixels in each dimension.
    fn detect(
        &self,
        frame: &CameraFrame,
        threshold: u8,
        min_blob_size: u32,
    ) -> Result<Vec<Point>, MappingError>;

    /// Center of the single most prominent blob, if any. Used by the
    /// linear-scan strategy where exactly one light is lit per frame.
    fn detect_primary(
        &self,
        frame: &CameraFrame,
        threshold: u8,
        min_blob_size: u32,
    ) -> Result<Option<Point>, MappingError> {
        Ok(self
            .detect(frame, threshold, min_blob_size)?
            .into_iter()
            .next())
    }
}

/// Threshold-and-label detector.
///
/// Grayscale conversion, fixed binary threshold, a morphological open to
/// knock out speckle, then connected-component bounding boxes.
#[derive(Debug, Clone)]
pub struct ThresholdDetector {
    erosion_size: u32,
}

struct Region {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u32,
}

impl Region {
    fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.width() / 2) as i32,
            (self.min_y + self.height() / 2) as i32,
        )
    }
}

impl ThresholdDetector {
    /// `erosion_size` is the structuring-element size of the
    /// morphological open; 1 or 0 disables it.
    pub fn new(erosion_size: u32) -> Self {
        Self { erosion_size }
    }

    /// Binary lit-pixel mask for the frame.
    fn mask(&self, frame: &CameraFrame, threshold: u8) -> Result<Vec<bool>, MappingError> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        if width == 0 || height == 0 {
            return Err(MappingError::DetectionFailure(format!(
                "frame has degenerate dimensions {}x{}",
                frame.width, frame.height
            )));
        }
        if frame.data.len() != width * height * 3 {
            return Err(MappingError::DetectionFailure(format!(
                "frame buffer is {} bytes, expected {} for {}x{} RGB",
                frame.data.len(),
                width * height * 3,
                frame.width,
                frame.height
            )));
        }

        let mut mask = vec![false; width * height];
        for (pixel, lit) in frame.data.chunks_exact(3).zip(mask.iter_mut()) {
            // Integer Rec. 601 luma.
            let luma = (299 * pixel[0] as u32 + 587 * pixel[1] as u32 + 114 * pixel[2] as u32)
                / 1000;
            *lit = luma > threshold as u32;
        }

        if self.erosion_size > 1 {
            let radius = (self.erosion_size / 2) as i32;
            let eroded = morphology(&mask, width, height, radius, true);
            mask = morphology(&eroded, width, height, radius, false);
        }
        Ok(mask)
    }

    fn regions(&self, frame: &CameraFrame, threshold: u8) -> Result<Vec<Region>, MappingError> {
        let mask = self.mask(frame, threshold)?;
        Ok(label_regions(&mask, frame.width as usize, frame.height as usize))
    }
}

impl Default for ThresholdDetector {
    fn default() -> Self {
        Self::new(3)
    }
}

impl BlobDetector for ThresholdDetector {
    fn detect(
        &self,
        frame: &CameraFrame,
        threshold: u8,
        min_blob_size: u32,
    ) -> Result<Vec<Point>, MappingError> {
        Ok(self
            .regions(frame, threshold)?
            .iter()
            .filter(|r| r.width() >= min_blob_size && r.height() >= min_blob_size)
            .map(Region::center)
            .collect())
    }

    fn detect_primary(
        &self,
        frame: &CameraFrame,
        threshold: u8,
        min_blob_size: u32,
    ) -> Result<Option<Point>, MappingError> {
        // Largest region by area first, then the size gate: a frame full
        // of speckle smaller than a real light yields nothing.
        Ok(self
            .regions(frame, threshold)?
            .iter()
            .max_by_key(|r| r.area)
            .filter(|r| r.width() >= min_blob_size && r.height() >= min_blob_size)
            .map(Region::center))
    }
}

/// Square-kernel erosion (`erode = true`) or dilation over a binary mask.
fn morphology(mask: &[bool], width: usize, height: usize, radius: i32, erode: bool) -> Vec<bool> {
    if radius <= 0 {
        return mask.to_vec();
    }
    let mut out = vec![false; mask.len()];
    for y in 0..height as i32 {
        for x in 0..width as i32 {
            let mut all = true;
            let mut any = false;
            'kernel: for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let ny = y + dy;
                    let nx = x + dx;
                    let set = ny >= 0
                        && ny < height as i32
                        && nx >= 0
                        && nx < width as i32
                        && mask[ny as usize * width + nx as usize];
                    all &= set;
                    any |= set;
                    if erode && !all {
                        break 'kernel;
                    }
                    if !erode && any {
                        break 'kernel;
                    }
                }
            }
            out[y as usize * width + x as usize] = if erode { all } else { any };
        }
    }
    out
}

/// 8-connected component labelling with per-region bounding boxes.
fn label_regions(mask: &[bool], width: usize, height: usize) -> Vec<Region> {
    let mut visited = vec![false; mask.len()];
    let mut regions = Vec::new();
    let mut queue = Vec::new();

    for start in 0..mask.len() {
        if !mask[start] || visited[start] {
            continue;
        }
        visited[start] = true;
        queue.push(start);

        let mut region = Region {
            min_x: u32::MAX,
            min_y: u32::MAX,
            max_x: 0,
            max_y: 0,
            area: 0,
        };

        while let Some(index) = queue.pop() {
            let x = (index % width) as u32;
            let y = (index / width) as u32;
            region.min_x = region.min_x.min(x);
            region.min_y = region.min_y.min(y);
            region.max_x = region.max_x.max(x);
            region.max_y = region.max_y.max(y);
            region.area += 1;

            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    let neighbor = ny as usize * width + nx as usize;
                    if mask[neighbor] && !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push(neighbor);
                    }
                }
            }
        }
        regions.push(region);
    }
    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::synthetic_frame;

    #[test]
    fn test_detect_finds_disk_centers() {
        let lights = [Point::new(20, 20), Point::new(60, 40)];
        let frame = synthetic_frame(100, 80, &lights, 3);
        let detector = ThresholdDetector::new(0);
        let mut found = detector.detect(&frame, 128, 3).unwrap();
        found.sort_by_key(|p| p.x);
        assert_eq!(found, lights);
    }

    #[test]
    fn test_detect_empty_frame_is_ok() {
        let frame = synthetic_frame(64, 64, &[], 3);
        let detector = ThresholdDetector::default();
        assert!(detector.detect(&frame, 128, 3).unwrap().is_empty());
    }

    #[test]
    fn test_detect_rejects_malformed_buffer() {
        let frame = CameraFrame::new(vec![0u8; 10], 64, 64);
        let detector = ThresholdDetector::default();
        assert!(matches!(
            detector.detect(&frame, 128, 3),
            Err(MappingError::DetectionFailure(_))
        ));
    }

    #[test]
    fn test_minimum_dimension_filter() {
        // A 1px speck survives thresholding but not the size gate.
        let frame = synthetic_frame(64, 64, &[Point::new(30, 30)], 0);
        let detector = ThresholdDetector::new(0);
        assert!(detector.detect(&frame, 128, 3).unwrap().is_empty());
        assert_eq!(detector.detect(&frame, 128, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_erosion_removes_speckle() {
        let mut frame = synthetic_frame(64, 64, &[Point::new(20, 20)], 4);
        // Lone hot pixel away from the disk.
        let speck = (50 * 64 + 50) * 3;
        frame.data[speck] = 255;
        frame.data[speck + 1] = 255;
        frame.data[speck + 2] = 255;

        let plain = ThresholdDetector::new(0);
        assert_eq!(plain.detect(&frame, 128, 1).unwrap().len(), 2);
        let opened = ThresholdDetector::new(3);
        let found = opened.detect(&frame, 128, 1).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_detect_primary_prefers_largest() {
        let frame = {
            let mut f = synthetic_frame(100, 80, &[Point::new(20, 20)], 5);
            let small = synthetic_frame(100, 80, &[Point::new(70, 60)], 2);
            for (dst, src) in f.data.iter_mut().zip(small.data.iter()) {
                *dst = (*dst).max(*src);
            }
            f
        };
        let detector = ThresholdDetector::new(0);
        let primary = detector.detect_primary(&frame, 128, 3).unwrap();
        assert_eq!(primary, Some(Point::new(20, 20)));
    }

    #[test]
    fn test_detect_primary_none_when_dark() {
        let frame = synthetic_frame(64, 64, &[], 3);
        let detector = ThresholdDetector::default();
        assert_eq!(detector.detect_primary(&frame, 128, 3).unwrap(), None);
    }
}
