//! A rasterised track, where pure white pixels are walls.

use crate::error::TrackError;
use crate::math::{LineSegment2d, Point2d};
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;

/// The colour of a wall pixel.
const WALL: Rgb<u8> = Rgb([255, 255, 255]);

/// A rasterised track surface.
#[derive(Clone, Debug)]
pub struct TrackSurface {
    width: u32,
    height: u32,
    /// Row-major wall mask.
    walls: Vec<bool>,
}

impl TrackSurface {
    /// Loads a track image, optionally resizing it to `size` (width, height) first.
    pub fn open(path: impl AsRef<Path>, size: Option<(u32, u32)>) -> Result<Self, TrackError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| TrackError::Image {
            path: path.to_owned(),
            source,
        })?;
        let image = match size {
            Some((width, height)) => image.resize_exact(width, height, FilterType::Nearest),
            None => image,
        };
        let surface = Self::from_image(&image);
        log::info!(
            "loaded track surface {} ({}x{})",
            path.display(),
            surface.width,
            surface.height
        );
        Ok(surface)
    }

    /// Creates a surface from a decoded image.
    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from_rgb(&image.to_rgb8())
    }

    /// Creates a surface from an RGB image.
    pub fn from_rgb(image: &RgbImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            walls: image.pixels().map(|px| *px == WALL).collect(),
        }
    }

    /// The width of the surface in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The height of the surface in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the pixel at (`x`, `y`) is a wall. Pixels outside the image are never walls.
    pub fn is_wall(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.walls[y as usize * self.width as usize + x as usize]
    }

    /// Whether the pixel containing `point` is a wall.
    /// Coordinates are truncated towards zero.
    pub fn is_wall_at(&self, point: Point2d) -> bool {
        self.is_wall(point.x as i64, point.y as i64)
    }

    /// Whether any of `samples + 1` evenly spaced points along `segment`,
    /// including both ends, lands on a wall.
    pub fn segment_touches_wall(&self, segment: &LineSegment2d, samples: usize) -> bool {
        (0..=samples)
            .map(|i| segment.lerp(i as f64 / samples as f64))
            .any(|p| self.is_wall_at(p))
    }

    /// Marches along `ray` in unit steps and returns the first wall pixel hit, if any.
    /// The ray's origin itself is not tested.
    pub fn cast(&self, ray: &LineSegment2d) -> Option<Point2d> {
        let len = crate::math::distance(ray.start, ray.end);
        let steps = len.ceil() as usize;
        (1..=steps)
            .map(|i| ray.lerp(i as f64 / steps as f64))
            .find(|p| self.is_wall_at(*p))
            .map(|p| Point2d::new(p.x.floor(), p.y.floor()))
    }
}
