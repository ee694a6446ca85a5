//! Coefficient-map images of MDCT grids.

use std::{error::Error, path::Path};

use image::{ImageBuffer, Rgb};
use num_traits::Float;

use crate::mdct::TimeFrequencyGrid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    #[default]
    Viridis,
    Magma,
    Inferno,
    Plasma,
    Grayscale,
}

impl ColorMap {
    fn to_gradient(self) -> Box<dyn colorgrad::Gradient> {
        use colorgrad::preset::*;
        match self {
            ColorMap::Viridis => Box::new(viridis()),
            ColorMap::Magma => Box::new(magma()),
            ColorMap::Inferno => Box::new(inferno()),
            ColorMap::Plasma => Box::new(plasma()),
            ColorMap::Grayscale => Box::new(greys()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub colormap: ColorMap,
    pub width: Option<u32>,   // None = 1 pixel per frame
    pub height: Option<u32>,  // None = 1 pixel per freq bin
    pub db_range: (f32, f32), // (min_db, max_db) for color mapping
    /// Measure levels relative to the largest coefficient
    pub relative_to_peak: bool,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            colormap: ColorMap::Viridis,
            width: None,
            height: None,
            db_range: (-80.0, 0.0),
            relative_to_peak: true,
        }
    }
}

pub trait GridImageExt<T: Float> {
    fn save_image(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>>;
    fn save_image_with(
        &self,
        path: impl AsRef<Path>,
        config: &VisualizationConfig,
    ) -> Result<(), Box<dyn Error>>;
    fn to_image(&self) -> ImageBuffer<Rgb<u8>, Vec<u8>>;
    fn to_image_with(&self, config: &VisualizationConfig) -> ImageBuffer<Rgb<u8>, Vec<u8>>;
}

impl<T: Float> GridImageExt<T> for TimeFrequencyGrid<T> {
    fn save_image(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
        self.save_image_with(path, &VisualizationConfig::default())
    }

    fn save_image_with(
        &self,
        path: impl AsRef<Path>,
        config: &VisualizationConfig,
    ) -> Result<(), Box<dyn Error>> {
        if self.data.is_empty() {
            return Err("cannot render an empty grid".into());
        }
        let img = self.to_image_with(config);
        img.save(path)?;
        Ok(())
    }

    fn to_image(&self) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
        self.to_image_with(&VisualizationConfig::default())
    }

    fn to_image_with(&self, config: &VisualizationConfig) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
        let width = config.width.unwrap_or(self.num_frames as u32);
        let height = config.height.unwrap_or(self.freq_bins as u32);
        let mut img = ImageBuffer::new(width, height);
        if self.data.is_empty() || width == 0 || height == 0 {
            return img;
        }

        let gradient = config.colormap.to_gradient();

        let level_db: Vec<f64> = self
            .data
            .iter()
            .map(|x| 20.0 * x.abs().to_f64().unwrap_or(0.0).max(1e-10).log10())
            .collect();
        let reference = if config.relative_to_peak {
            level_db.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        } else {
            0.0
        };

        let (min_db, max_db) = config.db_range;
        let range = (max_db - min_db) as f64;

        for y in 0..height {
            for x in 0..width {
                let frame = (x as f32 * self.num_frames as f32 / width as f32) as usize;
                // Low frequencies at the bottom
                let bin =
                    ((height - 1 - y) as f32 * self.freq_bins as f32 / height as f32) as usize;

                let db = level_db[frame * self.freq_bins + bin] - reference;
                let normalized = ((db - min_db as f64) / range).clamp(0.0, 1.0);
                let color = gradient.at(normalized as f32);

                img.put_pixel(
                    x,
                    y,
                    Rgb([
                        (color.r * 255.0) as u8,
                        (color.g * 255.0) as u8,
                        (color.b * 255.0) as u8,
                    ]),
                );
            }
        }

        img
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_dimensions_follow_grid() {
        let mut grid = TimeFrequencyGrid::<f32>::new(8, 5);
        grid.set(3, 2, 1.0);
        let img = grid.to_image();
        assert_eq!(img.dimensions(), (5, 8));

        let config = VisualizationConfig {
            width: Some(20),
            height: Some(16),
            ..Default::default()
        };
        assert_eq!(grid.to_image_with(&config).dimensions(), (20, 16));
    }

    #[test]
    fn test_peak_maps_to_top_of_gradient() {
        let mut grid = TimeFrequencyGrid::<f64>::new(2, 2);
        grid.set(0, 0, -4.0);
        let config = VisualizationConfig {
            colormap: ColorMap::Grayscale,
            ..Default::default()
        };
        let img = grid.to_image_with(&config);
        // Bin 0 is drawn on the bottom row.
        let peak = img.get_pixel(0, 1);
        let silent = img.get_pixel(1, 1);
        assert_ne!(peak, silent);
    }
}
