//! Reading source values for a pixel map.
//!
//! Three strategies trade the number of read calls against the amount of data
//! read. `Scanline` suits local files where a call is cheap, `BoundingBox`
//! suits remote or compressed sources where each call is expensive, and
//! `PixelByPixel` exists for testing.

use std::ops::Range;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{GridProcessorError, Result};
use crate::pixel_map::PixelMap;
use crate::types::DataSelection;

/// Reads blocks of source data. Implemented by format decoders.
pub trait DataReader: Send + Sync {
    /// Read the values for `i_range` x `j_range` of the selected slice,
    /// row-major with `i` varying fastest.
    fn read_block(
        &self,
        selection: &DataSelection,
        i_range: Range<usize>,
        j_range: Range<usize>,
    ) -> Result<Vec<f32>>;

    /// Whether a decoded value marks missing data.
    fn is_missing(&self, value: f32) -> bool {
        value.is_nan()
    }
}

/// How source values are fetched for a [`PixelMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataReadingStrategy {
    /// One read per source row, from the smallest to the largest needed `i`.
    #[default]
    Scanline,
    /// One read covering every needed sample.
    BoundingBox,
    /// One read per needed sample.
    PixelByPixel,
}

impl DataReadingStrategy {
    /// Parse from string (case-insensitive). Unknown names give the default.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "bounding_box" | "bbox" => Self::BoundingBox,
            "pixel_by_pixel" | "pixel" => Self::PixelByPixel,
            _ => Self::Scanline,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scanline => "scanline",
            Self::BoundingBox => "bounding_box",
            Self::PixelByPixel => "pixel_by_pixel",
        }
    }

    /// Fill an output buffer of `pixel_map.output_size()` values.
    ///
    /// Pixels with no source sample, or whose sample is missing, hold NaN.
    pub fn read(
        &self,
        reader: &dyn DataReader,
        selection: &DataSelection,
        pixel_map: &PixelMap,
    ) -> Result<Vec<f32>> {
        let mut output = vec![f32::NAN; pixel_map.output_size()];
        if pixel_map.is_empty() {
            return Ok(output);
        }

        let start = Instant::now();
        let mut reads = 0usize;
        let mut values_read = 0usize;

        match self {
            Self::Scanline => {
                for j in pixel_map.j_indices() {
                    let (Some(i_min), Some(i_max)) =
                        (pixel_map.min_i_in_row(j), pixel_map.max_i_in_row(j))
                    else {
                        continue;
                    };
                    let row = read_checked(reader, selection, i_min..i_max + 1, j..j + 1)?;
                    reads += 1;
                    values_read += row.len();

                    for i in pixel_map.i_indices(j) {
                        fill(reader, &mut output, pixel_map, i, j, row[i - i_min]);
                    }
                }
            }
            Self::BoundingBox => {
                let (Some(i_min), Some(i_max), Some(j_min), Some(j_max)) = (
                    pixel_map.min_i(),
                    pixel_map.max_i(),
                    pixel_map.min_j(),
                    pixel_map.max_j(),
                ) else {
                    return Ok(output);
                };
                let width = i_max - i_min + 1;
                let block = read_checked(reader, selection, i_min..i_max + 1, j_min..j_max + 1)?;
                reads += 1;
                values_read += block.len();

                for (source, _) in pixel_map.iter() {
                    let value = block[(source.j - j_min) * width + (source.i - i_min)];
                    fill(reader, &mut output, pixel_map, source.i, source.j, value);
                }
            }
            Self::PixelByPixel => {
                for (source, _) in pixel_map.iter() {
                    let (i, j) = (source.i, source.j);
                    let value = read_checked(reader, selection, i..i + 1, j..j + 1)?;
                    reads += 1;
                    values_read += 1;
                    fill(reader, &mut output, pixel_map, i, j, value[0]);
                }
            }
        }

        debug!(
            strategy = self.as_str(),
            reads,
            values_read,
            samples_used = pixel_map.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Read source data"
        );

        Ok(output)
    }
}

impl std::fmt::Display for DataReadingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn read_checked(
    reader: &dyn DataReader,
    selection: &DataSelection,
    i_range: Range<usize>,
    j_range: Range<usize>,
) -> Result<Vec<f32>> {
    let expected = i_range.len() * j_range.len();
    let values = reader.read_block(selection, i_range, j_range)?;
    if values.len() < expected {
        return Err(GridProcessorError::ShortRead {
            expected,
            actual: values.len(),
        });
    }
    Ok(values)
}

fn fill(
    reader: &dyn DataReader,
    output: &mut [f32],
    pixel_map: &PixelMap,
    i: usize,
    j: usize,
    value: f32,
) {
    if reader.is_missing(value) {
        return;
    }
    for &pixel in pixel_map.get(i, j).unwrap_or_default() {
        output[pixel] = value;
    }
}
