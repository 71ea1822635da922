//! Persistence buffer the bolts burn into.
//!
//! Cells hold brightness in `[0, 1]`, row-major. Each tick the whole grid is
//! faded once, then writers max-merge new light on top.

use crate::error::LightningError;

#[derive(Clone, Debug)]
pub struct IntensityBuffer {
    width: usize,
    height: usize,
    cells: Vec<f32>,
}

impl IntensityBuffer {
    pub fn new(width: usize, height: usize) -> Result<Self, LightningError> {
        if width == 0 || height == 0 {
            return Err(LightningError::invalid(format!(
                "buffer dimensions must be non-zero, got {width}x{height}"
            )));
        }
        Ok(Self {
            width,
            height,
            cells: vec![0.0; width * height],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    pub fn get(&self, x: i32, y: i32) -> Option<f32> {
        self.index(x, y).map(|i| self.cells[i])
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    /// Fade every cell by `factor`. Call once per tick, before any writes.
    ///
    /// `factor` must lie in `(0, 1)`; anything larger would push cells past 1.
    pub fn decay(&mut self, factor: f32) {
        debug_assert!(
            factor > 0.0 && factor < 1.0,
            "decay factor {factor} outside (0, 1)"
        );
        for v in &mut self.cells {
            *v *= factor;
        }
    }

    /// Raise the cell at `(x, y)` to `intensity` if it is dimmer.
    /// Coordinates off the grid are ignored.
    pub fn set_max(&mut self, x: i32, y: i32, intensity: f32) {
        if let Some(i) = self.index(x, y) {
            let v = intensity.clamp(0.0, 1.0);
            if v > self.cells[i] {
                self.cells[i] = v;
            }
        }
    }

    /// Max-merge `intensity` across a whole row.
    pub fn fill_row(&mut self, y: i32, intensity: f32) {
        for x in 0..self.width as i32 {
            self.set_max(x, y, intensity);
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(0.0);
    }

    /// Grayscale RGBA bytes, `width * height * 4` long.
    pub fn to_image(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.cells.len() * 4);
        self.write_image(&mut out);
        out
    }

    /// Same bytes as [`IntensityBuffer::to_image`], written into a reused vector.
    pub fn write_image(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.cells.len() * 4);
        for &v in &self.cells {
            let c = channel(v);
            out.extend_from_slice(&[c, c, c, u8::MAX]);
        }
    }
}

#[inline]
fn channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
