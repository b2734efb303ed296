use crate::{BufferError, PixelFormat, Plane};
use std::collections::TryReserveError;

const BYTES_PER_PIXEL: usize = 4;

/// Channel values of a single ARGB pixel
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Failed to allocate the storage of an [`ArgbBuffer`]
#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("buffer size overflows usize")]
    SizeOverflow,

    #[error(transparent)]
    TryReserve(#[from] TryReserveError),
}

/// Interleaved ARGB8888 image, one byte each for alpha, red, green and blue
///
/// Created unallocated by [`ArgbBuffer::empty`] and (re)allocated by the converter when its shape
/// doesn't match the source. Keep reusing the same buffer to avoid reallocations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArgbBuffer {
    data: Vec<u8>,
    width: usize,
    height: usize,
    row_bytes: usize,
}

impl ArgbBuffer {
    pub const BITS_PER_PIXEL: usize = 32;

    /// Buffer without any storage
    pub const fn empty() -> Self {
        Self {
            data: Vec::new(),
            width: 0,
            height: 0,
            row_bytes: 0,
        }
    }

    /// Zeroed buffer with `row_bytes == width * 4`
    pub fn new(width: usize, height: usize) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::InvalidDimensions);
        }

        let mut this = Self::empty();
        this.reinit(width, height)?;

        Ok(this)
    }

    /// Wrap existing ARGB data, `row_bytes` may include padding
    pub fn from_vec(
        data: Vec<u8>,
        width: usize,
        height: usize,
        row_bytes: usize,
    ) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::InvalidDimensions);
        }

        let plane = Plane {
            data: &data,
            width,
            height,
            stride: row_bytes,
        };

        PixelFormat::ARGB.bounds_check(&[plane], width, height)?;

        Ok(Self {
            data,
            width,
            height,
            row_bytes,
        })
    }

    pub fn is_allocated(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_bytes(&self) -> usize {
        self.row_bytes
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Pixels of row `y` without the row padding
    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }

        self.data
            .get(y * self.row_bytes..)?
            .get(..self.width * BYTES_PER_PIXEL)
    }

    /// Channel values at `(x, y)`, all zero if the position is out of bounds
    pub fn argb_at(&self, x: usize, y: usize) -> Argb {
        if x >= self.width || y >= self.height {
            return Argb::default();
        }

        let offset = y * self.row_bytes + x * BYTES_PER_PIXEL;

        match self.data.get(offset..offset + BYTES_PER_PIXEL) {
            Some(&[a, r, g, b]) => Argb { a, r, g, b },
            _ => Argb::default(),
        }
    }

    /// If the storage can be reused for a `width`x`height` conversion as is
    pub(crate) fn fits(&self, width: usize, height: usize) -> bool {
        self.is_allocated()
            && self.width == width
            && self.height == height
            && width.checked_mul(BYTES_PER_PIXEL) == Some(self.row_bytes)
    }

    /// Replace the storage with a zeroed, packed `width`x`height` buffer
    ///
    /// Leaves `self` untouched on failure.
    pub(crate) fn reinit(&mut self, width: usize, height: usize) -> Result<(), AllocationError> {
        let row_bytes = width
            .checked_mul(BYTES_PER_PIXEL)
            .ok_or(AllocationError::SizeOverflow)?;
        let len = row_bytes
            .checked_mul(height)
            .ok_or(AllocationError::SizeOverflow)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len)?;
        data.resize(len, 0);

        self.data = data;
        self.width = width;
        self.height = height;
        self.row_bytes = row_bytes;

        Ok(())
    }

    /// All rows including padding, excluding any excess storage after the last row
    pub(crate) fn rows_mut(&mut self) -> &mut [u8] {
        let len = self.row_bytes * self.height;

        &mut self.data[..len]
    }
}

/// Return the (A, R, G, B) values of the pixel at `(x, y)`
///
/// Positions outside of the buffer yield all zeros.
pub fn argb_values(x: usize, y: usize, buffer: &ArgbBuffer) -> Argb {
    buffer.argb_at(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_first_pixel() {
        let mut data = vec![0u8; 16];
        data[..4].copy_from_slice(&[10, 20, 30, 40]);

        let buffer = ArgbBuffer::from_vec(data, 2, 2, 8).unwrap();

        assert_eq!(
            argb_values(0, 0, &buffer),
            Argb {
                a: 10,
                r: 20,
                g: 30,
                b: 40
            }
        );
    }

    #[test]
    fn sample_uses_row_bytes() {
        // 1 pixel wide with 4 bytes of padding per row
        let data = vec![0, 0, 0, 0, 9, 9, 9, 9, 1, 2, 3, 4, 9, 9, 9, 9];

        let buffer = ArgbBuffer::from_vec(data, 1, 2, 8).unwrap();

        assert_eq!(
            buffer.argb_at(0, 1),
            Argb {
                a: 1,
                r: 2,
                g: 3,
                b: 4
            }
        );
        assert_eq!(buffer.row(1), Some(&[1, 2, 3, 4][..]));
    }

    #[test]
    fn sample_out_of_bounds_is_zero() {
        let buffer = ArgbBuffer::from_vec(vec![255; 2 * 3 * 4], 2, 3, 8).unwrap();

        for (x, y) in [(2, 0), (0, 3), (2, 3), (usize::MAX, usize::MAX)] {
            assert_eq!(buffer.argb_at(x, y), Argb::default());
        }

        assert_eq!(ArgbBuffer::empty().argb_at(0, 0), Argb::default());
    }

    #[test]
    fn from_vec_rejects_short_rows() {
        assert!(matches!(
            ArgbBuffer::from_vec(vec![0; 12], 2, 2, 6),
            Err(BufferError::BoundsCheck(_))
        ));
    }

    #[test]
    fn reinit_packs_rows() {
        let mut buffer = ArgbBuffer::from_vec(vec![7; 40], 2, 2, 20).unwrap();
        assert!(!buffer.fits(2, 2));

        buffer.reinit(3, 2).unwrap();

        assert!(buffer.fits(3, 2));
        assert_eq!(buffer.row_bytes(), 12);
        assert_eq!(buffer.as_bytes(), &[0; 24]);
    }

    #[test]
    fn reinit_overflow_leaves_buffer_untouched() {
        let mut buffer = ArgbBuffer::new(2, 2).unwrap();

        assert!(matches!(
            buffer.reinit(usize::MAX, 2),
            Err(AllocationError::SizeOverflow)
        ));
        assert!(buffer.fits(2, 2));
    }
}
