use crate::{BufferError, PixelFormat, Plane};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Error returned by [`PlanarPixelBuffer::lock_read_only`]
#[derive(Debug, thiserror::Error)]
#[error("failed to lock the pixel buffer's base address (status {status})")]
pub struct LockError {
    pub status: i32,
}

/// A planar pixel buffer owned by someone else, usually a camera capture session
///
/// Plane memory is only guaranteed to be valid between [`lock_read_only`](Self::lock_read_only)
/// and [`unlock_read_only`](Self::unlock_read_only). Use [`ReadLock`] instead of calling these directly.
pub trait PlanarPixelBuffer {
    /// Lock the base addresses of all planes for reading
    fn lock_read_only(&self) -> Result<(), LockError>;

    /// Release a lock acquired by a successful [`lock_read_only`](Self::lock_read_only)
    fn unlock_read_only(&self);

    /// Returns an iterator yielding every plane
    ///
    /// Only called while the buffer is locked.
    fn planes(&self) -> Box<dyn Iterator<Item = Plane<'_>> + '_>;
}

/// Read only lock of a [`PlanarPixelBuffer`], released when dropped
pub struct ReadLock<'a, B: PlanarPixelBuffer + ?Sized> {
    buffer: &'a B,
}

impl<'a, B: PlanarPixelBuffer + ?Sized> ReadLock<'a, B> {
    pub fn acquire(buffer: &'a B) -> Result<Self, LockError> {
        buffer.lock_read_only()?;

        Ok(Self { buffer })
    }

    /// Planes of the locked buffer, which cannot outlive the lock
    pub fn planes(&self) -> Box<dyn Iterator<Item = Plane<'_>> + '_> {
        self.buffer.planes()
    }
}

impl<B: PlanarPixelBuffer + ?Sized> Drop for ReadLock<'_, B> {
    fn drop(&mut self) {
        self.buffer.unlock_read_only();
    }
}

/// In memory NV12 image, a luma plane followed by an interleaved Cb/Cr plane
#[derive(Debug)]
pub struct Nv12Buffer {
    y: Vec<u8>,
    y_stride: usize,
    uv: Vec<u8>,
    uv_stride: usize,

    width: usize,
    height: usize,

    locks: AtomicUsize,
}

impl Nv12Buffer {
    pub fn from_planes(
        y: Vec<u8>,
        y_stride: usize,
        uv: Vec<u8>,
        uv_stride: usize,
        width: usize,
        height: usize,
    ) -> Result<Self, BufferError> {
        if width == 0 || height == 0 {
            return Err(BufferError::InvalidDimensions);
        }

        let this = Self {
            y,
            y_stride,
            uv,
            uv_stride,
            width,
            height,
            locks: AtomicUsize::new(0),
        };

        {
            let planes: Vec<Plane<'_>> = this.planes().collect();
            PixelFormat::NV12.bounds_check(&planes, width, height)?;
        }

        Ok(this)
    }

    /// Black image (Y = 16, Cb = Cr = 128) with packed strides
    pub fn blank(width: usize, height: usize) -> Result<Self, BufferError> {
        let strides = PixelFormat::NV12
            .packed_strides(width)
            .ok_or(BufferError::SizeOverflow)?;

        let y_len = strides[0]
            .checked_mul(height)
            .ok_or(BufferError::SizeOverflow)?;
        let uv_len = strides[1]
            .checked_mul(height.div_ceil(2))
            .ok_or(BufferError::SizeOverflow)?;

        Self::from_planes(
            vec![16; y_len],
            strides[0],
            vec![128; uv_len],
            strides[1],
            width,
            height,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn y_plane(&self) -> &[u8] {
        &self.y
    }

    pub fn uv_plane(&self) -> &[u8] {
        &self.uv
    }

    /// Number of read locks currently held
    pub fn lock_count(&self) -> usize {
        self.locks.load(Ordering::Acquire)
    }
}

impl PlanarPixelBuffer for Nv12Buffer {
    fn lock_read_only(&self) -> Result<(), LockError> {
        self.locks.fetch_add(1, Ordering::AcqRel);

        Ok(())
    }

    fn unlock_read_only(&self) {
        // Unbalanced unlocks are ignored
        let _ = self
            .locks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    fn planes(&self) -> Box<dyn Iterator<Item = Plane<'_>> + '_> {
        Box::new(
            [
                Plane {
                    data: &self.y,
                    width: self.width,
                    height: self.height,
                    stride: self.y_stride,
                },
                Plane {
                    data: &self.uv,
                    width: self.width.div_ceil(2),
                    height: self.height.div_ceil(2),
                    stride: self.uv_stride,
                },
            ]
            .into_iter(),
        )
    }
}
