//! Convert NV12 (YpCbCr 4:2:0 biplanar) camera buffers into interleaved ARGB8888.
//!
//! ```
//! use ezk_nv12_argb::{ArgbBuffer, Nv12Buffer, argb_values, convert_ypcbcr};
//!
//! let camera_frame = Nv12Buffer::blank(640, 480).unwrap();
//! let mut argb = ArgbBuffer::empty();
//!
//! assert!(convert_ypcbcr(&camera_frame, &mut argb));
//!
//! let px = argb_values(10, 10, &argb);
//! assert_eq!((px.a, px.r, px.g, px.b), (255, 0, 0, 0));
//! ```

pub use argb::{AllocationError, Argb, ArgbBuffer, argb_values};
pub use color::{
    ConversionParameters, InverseTransform, ParameterCache, ParameterError, PixelRange,
    YpCbCrMatrix,
};
pub use converter::Converter;
pub use pixel_buffer::{LockError, Nv12Buffer, PlanarPixelBuffer, ReadLock};
pub use pixel_format::{BoundsCheckError, PixelFormat};
pub use planes::{InvalidNumberOfPlanesError, Plane};

mod argb;
mod color;
mod converter;
mod formats;
#[cfg(feature = "multi-thread")]
mod multi_thread;
mod pixel_buffer;
mod pixel_format;
mod plane_decs;
mod planes;

/// Everything that can go wrong when converting a pixel buffer
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("YpCbCr to ARGB conversion parameters are unavailable")]
    ParametersUnavailable,

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    InvalidNumberOfPlanes(#[from] InvalidNumberOfPlanesError),

    #[error("width or height must not be zero")]
    InvalidDimensions,

    #[error(transparent)]
    BoundsCheck(#[from] BoundsCheckError),

    #[error("failed to allocate the destination buffer: {0}")]
    Allocation(#[from] AllocationError),
}

/// Everything that can go wrong when constructing an [`ArgbBuffer`] or [`Nv12Buffer`]
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("width or height must not be zero")]
    InvalidDimensions,

    #[error("buffer size overflows usize")]
    SizeOverflow,

    #[error(transparent)]
    BoundsCheck(#[from] BoundsCheckError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

/// Convert a YpCbCr 4:2:0 biplanar pixel buffer into ARGB data.
///
/// `destination` is resized if needed, reuse it for best performance.
///
/// Returns `false` if the conversion failed for any reason, see [`Converter::convert`] for the
/// detailed error.
pub fn convert_ypcbcr<B>(source: &B, destination: &mut ArgbBuffer) -> bool
where
    B: PlanarPixelBuffer + ?Sized,
{
    let result = Converter::new().and_then(|converter| converter.convert(source, destination));

    if let Err(e) = &result {
        tracing::debug!("YpCbCr to ARGB conversion failed: {e}");
    }

    result.is_ok()
}
