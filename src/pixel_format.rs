use crate::{InvalidNumberOfPlanesError, Plane, plane_decs::*};

/// Pixel formats handled by this crate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PixelFormat {
    /// Y and interleaved CbCr planes, 4:2:0 sub sampling, 8 bits per sample
    NV12,

    /// Single interleaved plane, 8 bits per sample in alpha, red, green, blue order
    ARGB,
}

impl PixelFormat {
    /// Calculate the required buffer size in bytes for a packed image of the given dimensions.
    ///
    /// Returns `None` if the size overflows `usize`.
    pub fn buffer_size(self, width: usize, height: usize) -> Option<usize> {
        self.plane_desc().iter().try_fold(0usize, |size, plane| {
            let stride = plane.packed_stride(width)?;
            let plane_size = stride.checked_mul(plane.height_op.op(height))?;

            size.checked_add(plane_size)
        })
    }

    /// Calculate the strides of an image in a packed buffer
    pub fn packed_strides(self, width: usize) -> Option<Vec<usize>> {
        self.plane_desc()
            .iter()
            .map(|desc| desc.packed_stride(width))
            .collect()
    }

    pub fn bits_per_pixel(self) -> usize {
        match self {
            PixelFormat::NV12 => 12,
            PixelFormat::ARGB => 32,
        }
    }

    /// Check if the given planes are valid for an image of the given dimensions
    pub fn bounds_check(
        self,
        planes: &[Plane<'_>],
        width: usize,
        height: usize,
    ) -> Result<(), BoundsCheckError> {
        let descs = self.plane_desc();

        if descs.len() != planes.len() {
            return Err(InvalidNumberOfPlanesError {
                expected: descs.len(),
                got: planes.len(),
            }
            .into());
        }

        for (i, (desc, plane)) in descs.iter().zip(planes).enumerate() {
            let min_width = desc.width_op.op(width);
            let min_height = desc.height_op.op(height);

            if plane.width < min_width || plane.height < min_height {
                return Err(BoundsCheckError::InvalidPlaneDimensions {
                    plane: i,
                    min_width,
                    min_height,
                    width: plane.width,
                    height: plane.height,
                });
            }

            // Ensure stride is not smaller than the width would allow
            let min_stride = desc
                .packed_stride(width)
                .ok_or(BoundsCheckError::SizeOverflow { plane: i })?;

            if min_stride > plane.stride {
                return Err(BoundsCheckError::InvalidStride {
                    plane: i,
                    minimum: min_stride,
                    got: plane.stride,
                });
            }

            // Ensure slice is large enough
            let min_len = plane
                .stride
                .checked_mul(min_height)
                .ok_or(BoundsCheckError::SizeOverflow { plane: i })?;

            if min_len > plane.data.len() {
                return Err(BoundsCheckError::InvalidPlaneSize {
                    plane: i,
                    minimum: min_len,
                    got: plane.data.len(),
                });
            }
        }

        Ok(())
    }

    pub(crate) fn plane_desc(self) -> &'static [PlaneDesc] {
        match self {
            PixelFormat::NV12 => &NV12_PLANES,
            PixelFormat::ARGB => &ARGB_PLANES,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BoundsCheckError {
    #[error(transparent)]
    InvalidNumberOfPlanes(#[from] InvalidNumberOfPlanesError),

    #[error(
        "plane {plane} is {width}x{height}, expected it to be at least {min_width}x{min_height}"
    )]
    InvalidPlaneDimensions {
        plane: usize,
        min_width: usize,
        min_height: usize,
        width: usize,
        height: usize,
    },

    #[error("invalid stride at plane {plane}, expected it to be at least {minimum}, but got {got}")]
    InvalidStride {
        plane: usize,
        minimum: usize,
        got: usize,
    },

    #[error(
        "invalid plane size at plane {plane}, expected it to be at least {minimum}, but got {got}"
    )]
    InvalidPlaneSize {
        plane: usize,
        minimum: usize,
        got: usize,
    },

    #[error("size of plane {plane} overflows usize")]
    SizeOverflow { plane: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nv12_buffer_size() {
        assert_eq!(PixelFormat::NV12.buffer_size(4, 4), Some(16 + 8));
        // Odd sizes keep a chroma sample for the last column and row
        assert_eq!(PixelFormat::NV12.buffer_size(3, 3), Some(9 + 2 * 2 * 2));
        assert_eq!(PixelFormat::ARGB.buffer_size(3, 2), Some(24));
        assert_eq!(PixelFormat::ARGB.buffer_size(usize::MAX, 2), None);
    }

    #[test]
    fn nv12_packed_strides() {
        assert_eq!(PixelFormat::NV12.packed_strides(5), Some(vec![5, 6]));
        assert_eq!(PixelFormat::ARGB.packed_strides(5), Some(vec![20]));
    }

    #[test]
    fn chroma_plane_too_small() {
        let y = [16u8; 16];
        let uv = [128u8; 4];

        let planes = [
            Plane {
                data: &y,
                width: 4,
                height: 4,
                stride: 4,
            },
            Plane {
                data: &uv,
                width: 2,
                height: 1,
                stride: 4,
            },
        ];

        let err = PixelFormat::NV12.bounds_check(&planes, 4, 4).unwrap_err();

        assert!(matches!(
            err,
            BoundsCheckError::InvalidPlaneDimensions {
                plane: 1,
                min_height: 2,
                ..
            }
        ));
    }

    #[test]
    fn stride_smaller_than_row() {
        let argb = [0u8; 32];

        let planes = [Plane {
            data: &argb,
            width: 2,
            height: 2,
            stride: 7,
        }];

        let err = PixelFormat::ARGB.bounds_check(&planes, 2, 2).unwrap_err();

        assert!(matches!(
            err,
            BoundsCheckError::InvalidStride {
                plane: 0,
                minimum: 8,
                got: 7
            }
        ));
    }

    #[test]
    fn slice_shorter_than_stride_times_height() {
        let argb = [0u8; 20];

        let planes = [Plane {
            data: &argb,
            width: 2,
            height: 2,
            stride: 12,
        }];

        let err = PixelFormat::ARGB.bounds_check(&planes, 2, 2).unwrap_err();

        assert!(matches!(
            err,
            BoundsCheckError::InvalidPlaneSize {
                minimum: 24,
                got: 20,
                ..
            }
        ));
    }
}
