use super::{PixelRange, YpCbCrMatrix};
use std::sync::OnceLock;

/// Fractional bits of the fixed point coefficients
pub(crate) const PRECISION: u32 = 13;

/// Largest coefficient magnitude that keeps `coef * 255` sums inside of an `i32`
const MAX_FIXED_COEFFICIENT: i32 = i32::MAX / 1024;

/// Everything that can go wrong when generating [`ConversionParameters`]
#[derive(Debug, thiserror::Error)]
pub enum ParameterError {
    #[error("1 - kr - kb must not be zero")]
    DegenerateMatrix,

    #[error("invalid {component} range {min}..={max}")]
    InvalidRange {
        component: &'static str,
        min: u8,
        max: u8,
    },

    #[error("coefficient {value} does not fit the fixed point representation")]
    CoefficientOverflow { value: f32 },
}

/// Coefficients of the YpCbCr to RGB transform, already scaled to the pixel range
///
/// ```text
/// R = y_coef * (Y - y_bias) + cr_coef * (Cr - cbcr_bias)
/// G = y_coef * (Y - y_bias) - g_coef_cr * (Cr - cbcr_bias) - g_coef_cb * (Cb - cbcr_bias)
/// B = y_coef * (Y - y_bias) + cb_coef * (Cb - cbcr_bias)
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseTransform<T> {
    pub y_coef: T,
    pub cr_coef: T,
    pub cb_coef: T,
    pub g_coef_cr: T,
    pub g_coef_cb: T,
}

impl InverseTransform<f32> {
    fn new(matrix: YpCbCrMatrix, range: PixelRange) -> Result<Self, ParameterError> {
        let kr = matrix.kr;
        let kb = matrix.kb;
        let kg = matrix.kg();

        if kg == 0.0 {
            return Err(ParameterError::DegenerateMatrix);
        }

        let y_scale = 255.0 / f32::from(range.y_range());
        let cbcr_scale = 255.0 / f32::from(range.cbcr_range());

        Ok(Self {
            y_coef: y_scale,
            cr_coef: 2.0 * (1.0 - kr) * cbcr_scale,
            cb_coef: 2.0 * (1.0 - kb) * cbcr_scale,
            g_coef_cr: 2.0 * ((1.0 - kr) * kr / kg) * cbcr_scale,
            g_coef_cb: 2.0 * ((1.0 - kb) * kb / kg) * cbcr_scale,
        })
    }

    fn to_integers(self, precision: u32) -> Result<InverseTransform<i32>, ParameterError> {
        let scale = (1i32 << precision) as f32;

        let fixed = |value: f32| {
            let scaled = (value * scale).round();

            if scaled.is_finite() && scaled.abs() <= MAX_FIXED_COEFFICIENT as f32 {
                Ok(scaled as i32)
            } else {
                Err(ParameterError::CoefficientOverflow { value })
            }
        };

        Ok(InverseTransform {
            y_coef: fixed(self.y_coef)?,
            cr_coef: fixed(self.cr_coef)?,
            cb_coef: fixed(self.cb_coef)?,
            g_coef_cr: fixed(self.g_coef_cr)?,
            g_coef_cb: fixed(self.g_coef_cb)?,
        })
    }
}

/// Immutable coefficient and bias table used by every conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionParameters {
    matrix: YpCbCrMatrix,
    range: PixelRange,
    transform: InverseTransform<f32>,

    pub(crate) fixed: InverseTransform<i32>,
    pub(crate) alpha: u8,
}

impl ConversionParameters {
    /// Derive the parameters for the given matrix and pixel range, output alpha is always 255
    pub fn generate(matrix: YpCbCrMatrix, range: PixelRange) -> Result<Self, ParameterError> {
        check_range("luma", range.y_min, range.y_max)?;
        check_range("chroma", range.cbcr_min, range.cbcr_max)?;

        let transform = InverseTransform::new(matrix, range)?;
        let fixed = transform.to_integers(PRECISION)?;

        Ok(Self {
            matrix,
            range,
            transform,
            fixed,
            alpha: u8::MAX,
        })
    }

    /// Process wide parameters for BT.601-4 video range, generated on first use
    ///
    /// Returns `None` forever if the generation failed.
    pub fn shared() -> Option<&'static Self> {
        static SHARED: ParameterCache = ParameterCache::new();

        SHARED.get()
    }

    pub fn matrix(&self) -> YpCbCrMatrix {
        self.matrix
    }

    pub fn range(&self) -> PixelRange {
        self.range
    }

    pub fn transform(&self) -> &InverseTransform<f32> {
        &self.transform
    }
}

fn check_range(component: &'static str, min: u8, max: u8) -> Result<(), ParameterError> {
    if min >= max {
        return Err(ParameterError::InvalidRange {
            component,
            min,
            max,
        });
    }

    Ok(())
}

/// Lazily generates [`ConversionParameters`] exactly once
///
/// Generation is never retried: after a failure [`ParameterCache::get`] keeps returning `None`.
#[derive(Debug, Default)]
pub struct ParameterCache {
    cell: OnceLock<Option<ConversionParameters>>,
}

impl ParameterCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Get the BT.601-4 video range parameters, generating them on first access
    pub fn get(&self) -> Option<&ConversionParameters> {
        self.get_or_generate(|| {
            ConversionParameters::generate(YpCbCrMatrix::ITU_R_601_4, PixelRange::VIDEO)
        })
    }

    pub(crate) fn get_or_generate(
        &self,
        generate: impl FnOnce() -> Result<ConversionParameters, ParameterError>,
    ) -> Option<&ConversionParameters> {
        self.cell
            .get_or_init(|| match generate() {
                Ok(params) => Some(params),
                Err(e) => {
                    tracing::error!("failed to generate YpCbCr to ARGB conversion parameters: {e}");
                    None
                }
            })
            .as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bt601() -> ConversionParameters {
        ConversionParameters::generate(YpCbCrMatrix::ITU_R_601_4, PixelRange::VIDEO).unwrap()
    }

    #[test]
    fn bt601_video_range_coefficients() {
        let t = *bt601().transform();

        assert!((t.y_coef - 1.164).abs() < 1e-3);
        assert!((t.cr_coef - 1.596).abs() < 1e-3);
        assert!((t.cb_coef - 2.017).abs() < 1e-3);
        assert!((t.g_coef_cr - 0.813).abs() < 1e-3);
        assert!((t.g_coef_cb - 0.392).abs() < 1e-3);
    }

    #[test]
    fn fixed_point_matches_float() {
        let params = bt601();
        let scale = (1 << PRECISION) as f32;
        let t = params.transform();
        let f = params.fixed;

        for (float, fixed) in [
            (t.y_coef, f.y_coef),
            (t.cr_coef, f.cr_coef),
            (t.cb_coef, f.cb_coef),
            (t.g_coef_cr, f.g_coef_cr),
            (t.g_coef_cb, f.g_coef_cb),
        ] {
            assert!((float * scale - fixed as f32).abs() <= 0.5);
        }
    }

    /// The transform must be the inverse of the analog BT.601 forward matrix (Y, Pb, Pr)
    #[test]
    fn transform_inverts_forward_matrix() {
        let YpCbCrMatrix { kr, kb } = YpCbCrMatrix::ITU_R_601_4;
        let kg = 1.0 - kr - kb;

        #[rustfmt::skip]
        let forward = Matrix3::new(
            kr, kg, kb,
            -0.5 * kr / (1.0 - kb), -0.5 * kg / (1.0 - kb), 0.5,
            0.5, -0.5 * kg / (1.0 - kr), -0.5 * kb / (1.0 - kr),
        );

        let inverse = forward.try_inverse().unwrap();

        let t = bt601().transform;
        let y_scale = 255.0f32 / 219.0;
        let c_scale = 255.0f32 / 224.0;

        // Rows are R, G, B; columns are Y, Pb, Pr
        assert!((inverse[(0, 0)] * y_scale - t.y_coef).abs() < 1e-4);
        assert!((inverse[(0, 2)] * c_scale - t.cr_coef).abs() < 1e-4);
        assert!((-inverse[(1, 2)] * c_scale - t.g_coef_cr).abs() < 1e-4);
        assert!((-inverse[(1, 1)] * c_scale - t.g_coef_cb).abs() < 1e-4);
        assert!((inverse[(2, 1)] * c_scale - t.cb_coef).abs() < 1e-4);
        assert!(inverse[(0, 1)].abs() < 1e-5);
        assert!(inverse[(2, 2)].abs() < 1e-5);
    }

    #[test]
    fn degenerate_matrix_is_rejected() {
        let err = ConversionParameters::generate(
            YpCbCrMatrix { kr: 0.5, kb: 0.5 },
            PixelRange::VIDEO,
        )
        .unwrap_err();

        assert!(matches!(err, ParameterError::DegenerateMatrix));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let range = PixelRange {
            y_min: 235,
            y_max: 16,
            ..PixelRange::VIDEO
        };

        let err = ConversionParameters::generate(YpCbCrMatrix::ITU_R_601_4, range).unwrap_err();

        assert!(matches!(
            err,
            ParameterError::InvalidRange {
                component: "luma",
                ..
            }
        ));
    }

    #[test]
    fn failed_generation_is_not_retried() {
        let cache = ParameterCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let params = cache.get_or_generate(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ParameterError::DegenerateMatrix)
            });

            assert!(params.is_none());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.get().is_none());
    }

    #[test]
    fn concurrent_first_access_generates_once() {
        let cache = ParameterCache::new();
        let calls = AtomicUsize::new(0);

        let addresses: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        let params = cache
                            .get_or_generate(|| {
                                calls.fetch_add(1, Ordering::SeqCst);
                                Ok(bt601())
                            })
                            .unwrap();

                        assert_eq!(params, &bt601());

                        params as *const ConversionParameters as usize
                    })
                })
                .collect();

            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn shared_parameters_are_stable() {
        let a = ConversionParameters::shared().unwrap();
        let b = ConversionParameters::shared().unwrap();

        assert!(std::ptr::eq(a, b));
        assert_eq!(a.alpha, 255);
    }
}
