use crate::color::params::PRECISION;
use crate::{ConversionParameters, Plane};

const ROUNDING: i32 = 1 << (PRECISION - 1);

/// Fixed point NV12 to ARGB8888 conversion of already validated planes
pub(crate) struct Nv12ToArgb<'a> {
    y: Plane<'a>,
    uv: Plane<'a>,
    width: usize,

    y_coef: i32,
    cr_coef: i32,
    cb_coef: i32,
    g_coef_cr: i32,
    g_coef_cb: i32,

    y_bias: i32,
    cbcr_bias: i32,
    y_min: u8,
    y_max: u8,
    cbcr_min: u8,
    cbcr_max: u8,

    alpha: u8,
}

impl<'a> Nv12ToArgb<'a> {
    /// `y` and `uv` must have passed the NV12 bounds check for `y.width`x`y.height`
    pub(crate) fn new(params: &ConversionParameters, y: Plane<'a>, uv: Plane<'a>) -> Self {
        let range = params.range();
        let fixed = params.fixed;

        Self {
            y,
            uv,
            width: y.width,
            y_coef: fixed.y_coef,
            cr_coef: fixed.cr_coef,
            cb_coef: fixed.cb_coef,
            g_coef_cr: fixed.g_coef_cr,
            g_coef_cb: fixed.g_coef_cb,
            y_bias: i32::from(range.y_bias),
            cbcr_bias: i32::from(range.cbcr_bias),
            y_min: range.y_min,
            y_max: range.y_max,
            cbcr_min: range.cbcr_min,
            cbcr_max: range.cbcr_max,
            alpha: params.alpha,
        }
    }

    /// Convert consecutive rows starting at `first_row` into `dst`
    ///
    /// `dst` holds whole rows of `row_bytes` each, the last one may be cut short after its pixels.
    pub(crate) fn convert_rows(&self, first_row: usize, dst: &mut [u8], row_bytes: usize) {
        for (i, argb_row) in dst.chunks_mut(row_bytes).enumerate() {
            let row = first_row + i;

            let y_start = row * self.y.stride;
            let y_row = &self.y.data[y_start..y_start + self.width];

            // Two luma rows share a chroma row
            let uv_start = (row / 2) * self.uv.stride;
            let uv_row = &self.uv.data[uv_start..uv_start + self.width.div_ceil(2) * 2];

            self.convert_row(y_row, uv_row, &mut argb_row[..self.width * 4]);
        }
    }

    #[inline(always)]
    fn convert_row(&self, y_row: &[u8], uv_row: &[u8], argb_row: &mut [u8]) {
        // Every pair of pixels shares a Cb/Cr sample, the last chunk holds a single pixel for odd widths
        for ((argb, y), cbcr) in argb_row
            .chunks_mut(8)
            .zip(y_row.chunks(2))
            .zip(uv_row.chunks_exact(2))
        {
            let chroma = self.chroma(cbcr[0], cbcr[1]);

            for (px, &y) in argb.chunks_exact_mut(4).zip(y) {
                self.write_pixel(px, y, chroma);
            }
        }
    }

    /// Chroma contribution to (R, G, B)
    #[inline(always)]
    fn chroma(&self, cb: u8, cr: u8) -> (i32, i32, i32) {
        let cb = i32::from(cb.clamp(self.cbcr_min, self.cbcr_max)) - self.cbcr_bias;
        let cr = i32::from(cr.clamp(self.cbcr_min, self.cbcr_max)) - self.cbcr_bias;

        (
            self.cr_coef * cr,
            -(self.g_coef_cr * cr + self.g_coef_cb * cb),
            self.cb_coef * cb,
        )
    }

    #[inline(always)]
    fn write_pixel(&self, px: &mut [u8], y: u8, (r, g, b): (i32, i32, i32)) {
        let y = (i32::from(y.clamp(self.y_min, self.y_max)) - self.y_bias) * self.y_coef + ROUNDING;

        px[0] = self.alpha;
        px[1] = descale(y + r);
        px[2] = descale(y + g);
        px[3] = descale(y + b);
    }
}

#[inline(always)]
fn descale(v: i32) -> u8 {
    (v >> PRECISION).clamp(0, i32::from(u8::MAX)) as u8
}
