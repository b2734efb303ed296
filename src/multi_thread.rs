use crate::formats::Nv12ToArgb;
use rayon::iter::{IndexedParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;

/// Convert `height` rows of `row_bytes` each, split into one horizontal band per CPU
#[inline(never)]
pub(crate) fn convert_rows_multi_thread(
    kernel: &Nv12ToArgb<'_>,
    dst: &mut [u8],
    row_bytes: usize,
    height: usize,
) {
    let threads = num_cpus::get();

    if threads == 1 || height < 2 {
        return kernel.convert_rows(0, dst, row_bytes);
    }

    let rows_per_band = height.div_ceil(threads);

    tracing::trace!(threads, rows_per_band, "splitting conversion into bands");

    dst.par_chunks_mut(rows_per_band * row_bytes)
        .enumerate()
        .for_each(|(i, band)| kernel.convert_rows(i * rows_per_band, band, row_bytes));
}
