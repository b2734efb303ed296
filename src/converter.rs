use crate::formats::Nv12ToArgb;
use crate::planes::read_planes;
use crate::{
    ArgbBuffer, ConversionParameters, ConvertError, PixelFormat, PlanarPixelBuffer, ReadLock,
};

/// Converts NV12 pixel buffers into [`ArgbBuffer`]s using a fixed set of [`ConversionParameters`]
#[derive(Debug, Clone, Copy)]
pub struct Converter<'p> {
    params: &'p ConversionParameters,
}

impl Converter<'static> {
    /// Converter using the process wide BT.601-4 video range parameters
    pub fn new() -> Result<Self, ConvertError> {
        ConversionParameters::shared()
            .map(Self::with_parameters)
            .ok_or(ConvertError::ParametersUnavailable)
    }
}

impl<'p> Converter<'p> {
    pub fn with_parameters(params: &'p ConversionParameters) -> Self {
        Self { params }
    }

    pub fn parameters(&self) -> &'p ConversionParameters {
        self.params
    }

    /// Convert `source` into `destination`
    ///
    /// `destination` is reallocated when it is unallocated or its dimensions or row bytes don't
    /// match the source's luma plane, otherwise its storage is reused.
    pub fn convert<B>(&self, source: &B, destination: &mut ArgbBuffer) -> Result<(), ConvertError>
    where
        B: PlanarPixelBuffer + ?Sized,
    {
        self.convert_with(source, destination, |kernel, dst, row_bytes, _| {
            kernel.convert_rows(0, dst, row_bytes)
        })
    }

    /// Same as [`Converter::convert`] but splits the work across the rayon thread pool
    #[cfg(feature = "multi-thread")]
    pub fn convert_multi_thread<B>(
        &self,
        source: &B,
        destination: &mut ArgbBuffer,
    ) -> Result<(), ConvertError>
    where
        B: PlanarPixelBuffer + ?Sized,
    {
        self.convert_with(source, destination, |kernel, dst, row_bytes, height| {
            crate::multi_thread::convert_rows_multi_thread(kernel, dst, row_bytes, height)
        })
    }

    fn convert_with<B>(
        &self,
        source: &B,
        destination: &mut ArgbBuffer,
        run: impl FnOnce(&Nv12ToArgb<'_>, &mut [u8], usize, usize),
    ) -> Result<(), ConvertError>
    where
        B: PlanarPixelBuffer + ?Sized,
    {
        let lock = ReadLock::acquire(source)?;

        let [luma, chroma] = read_planes::<2>(lock.planes())?;

        let width = luma.width;
        let height = luma.height;

        if width == 0 || height == 0 {
            return Err(ConvertError::InvalidDimensions);
        }

        PixelFormat::NV12.bounds_check(&[luma, chroma], width, height)?;

        if !destination.fits(width, height) {
            tracing::debug!(
                from_width = destination.width(),
                from_height = destination.height(),
                from_row_bytes = destination.row_bytes(),
                width,
                height,
                "reallocating ARGB destination buffer"
            );

            destination.reinit(width, height)?;
        }

        let row_bytes = destination.row_bytes();
        let kernel = Nv12ToArgb::new(self.params, luma, chroma);

        run(&kernel, destination.rows_mut(), row_bytes, height);

        Ok(())
    }
}
