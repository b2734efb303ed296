/// A single image plane, borrowed from its pixel buffer
#[derive(Debug, Clone, Copy)]
pub struct Plane<'a> {
    pub data: &'a [u8],
    /// Width in samples (chroma pairs count as a single sample)
    pub width: usize,
    /// Height in rows
    pub height: usize,
    /// Bytes per row, including padding
    pub stride: usize,
}

impl Plane<'static> {
    pub(crate) const EMPTY: Self = Self {
        data: &[],
        width: 0,
        height: 0,
        stride: 0,
    };
}

#[derive(Debug, thiserror::Error)]
#[error("got invalid number of planes, expected {expected} but got {got}")]
pub struct InvalidNumberOfPlanesError {
    pub expected: usize,
    pub got: usize,
}

/// Take exactly `N` planes from the iterator
pub(crate) fn read_planes<'a, const N: usize>(
    mut iter: impl Iterator<Item = Plane<'a>>,
) -> Result<[Plane<'a>; N], InvalidNumberOfPlanesError> {
    let mut out: [Plane<'a>; N] = [Plane::EMPTY; N];

    for (i, out) in out.iter_mut().enumerate() {
        *out = iter.next().ok_or(InvalidNumberOfPlanesError {
            expected: N,
            got: i,
        })?;
    }

    let excess = iter.count();

    if excess != 0 {
        return Err(InvalidNumberOfPlanesError {
            expected: N,
            got: N + excess,
        });
    }

    Ok(out)
}
