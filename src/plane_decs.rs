/// Description for a Plane which can be used to implement bounds checks, stride calculation and buffer sizes.
///
/// Not used for the implementation of the conversion itself, only utility functions.
#[derive(Clone, Copy)]
pub(crate) struct PlaneDesc {
    pub(crate) width_op: Op,
    pub(crate) height_op: Op,

    /// 1 for luma, 2 for interleaved CbCr, 4 for ARGB
    pub(crate) bytes_per_sample: usize,
}

impl PlaneDesc {
    pub(crate) fn packed_stride(&self, width: usize) -> Option<usize> {
        self.width_op.op(width).checked_mul(self.bytes_per_sample)
    }
}

/// Plane's number of samples in relation to width / height
#[derive(Clone, Copy)]
pub(crate) enum Op {
    /// Sub sampled, odd sizes round up so the last column/row still has a chroma sample
    DivCeil(usize),
    Identity,
}

impl Op {
    pub(crate) fn op(self, lhs: usize) -> usize {
        match self {
            Op::DivCeil(rhs) => lhs.div_ceil(rhs),
            Op::Identity => lhs,
        }
    }
}

pub(crate) const NV12_PLANES: [PlaneDesc; 2] = [
    PlaneDesc {
        width_op: Op::Identity,
        height_op: Op::Identity,
        bytes_per_sample: 1,
    },
    PlaneDesc {
        width_op: Op::DivCeil(2),
        height_op: Op::DivCeil(2),
        bytes_per_sample: 2,
    },
];

pub(crate) const ARGB_PLANES: [PlaneDesc; 1] = [PlaneDesc {
    width_op: Op::Identity,
    height_op: Op::Identity,
    bytes_per_sample: 4,
}];
