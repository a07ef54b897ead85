use cubecl::prelude::*;

use crate::{instructions::ScanInstruction, precision::ScanPrecision};

/// Addressing of one scanned axis instance in global memory.
///
/// Logical position `p` lives at `base + stride * p`, or at `base + stride * (length - 1 - p)`
/// when the scan runs in reverse. Tiles are always indexed by logical position, so a reversed
/// scan is a forward scan over a mirrored view.
#[derive(CubeType)]
pub struct AxisView {
    /// Index of the first element of the axis instance.
    pub base: usize,
    /// Number of elements along the axis.
    pub length: usize,
    /// Distance between two consecutive elements of the axis.
    pub stride: usize,
    /// Whether logical positions run from the end of the axis.
    #[cube(comptime)]
    pub reverse: bool,
}

#[cube]
impl AxisView {
    pub fn new(base: usize, length: usize, stride: usize, #[comptime] reverse: bool) -> AxisView {
        AxisView {
            base,
            length,
            stride,
            reverse,
        }
    }

    /// Global index of the logical `position`, which must be smaller than `length`.
    pub fn index(&self, position: usize) -> usize {
        let mut logical = position;
        if comptime![self.reverse] {
            logical = self.length - 1 - position;
        }

        self.base + self.stride * logical
    }
}

/// Load the tile at logical `offset`. The whole tile must be in bounds.
#[cube]
pub fn load_unchecked<P: ScanPrecision>(
    input: &Array<Line<P::EI>>,
    view: &AxisView,
    offset: usize,
    tile: &mut Array<Line<P::EA>>,
    #[comptime] n_reads: usize,
) {
    #[unroll]
    for i in 0..n_reads {
        tile[i] = Line::<P::EA>::cast_from(input[view.index(offset + i)]);
    }
}

/// Load the tile at logical `offset`, filling positions past the end with the identity.
#[cube]
pub fn load_checked<P: ScanPrecision, I: ScanInstruction<P>>(
    input: &Array<Line<P::EI>>,
    view: &AxisView,
    offset: usize,
    tile: &mut Array<Line<P::EA>>,
    #[comptime] n_reads: usize,
    #[comptime] line_size: usize,
) {
    #[unroll]
    for i in 0..n_reads {
        let position = offset + i;
        if position < view.length {
            tile[i] = Line::<P::EA>::cast_from(input[view.index(position)]);
        } else {
            tile[i] = I::identity(line_size);
        }
    }
}

/// Store the tile at logical `offset`. The whole tile must be in bounds.
#[cube]
pub fn store_unchecked<N: Numeric>(
    output: &mut Array<Line<N>>,
    view: &AxisView,
    offset: usize,
    tile: &Array<Line<N>>,
    #[comptime] n_reads: usize,
) {
    #[unroll]
    for i in 0..n_reads {
        output[view.index(offset + i)] = tile[i];
    }
}

/// Store the tile at logical `offset`, skipping positions past the end.
#[cube]
pub fn store_checked<N: Numeric>(
    output: &mut Array<Line<N>>,
    view: &AxisView,
    offset: usize,
    tile: &Array<Line<N>>,
    #[comptime] n_reads: usize,
) {
    #[unroll]
    for i in 0..n_reads {
        let position = offset + i;
        if position < view.length {
            output[view.index(position)] = tile[i];
        }
    }
}
