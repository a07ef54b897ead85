mod contiguous;
mod strided;

pub use contiguous::*;
pub use strided::*;

/// Direction and boundary of a scan.
#[derive(new, Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanParams {
    /// Whether each output includes its own input element.
    pub inclusive: bool,
    /// Whether the scan runs from the last element of the axis to the first.
    pub reverse: bool,
}

/// The scanned dimension of a tensor.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanAxis {
    /// Number of elements along the axis.
    pub length: usize,
    /// Distance between two consecutive elements of the axis. `1` for a contiguous axis.
    pub stride: usize,
}

impl ScanAxis {
    /// Number of column blocks of `tile_width` needed to cover the stride.
    pub fn stride_blocks(&self, tile_width: usize) -> usize {
        self.stride.div_ceil(tile_width)
    }

    /// Whether the scanned elements are adjacent in memory.
    pub fn is_contiguous(&self) -> bool {
        self.stride == 1
    }
}
