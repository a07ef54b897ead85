use cubecl::prelude::*;

use crate::{instructions::ScanInstruction, precision::ScanPrecision, tile::AxisView};

use super::ScanParams;

/// Compile time settings of [strided_scan].
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StridedParams {
    pub scan: ScanParams,
    /// Number of columns held in registers by a unit.
    pub n_reads: usize,
    pub line_size: usize,
    /// Number of rows of a block, one per lane.
    pub plane_dim: u32,
    /// Number of columns scanned by a cube. A multiple of `n_reads`.
    pub tile_width: usize,
    /// Row pitch of the shared tile. The padding shifts consecutive rows across memory banks.
    pub tile_pitch: usize,
}

impl StridedParams {
    /// Row pitch of a shared tile of `tile_width` columns holding `elem_size` byte elements.
    pub fn padded_width(tile_width: usize, elem_size: usize) -> usize {
        tile_width + 16 / elem_size.max(1)
    }
}

/// Scan along a dimension that is not the fastest varying one.
///
/// Each cube owns `tile_width` adjacent columns of one batch and streams down the axis in blocks
/// of `plane_dim` rows. A block is transposed through shared memory so that every plane scans
/// `n_reads` whole columns, one row per lane. The cube must have
/// `plane_dim * tile_width / n_reads` units.
#[cube(launch_unchecked)]
pub fn strided_scan<P: ScanPrecision, I: ScanInstruction<P>>(
    input: &Array<Line<P::EI>>,
    output: &mut Array<Line<P::EA>>,
    length: usize,
    stride: usize,
    stride_blocks: usize,
    blocks: usize,
    #[comptime] params: StridedParams,
) {
    let block = CUBE_POS;
    if block >= blocks {
        terminate!();
    }

    let n_reads = comptime![params.n_reads];
    let line_size = comptime![params.line_size];
    let tile_width = comptime![params.tile_width];
    let pitch = comptime![params.tile_pitch];
    let block_rows = comptime![params.plane_dim as usize];

    let batch = block / stride_blocks;
    let column_base = (block % stride_blocks) * tile_width;
    let stride_limit = stride - column_base;

    let view = AxisView::new(
        batch * length * stride + column_base,
        length,
        stride,
        comptime![params.scan.reverse],
    );
    let identity = I::identity(line_size);

    let unit = UNIT_POS as usize;
    let lane = UNIT_POS_PLANE as usize;
    let plane = (UNIT_POS / PLANE_DIM) as usize;

    // Row and first column of the elements a unit moves between global and shared memory.
    let transfer_row = (unit * n_reads) / tile_width;
    let transfer_col = (unit * n_reads) % tile_width;
    // Each lane holds one row, each plane `n_reads` columns.
    let rotated = lane * pitch + plane * n_reads;

    let mut shared = SharedMemory::<P::EA>::new_lined(comptime![block_rows * pitch], line_size);
    let mut values = Array::<Line<P::EA>>::lined(n_reads, line_size);
    // Total of the rows already scanned, per column.
    let mut prefix = Array::<Line<P::EA>>::lined(n_reads, line_size);

    #[unroll]
    for i in 0..n_reads {
        prefix[i] = identity;
    }

    let mut row_start = 0usize;
    while row_start < length {
        let position = row_start + transfer_row;

        #[unroll]
        for i in 0..n_reads {
            let column = transfer_col + i;
            let mut value = identity;
            if position < length && column < stride_limit {
                value = Line::<P::EA>::cast_from(input[view.index(position) + column]);
            }
            shared[transfer_row * pitch + column] = value;
        }
        sync_cube();

        #[unroll]
        for i in 0..n_reads {
            let scanned = I::plane_inclusive_scan(shared[rotated + i], line_size);
            let value = I::combine(prefix[i], scanned);
            values[i] = value;
            prefix[i] = plane_broadcast(value, comptime![params.plane_dim - 1]);
        }

        #[unroll]
        for i in 0..n_reads {
            shared[rotated + i] = values[i];
        }
        sync_cube();

        #[unroll]
        for i in 0..n_reads {
            let column = transfer_col + i;
            let value = shared[transfer_row * pitch + column];

            if column < stride_limit {
                if comptime![params.scan.inclusive] {
                    if position < length {
                        output[view.index(position) + column] = value;
                    }
                } else {
                    if position == 0 {
                        output[view.index(0usize) + column] = identity;
                    }
                    if position + 1 < length {
                        output[view.index(position + 1) + column] = value;
                    }
                }
            }
        }
        sync_cube();

        row_start += block_rows;
    }
}
