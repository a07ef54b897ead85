use cubecl::prelude::*;

use crate::{
    instructions::ScanInstruction,
    precision::ScanPrecision,
    tile::{AxisView, load_checked, load_unchecked, store_checked, store_unchecked},
};

use super::ScanParams;

/// Compile time settings of [contiguous_scan].
#[derive(new, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContiguousParams {
    pub scan: ScanParams,
    /// Number of elements held in registers by a unit.
    pub n_reads: usize,
    pub line_size: usize,
    /// Number of planes of the cube. At most the plane dim.
    pub plane_count: usize,
}

/// Scan along the fastest varying dimension of a tensor.
///
/// Each cube scans one row of `length` elements, streaming over it in chunks of `n_reads`
/// elements per unit. A chunk is scanned in three levels: in registers, across the lanes of each
/// plane, then across the planes through shared memory. The running total of the previous chunks
/// is carried in a register.
#[cube(launch_unchecked)]
pub fn contiguous_scan<P: ScanPrecision, I: ScanInstruction<P>>(
    input: &Array<Line<P::EI>>,
    output: &mut Array<Line<P::EA>>,
    length: usize,
    rows: usize,
    #[comptime] params: ContiguousParams,
) {
    let row = CUBE_POS;
    if row >= rows {
        terminate!();
    }

    let n_reads = comptime![params.n_reads];
    let line_size = comptime![params.line_size];
    let plane_count = comptime![params.plane_count];

    let view = AxisView::new(row * length, length, 1usize, comptime![params.scan.reverse]);
    let identity = I::identity(line_size);

    let unit = UNIT_POS as usize;
    let lane = UNIT_POS_PLANE;
    let plane = (UNIT_POS / PLANE_DIM) as usize;
    let last_unit = CUBE_DIM as usize - 1;
    let chunk_size = CUBE_DIM as usize * n_reads;
    let num_chunks = (length + chunk_size - 1) / chunk_size;

    let mut plane_sums = SharedMemory::<P::EA>::new_lined(plane_count, line_size);
    let mut carry_slot = SharedMemory::<P::EA>::new_lined(1usize, line_size);
    let mut tile = Array::<Line<P::EA>>::lined(n_reads, line_size);
    // Total of every chunk already written by the cube.
    let mut carry = identity;

    for chunk in 0..num_chunks {
        let offset = chunk * chunk_size + unit * n_reads;

        if offset + n_reads <= length {
            load_unchecked::<P>(input, &view, offset, &mut tile, n_reads);
        } else {
            load_checked::<P, I>(input, &view, offset, &mut tile, n_reads, line_size);
        }

        #[unroll]
        for i in 1..n_reads {
            tile[i] = I::combine(tile[i - 1], tile[i]);
        }

        // Total of the previous lanes of the plane.
        let unit_total = tile[n_reads - 1];
        let prev_unit = I::plane_exclusive_scan(unit_total, line_size);

        if lane == PLANE_DIM - 1 {
            plane_sums[plane] = I::combine(prev_unit, unit_total);
        }
        sync_cube();

        // The first plane turns the plane totals into plane prefixes.
        if plane == 0 {
            let mut plane_total = identity;
            if (lane as usize) < plane_count {
                plane_total = plane_sums[lane as usize];
            }

            let plane_prefix = I::plane_exclusive_scan(plane_total, line_size);
            if (lane as usize) < plane_count {
                plane_sums[lane as usize] = plane_prefix;
            }
        }
        sync_cube();

        let prefix = I::combine(I::combine(carry, plane_sums[plane]), prev_unit);

        #[unroll]
        for i in 0..n_reads {
            tile[i] = I::combine(prefix, tile[i]);
        }

        if comptime![params.scan.inclusive] {
            if offset + n_reads <= length {
                store_unchecked::<P::EA>(output, &view, offset, &tile, n_reads);
            } else {
                store_checked::<P::EA>(output, &view, offset, &tile, n_reads);
            }
        } else {
            if chunk == 0 && unit == 0 {
                output[view.index(0usize)] = identity;
            }

            // Exclusive outputs land one position later, so the last one of the axis is dropped.
            if offset + n_reads < length {
                store_unchecked::<P::EA>(output, &view, offset + 1, &tile, n_reads);
            } else {
                store_checked::<P::EA>(output, &view, offset + 1, &tile, n_reads);
            }
        }
        sync_cube();

        // Broadcast the total of the chunk through its own slot, so the next chunk can overwrite
        // the plane totals.
        if unit == last_unit {
            carry_slot[0] = tile[n_reads - 1];
        }
        sync_cube();

        carry = carry_slot[0];
    }
}
