use cubecl::prelude::*;

use crate::precision::{RealPrecision, ScanBounds};

use super::{ScanInstruction, plane_exclusive_log_step, plane_inclusive_log_step};

/// Cumulative minimum. A NaN operand always wins, so NaN poisons every later position.
#[derive(Debug, CubeType, Clone)]
pub struct Min;

#[cube]
impl<P: RealPrecision> ScanInstruction<P> for Min {
    fn identity(#[comptime] line_size: usize) -> Line<P::EA> {
        Line::empty(line_size).fill(P::EA::highest())
    }

    fn combine(earlier: Line<P::EA>, later: Line<P::EA>) -> Line<P::EA> {
        let keep = earlier
            .not_equal(earlier)
            .or(later.equal(later).and(earlier.less_equal(later)));

        select_many(keep, earlier, later)
    }

    fn plane_inclusive_scan(value: Line<P::EA>, #[comptime] line_size: usize) -> Line<P::EA> {
        plane_inclusive_log_step::<P, Self>(value, line_size)
    }

    fn plane_exclusive_scan(value: Line<P::EA>, #[comptime] line_size: usize) -> Line<P::EA> {
        plane_exclusive_log_step::<P, Self>(value, line_size)
    }
}
