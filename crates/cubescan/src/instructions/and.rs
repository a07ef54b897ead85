use cubecl::prelude::*;

use crate::precision::RealPrecision;

use super::{ScanInstruction, plane_exclusive_log_step, plane_inclusive_log_step};

/// Cumulative logical and over boolean tensors stored as `0` and `1`.
///
/// Any non-zero input counts as true. Outputs are always `0` or `1`.
#[derive(Debug, CubeType, Clone)]
pub struct And;

#[cube]
impl<P: RealPrecision> ScanInstruction<P> for And {
    fn identity(#[comptime] line_size: usize) -> Line<P::EA> {
        Line::empty(line_size).fill(P::EA::from_int(1))
    }

    fn combine(earlier: Line<P::EA>, later: Line<P::EA>) -> Line<P::EA> {
        let zero = earlier.fill(P::EA::from_int(0));
        let one = earlier.fill(P::EA::from_int(1));
        let both = earlier.not_equal(zero).and(later.not_equal(zero));

        select_many(both, one, zero)
    }

    fn plane_inclusive_scan(value: Line<P::EA>, #[comptime] line_size: usize) -> Line<P::EA> {
        plane_inclusive_log_step::<P, Self>(value, line_size)
    }

    fn plane_exclusive_scan(value: Line<P::EA>, #[comptime] line_size: usize) -> Line<P::EA> {
        plane_exclusive_log_step::<P, Self>(value, line_size)
    }
}
