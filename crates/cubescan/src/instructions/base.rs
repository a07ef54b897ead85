use cubecl::prelude::*;

use crate::precision::ScanPrecision;

/// An associative operator that can be scanned, working with [`Line`].
///
/// See a provided implementation, such as [`Sum`](super::Sum) or [`Max`](super::Max), for an
/// example of how to implement this trait for a custom operator.
///
/// Operators are stateless. `combine` always receives the operand that comes first in scan order
/// on the left, so non-commutative accumulators stay correct.
#[cube]
pub trait ScanInstruction<P: ScanPrecision>:
    Send + Sync + 'static + std::fmt::Debug + CubeType
{
    /// The neutral element, used for exclusive boundaries and out of range positions.
    fn identity(#[comptime] line_size: usize) -> Line<P::EA>;

    /// Combine two accumulated values.
    fn combine(earlier: Line<P::EA>, later: Line<P::EA>) -> Line<P::EA>;

    /// Inclusive scan across the lanes of a plane.
    fn plane_inclusive_scan(value: Line<P::EA>, #[comptime] line_size: usize) -> Line<P::EA>;

    /// Exclusive scan across the lanes of a plane. The first lane receives the identity.
    fn plane_exclusive_scan(value: Line<P::EA>, #[comptime] line_size: usize) -> Line<P::EA>;
}

/// Inclusive plane scan for operators without a native plane primitive.
///
/// Runs `log2(plane_dim)` steps, each combining the value of the lane `offset` positions before.
#[cube]
pub fn plane_inclusive_log_step<P: ScanPrecision, I: ScanInstruction<P>>(
    value: Line<P::EA>,
    #[comptime] line_size: usize,
) -> Line<P::EA> {
    let lane = UNIT_POS_PLANE;
    let identity = I::identity(line_size);

    let mut accumulator = value;
    let mut offset = 1u32;

    while offset < PLANE_DIM {
        let shifted = plane_shuffle_up(accumulator, offset);
        let earlier = select(lane >= offset, shifted, identity);
        accumulator = I::combine(earlier, accumulator);
        offset *= 2;
    }

    accumulator
}

/// Exclusive counterpart of [plane_inclusive_log_step].
#[cube]
pub fn plane_exclusive_log_step<P: ScanPrecision, I: ScanInstruction<P>>(
    value: Line<P::EA>,
    #[comptime] line_size: usize,
) -> Line<P::EA> {
    let inclusive = plane_inclusive_log_step::<P, I>(value, line_size);
    let shifted = plane_shuffle_up(inclusive, 1u32);

    select(UNIT_POS_PLANE == 0, I::identity(line_size), shifted)
}
