use cubecl::prelude::*;

use crate::precision::ScanPrecision;

use super::ScanInstruction;

/// Cumulative sum. Integers wrap on overflow, complex numbers add their parts.
#[derive(Debug, CubeType, Clone)]
pub struct Sum;

#[cube]
impl<P: ScanPrecision> ScanInstruction<P> for Sum {
    fn identity(#[comptime] line_size: usize) -> Line<P::EA> {
        Line::empty(line_size).fill(P::EA::from_int(0))
    }

    fn combine(earlier: Line<P::EA>, later: Line<P::EA>) -> Line<P::EA> {
        earlier + later
    }

    fn plane_inclusive_scan(value: Line<P::EA>, #[comptime] _line_size: usize) -> Line<P::EA> {
        plane_inclusive_sum(value)
    }

    fn plane_exclusive_scan(value: Line<P::EA>, #[comptime] _line_size: usize) -> Line<P::EA> {
        plane_exclusive_sum(value)
    }
}
