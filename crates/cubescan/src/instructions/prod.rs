use cubecl::prelude::*;

use crate::{
    Complex32, Complex64,
    precision::{RealPrecision, ScanPrecision},
};

use super::{ScanInstruction, plane_exclusive_log_step, plane_inclusive_log_step};

/// Cumulative product. Integers wrap on overflow.
///
/// Complex numbers are multiplied as such, so the scan order matters for rounding but not for
/// the exact result.
#[derive(Debug, CubeType, Clone)]
pub struct Prod;

#[cube]
impl<P: RealPrecision> ScanInstruction<P> for Prod {
    fn identity(#[comptime] line_size: usize) -> Line<P::EA> {
        Line::empty(line_size).fill(P::EA::from_int(1))
    }

    fn combine(earlier: Line<P::EA>, later: Line<P::EA>) -> Line<P::EA> {
        earlier * later
    }

    fn plane_inclusive_scan(value: Line<P::EA>, #[comptime] _line_size: usize) -> Line<P::EA> {
        plane_inclusive_prod(value)
    }

    fn plane_exclusive_scan(value: Line<P::EA>, #[comptime] _line_size: usize) -> Line<P::EA> {
        plane_exclusive_prod(value)
    }
}

/// Product of two complex numbers stored as `[re, im]` lines.
#[cube]
pub fn complex_mul<F: Float>(lhs: Line<F>, rhs: Line<F>) -> Line<F> {
    let mut out = Line::<F>::empty(2usize);
    out[0] = lhs[0] * rhs[0] - lhs[1] * rhs[1];
    out[1] = lhs[0] * rhs[1] + lhs[1] * rhs[0];
    out
}

macro_rules! impl_complex_prod {
    ($($complex:ident: $float:ident),*) => {
        $(
            #[cube]
            impl ScanInstruction<$complex> for Prod {
                fn identity(#[comptime] line_size: usize) -> Line<$float> {
                    let mut one = Line::<$float>::empty(line_size).fill($float::new(0.0));
                    one[0] = $float::new(1.0);
                    one
                }

                fn combine(earlier: Line<$float>, later: Line<$float>) -> Line<$float> {
                    complex_mul::<$float>(earlier, later)
                }

                fn plane_inclusive_scan(
                    value: Line<$float>,
                    #[comptime] line_size: usize,
                ) -> Line<$float> {
                    plane_inclusive_log_step::<$complex, Self>(value, line_size)
                }

                fn plane_exclusive_scan(
                    value: Line<$float>,
                    #[comptime] line_size: usize,
                ) -> Line<$float> {
                    plane_exclusive_log_step::<$complex, Self>(value, line_size)
                }
            }
        )*
    };
}

impl_complex_prod!(Complex32: f32, Complex64: f64);
