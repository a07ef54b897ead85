use cubecl::prelude::*;
use half::{bf16, f16};

use crate::{Complex32, Complex64, precision::ScanBounds};

use super::{ScanInstruction, plane_exclusive_log_step, plane_inclusive_log_step};

/// Cumulative `ln(sum(exp(x)))`, computed without overflowing.
///
/// Returns NaN as soon as an operand is NaN. An infinite operand is returned as is, which keeps
/// `inf - inf` out of the computation.
///
/// Complex numbers are ordered lexicographically, real part first, and their phases are added
/// through `atan2`, so the result stays on the principal branch. A NaN part gives `NaN + 0i`.
#[derive(Debug, CubeType, Clone)]
pub struct LogAddExp;

/// `ln(exp(lhs) + exp(rhs))` for each element of the lines.
#[cube]
pub fn log_add_exp<F: Float + ScanBounds>(lhs: Line<F>, rhs: Line<F>) -> Line<F> {
    let nan = lhs.not_equal(lhs).or(rhs.not_equal(rhs));
    let lhs_greater = lhs.greater_than(rhs);
    let max = select_many(lhs_greater, lhs, rhs);
    let min = select_many(lhs_greater, rhs, lhs);

    let infinite = min
        .equal(min.fill(F::lowest()))
        .or(max.equal(max.fill(F::highest())));
    let finite = max + Line::log1p(Line::exp(min - max));

    select_many(nan, lhs + rhs, select_many(infinite, max, finite))
}

/// `ln(exp(lhs) + exp(rhs))` for complex numbers stored as `[re, im]` lines.
#[cube]
pub fn complex_log_add_exp<F: Float + ScanBounds>(lhs: Line<F>, rhs: Line<F>) -> Line<F> {
    let lhs_re = lhs[0];
    let lhs_im = lhs[1];
    let rhs_re = rhs[0];
    let rhs_im = rhs[1];

    let nan = lhs_re != lhs_re || lhs_im != lhs_im || rhs_re != rhs_re || rhs_im != rhs_im;
    let lhs_smaller = lhs_re < rhs_re || (lhs_re == rhs_re && lhs_im < rhs_im);

    let max_re = select(lhs_smaller, rhs_re, lhs_re);
    let max_im = select(lhs_smaller, rhs_im, lhs_im);
    let min_re = select(lhs_smaller, lhs_re, rhs_re);
    let min_im = select(lhs_smaller, lhs_im, rhs_im);

    let magnitude = F::exp(min_re - max_re);
    let angle = min_im - max_im;
    let re = F::new(1.0) + magnitude * F::cos(angle);
    let im = magnitude * F::sin(angle);

    let mut out = Line::<F>::empty(2usize);
    out[0] = max_re + F::ln(F::hypot(re, im));
    out[1] = max_im + F::atan2(im, re);

    if min_re == F::lowest() || max_re == F::highest() {
        out[0] = max_re;
        out[1] = max_im;
    }
    if nan {
        out[0] = F::new(f32::NAN);
        out[1] = F::new(0.0);
    }

    out
}

macro_rules! impl_log_add_exp {
    ($($precision:ident: $float:ident),*) => {
        $(
            #[cube]
            impl ScanInstruction<$precision> for LogAddExp {
                fn identity(#[comptime] line_size: usize) -> Line<$float> {
                    Line::empty(line_size).fill($float::lowest())
                }

                fn combine(earlier: Line<$float>, later: Line<$float>) -> Line<$float> {
                    log_add_exp::<$float>(earlier, later)
                }

                fn plane_inclusive_scan(
                    value: Line<$float>,
                    #[comptime] line_size: usize,
                ) -> Line<$float> {
                    plane_inclusive_log_step::<$precision, Self>(value, line_size)
                }

                fn plane_exclusive_scan(
                    value: Line<$float>,
                    #[comptime] line_size: usize,
                ) -> Line<$float> {
                    plane_exclusive_log_step::<$precision, Self>(value, line_size)
                }
            }
        )*
    };
}

// Half precision inputs are combined in f32.
impl_log_add_exp!(f16: f32, bf16: f32, f32: f32, f64: f64);

macro_rules! impl_complex_log_add_exp {
    ($($complex:ident: $float:ident),*) => {
        $(
            #[cube]
            impl ScanInstruction<$complex> for LogAddExp {
                fn identity(#[comptime] line_size: usize) -> Line<$float> {
                    let mut identity = Line::<$float>::empty(line_size).fill($float::new(0.0));
                    identity[0] = $float::lowest();
                    identity
                }

                fn combine(earlier: Line<$float>, later: Line<$float>) -> Line<$float> {
                    complex_log_add_exp::<$float>(earlier, later)
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

impl_complex_log_add_exp!(Complex32: f32, Complex64: f64);
