use cubecl::prelude::*;
use half::{bf16, f16};

use crate::{Complex32, Complex64};

/// Numeric type a scan can accumulate in.
#[cube]
pub trait ScanBounds: Numeric {
    /// Smallest value, `-inf` for floats.
    fn lowest() -> Self;
    /// Largest value, `+inf` for floats.
    fn highest() -> Self;
}

macro_rules! impl_bounds_int {
    ($($ty:ident),*) => {
        $(
            #[cube]
            impl ScanBounds for $ty {
                fn lowest() -> Self {
                    Self::min_value()
                }

                fn highest() -> Self {
                    Self::max_value()
                }
            }
        )*
    };
}

impl_bounds_int!(i8, i16, i32, i64, u8, u16, u32, u64);

macro_rules! impl_bounds_float {
    ($($ty:ident),*) => {
        $(
            #[cube]
            impl ScanBounds for $ty {
                fn lowest() -> Self {
                    Self::new(f32::NEG_INFINITY)
                }

                fn highest() -> Self {
                    Self::new(f32::INFINITY)
                }
            }
        )*
    };
}

impl_bounds_float!(f16, bf16, f32, f64);

/// Element types of a scan.
///
/// The input is converted to the accumulator type when loaded, and the output holds
/// accumulator values.
pub trait ScanPrecision: Send + Sync + 'static {
    /// Element type of the input buffer.
    type EI: Numeric;
    /// Element type of the accumulation and of the output buffer.
    type EA: ScanBounds;

    /// Number of scalars making up one element. Complex elements are lines of their real and
    /// imaginary parts.
    const LINE_SIZE: usize = 1;
}

/// Precisions whose elements are single scalars.
pub trait RealPrecision: ScanPrecision {}

impl<EI: Numeric, EA: ScanBounds> ScanPrecision for (EI, EA) {
    type EI = EI;
    type EA = EA;
}

impl<EI: Numeric, EA: ScanBounds> RealPrecision for (EI, EA) {}

macro_rules! impl_precision {
    ($($ty:ident => $acc:ident),*) => {
        $(
            impl ScanPrecision for $ty {
                type EI = $ty;
                type EA = $acc;
            }

            impl RealPrecision for $ty {}
        )*
    };
}

// Half precision values accumulate in f32.
impl_precision!(
    i8 => i8, i16 => i16, i32 => i32, i64 => i64,
    u8 => u8, u16 => u16, u32 => u32, u64 => u64,
    f16 => f32, bf16 => f32, f32 => f32, f64 => f64
);

impl ScanPrecision for Complex32 {
    type EI = f32;
    type EA = f32;

    const LINE_SIZE: usize = 2;
}

impl ScanPrecision for Complex64 {
    type EI = f64;
    type EA = f64;

    const LINE_SIZE: usize = 2;
}

/// Size in bytes of one accumulator element.
pub fn accumulator_size<P: ScanPrecision>() -> usize {
    size_of::<P::EA>() * P::LINE_SIZE
}

/// Size in bytes of one input element.
pub fn input_size<P: ScanPrecision>() -> usize {
    size_of::<P::EI>() * P::LINE_SIZE
}
