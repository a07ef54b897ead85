
pub use case::*;
pub use reference::*;

/// Generate the scan test grid: every operator over every element type it supports, for
/// contiguous and strided axes, forward and reverse, inclusive and exclusive.
///
/// `TestRuntime`, `f16` and `Complex32` must be in scope at the call site.
#[allow(missing_docs)]
#[macro_export]
macro_rules! testgen_scan {
    () => {
        mod test_scan {
            use super::*;

            $crate::testgen_scan!(@group [i32, u32]: [
                Sum: Small, Prod: Small, Max: Small, Min: Small, And: Flags
            ]);
            $crate::testgen_scan!(@group [f32]: [
                Sum: Small, Prod: Signs, Max: Small, Min: Small, LogAddExp: Small
            ]);
            $crate::testgen_scan!(@group [f16]: [Sum: Small, Max: Small, LogAddExp: Small]);
            $crate::testgen_scan!(@group [Complex32]: [Sum: Small, LogAddExp: Small]);
        }
    };
    (@group [$($precision:ident),*]: $instructions:tt) => {
        $(
            $crate::testgen_scan!(@precision $precision: $instructions);
        )*
    };
    (@precision $precision:ident: [$($instruction:ident: $values:ident),*]) => {
        $(
            ::paste::paste! {
                #[test]
                fn [<test_scan_ $precision:lower _ $instruction:lower>]() {
                    $crate::tests::test_grid::<
                        TestRuntime,
                        $precision,
                        $crate::instructions::$instruction,
                    >(&Default::default(), $crate::tests::Values::$values);
                }
            }
        )*
    };
}
