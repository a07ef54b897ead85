mod and;
mod base;
mod logaddexp;
mod max;
mod min;
mod prod;
mod sum;

pub use and::*;
pub use base::*;
pub use logaddexp::*;
pub use max::*;
pub use min::*;
pub use prod::*;
pub use sum::*;
