macro_rules! impl_complex {
    ($($name:ident: $float:ty),*) => {
        $(
            #[doc = concat!("Complex number with `", stringify!($float), "` components.")]
            ///
            /// Buffers of complex numbers hold the real and imaginary parts of each element next
            /// to each other, which is how the scan kernels read them.
            #[repr(C)]
            #[derive(
                new,
                Clone,
                Copy,
                Debug,
                Default,
                PartialEq,
                bytemuck::Pod,
                bytemuck::Zeroable,
                serde::Serialize,
                serde::Deserialize,
            )]
            pub struct $name {
                /// Real part.
                pub re: $float,
                /// Imaginary part.
                pub im: $float,
            }
        )*
    };
}

impl_complex!(Complex32: f32, Complex64: f64);
