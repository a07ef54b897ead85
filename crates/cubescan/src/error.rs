use cubecl::server::LaunchError;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ScanError {
    /// The scanned axis is not a dimension of the tensor.
    #[error("Can't scan along axis {axis} of a tensor of rank {rank}")]
    InvalidAxis { axis: usize, rank: usize },

    /// A buffer holds fewer elements than the shape describes.
    #[error(
        "The shape describes {expected} elements, but the input holds {input} and the output {output}"
    )]
    ShapeMismatch {
        expected: usize,
        input: usize,
        output: usize,
    },

    /// The strided tile can't be split in register tiles.
    #[error("The tile width {tile_width} must be a non-zero multiple of {n_reads}")]
    InvalidTileWidth { tile_width: usize, n_reads: usize },

    /// The client doesn't support plane operations.
    #[error("Trying to launch a kernel using plane instructions, but they are not supported by the hardware.")]
    PlanesUnavailable,

    /// The plane size of the client is not known ahead of the launch.
    #[error("The plane dim of the hardware ranges from {min} to {max}, a fixed plane dim is required.")]
    ImprecisePlaneDim { min: u32, max: u32 },

    /// The client can't store or compute with an element type of the scan.
    #[error("The element type {name} is not supported by the hardware")]
    UnsupportedElement { name: &'static str },

    /// The scan needs more cubes than the hardware can dispatch.
    #[error("Can't dispatch {num_cubes} cubes with at most {max:?} cubes per dimension")]
    CubeCountTooLarge {
        num_cubes: usize,
        max: (u32, u32, u32),
    },

    /// Even the narrowest strided tile doesn't fit in shared memory.
    #[error("A cube needs {requested} bytes of shared memory, but at most {max} are available")]
    SharedMemoryExceeded { requested: usize, max: usize },

    /// The runtime refused the launch.
    #[error(transparent)]
    Launch(#[from] LaunchError),
}
