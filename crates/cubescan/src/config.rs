use cubecl::prelude::*;

use crate::{
    ScanError, ScanStrategy,
    kernels::{ScanAxis, StridedParams},
};

/// Kernel used for a scan, depending on the memory layout of the axis.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ScanLayout {
    /// The scanned elements are adjacent in memory.
    Contiguous,
    /// The scanned elements are `stride` apart.
    Strided,
}

/// Hardware limits a launch must respect.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanLimits {
    pub plane_dim: u32,
    pub max_units_per_cube: u32,
    /// In bytes.
    pub max_shared_memory: usize,
    pub max_cube_count: (u32, u32, u32),
}

impl ScanLimits {
    pub fn from_client<R: Runtime>(client: &ComputeClient<R>) -> Self {
        let hardware = &client.properties().hardware;

        Self {
            plane_dim: hardware.plane_size_max,
            max_units_per_cube: hardware.max_units_per_cube.min(hardware.max_cube_dim.0),
            max_shared_memory: hardware.max_shared_memory_size,
            max_cube_count: hardware.max_cube_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Cubes along x, y and z. Cubes past the number of rows or blocks exit immediately.
    pub cube_count: (u32, u32, u32),
    pub cube_dim: CubeDim,
    pub layout: ScanLayout,
    /// Number of elements held in registers by a unit.
    pub n_reads: usize,
    /// Number of columns of a strided cube.
    pub tile_width: usize,
    /// Row pitch of the shared tile of a strided cube.
    pub tile_pitch: usize,
}

impl ScanConfig {
    /// Pick the kernel and size the launch.
    ///
    /// `elem_size` is the size in bytes of one accumulator element.
    pub fn generate(
        limits: &ScanLimits,
        axis: ScanAxis,
        batches: usize,
        n_reads: usize,
        elem_size: usize,
        strategy: &ScanStrategy,
    ) -> Result<ScanConfig, ScanError> {
        ScanConfig::new(n_reads, strategy)
            .generate_layout(axis)
            .generate_tile(limits, elem_size)?
            .generate_cube_dim(limits, axis, strategy)
            .generate_cube_count(limits, axis, batches)
    }

    /// Number of planes of a cube.
    pub fn plane_count(&self, plane_dim: u32) -> usize {
        self.cube_dim.num_elems().div_ceil(plane_dim) as usize
    }

    fn new(n_reads: usize, strategy: &ScanStrategy) -> Self {
        // This is only a dummy configuration to use as a starting point.
        Self {
            cube_count: (1, 1, 1),
            cube_dim: CubeDim::new_single(),
            layout: ScanLayout::Contiguous,
            n_reads,
            tile_width: strategy.tile_width as usize,
            tile_pitch: 0,
        }
    }

    fn generate_layout(mut self, axis: ScanAxis) -> Self {
        self.layout = if axis.is_contiguous() {
            ScanLayout::Contiguous
        } else {
            ScanLayout::Strided
        };
        self
    }

    // Halve the strided tile until its shared memory and its units fit the hardware.
    fn generate_tile(mut self, limits: &ScanLimits, elem_size: usize) -> Result<Self, ScanError> {
        let plane_dim = limits.plane_dim as usize;

        let shared_memory = match self.layout {
            ScanLayout::Contiguous => {
                let plane_count = (limits.max_units_per_cube as usize).div_ceil(plane_dim);
                return self.check_shared_memory(limits, (plane_count + 1) * elem_size);
            }
            ScanLayout::Strided => loop {
                self.tile_pitch = StridedParams::padded_width(self.tile_width, elem_size);

                let shared_memory = plane_dim * self.tile_pitch * elem_size;
                let units = plane_dim * self.tile_width / self.n_reads;
                let fits = shared_memory <= limits.max_shared_memory
                    && units <= limits.max_units_per_cube as usize;

                if fits || self.tile_width == self.n_reads {
                    break shared_memory;
                }

                self.tile_width = (self.tile_width / 2).max(self.n_reads) / self.n_reads
                    * self.n_reads;
            },
        };

        self.check_shared_memory(limits, shared_memory)
    }

    fn check_shared_memory(self, limits: &ScanLimits, requested: usize) -> Result<Self, ScanError> {
        match requested <= limits.max_shared_memory {
            true => Ok(self),
            false => Err(ScanError::SharedMemoryExceeded {
                requested,
                max: limits.max_shared_memory,
            }),
        }
    }

    fn generate_cube_dim(
        mut self,
        limits: &ScanLimits,
        axis: ScanAxis,
        strategy: &ScanStrategy,
    ) -> Self {
        let plane_dim = limits.plane_dim as usize;

        let units = match self.layout {
            ScanLayout::Contiguous => {
                let max_units = (strategy.max_units_per_cube as usize)
                    .min(limits.max_units_per_cube as usize)
                    .min(plane_dim * plane_dim);
                let max_units = (max_units / plane_dim).max(1) * plane_dim;

                let units = axis.length.div_ceil(self.n_reads).next_power_of_two();
                (units.div_ceil(plane_dim) * plane_dim).clamp(plane_dim, max_units)
            }
            ScanLayout::Strided => plane_dim * self.tile_width / self.n_reads,
        };

        self.cube_dim = CubeDim::new_1d(units as u32);
        self
    }

    fn generate_cube_count(
        mut self,
        limits: &ScanLimits,
        axis: ScanAxis,
        batches: usize,
    ) -> Result<Self, ScanError> {
        let num_cubes = match self.layout {
            ScanLayout::Contiguous => batches,
            ScanLayout::Strided => batches * axis.stride_blocks(self.tile_width),
        };

        self.cube_count = spread_cube_count(num_cubes, limits.max_cube_count).ok_or(
            ScanError::CubeCountTooLarge {
                num_cubes,
                max: limits.max_cube_count,
            },
        )?;
        Ok(self)
    }
}

// Fill x first, then y, then z.
fn spread_cube_count(num_cubes: usize, max: (u32, u32, u32)) -> Option<(u32, u32, u32)> {
    let num_cubes = u64::try_from(num_cubes).ok()?.max(1);
    let (max_x, max_y, max_z) = (max.0 as u64, max.1 as u64, max.2 as u64);

    let x = num_cubes.min(max_x);
    let y = num_cubes.div_ceil(x).min(max_y);
    let z = num_cubes.div_ceil(x * y);

    if z > max_z {
        return None;
    }

    Some((
        u32::try_from(x).ok()?,
        u32::try_from(y).ok()?,
        u32::try_from(z).ok()?,
    ))
}
