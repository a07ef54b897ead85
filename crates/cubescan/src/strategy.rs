use cubecl::{features::Plane, prelude::*};
use serde::{Deserialize, Serialize};

use crate::ScanError;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct ScanStrategy {
    /// Upper bound on the number of units of a contiguous scan cube. The hardware limit and the
    /// square of the plane dim still apply, since the plane totals are scanned by a single plane.
    pub max_units_per_cube: u32,

    /// Number of adjacent columns scanned by one cube of a strided scan.
    /// Must be a multiple of the register tile width. Narrowed when the tile doesn't fit in the
    /// shared memory or the unit limit of the hardware.
    pub tile_width: u32,
}

impl Default for ScanStrategy {
    fn default() -> Self {
        Self {
            max_units_per_cube: 1024,
            tile_width: 32,
        }
    }
}

impl ScanStrategy {
    /// Check the strategy against the register tile width and the capabilities of the client.
    pub fn validate<R: Runtime>(
        self,
        client: &ComputeClient<R>,
        n_reads: usize,
    ) -> Result<Self, ScanError> {
        let tile_width = self.tile_width as usize;

        if n_reads == 0 || tile_width == 0 || tile_width % n_reads != 0 {
            return Err(ScanError::InvalidTileWidth {
                tile_width,
                n_reads,
            });
        }

        if !support_plane(client) {
            return Err(ScanError::PlanesUnavailable);
        }

        let hardware = &client.properties().hardware;
        if hardware.plane_size_min != hardware.plane_size_max {
            return Err(ScanError::ImprecisePlaneDim {
                min: hardware.plane_size_min,
                max: hardware.plane_size_max,
            });
        }

        Ok(self)
    }
}

fn support_plane<R: Runtime>(client: &ComputeClient<R>) -> bool {
    client.properties().features.plane.contains(Plane::Ops)
}
