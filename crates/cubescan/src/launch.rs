use cubecl::{features::TypeUsage, prelude::*, server::Handle};

use crate::{
    ScanConfig, ScanError, ScanLayout, ScanLimits, ScanStrategy,
    instructions::ScanInstruction,
    kernels::{
        ContiguousParams, ScanAxis, ScanParams, StridedParams, contiguous_scan, strided_scan,
    },
    precision::{ScanPrecision, accumulator_size, input_size},
};

/// Scan a row-major tensor of the given `shape` along `axis`.
///
/// `input` holds elements of `P::EI` and `output` receives elements of `P::EA`. The register tile
/// width is picked from the accumulator size: 4 elements up to 32 bits, 2 elements above.
pub fn scan<R: Runtime, P: ScanPrecision, I: ScanInstruction<P>>(
    client: &ComputeClient<R>,
    input: &Handle,
    output: &Handle,
    shape: &[usize],
    axis: usize,
    params: ScanParams,
    strategy: ScanStrategy,
) -> Result<(), ScanError> {
    let n_reads = match accumulator_size::<P>() <= 4 {
        true => 4,
        false => 2,
    };

    scan_with::<R, P, I>(client, input, output, shape, axis, params, strategy, n_reads)
}

/// Scan a row-major tensor with a register tile width of `n_reads` elements per unit.
#[allow(clippy::too_many_arguments)]
pub fn scan_with<R: Runtime, P: ScanPrecision, I: ScanInstruction<P>>(
    client: &ComputeClient<R>,
    input: &Handle,
    output: &Handle,
    shape: &[usize],
    axis: usize,
    params: ScanParams,
    strategy: ScanStrategy,
    n_reads: usize,
) -> Result<(), ScanError> {
    let rank = shape.len();
    if axis >= rank {
        return Err(ScanError::InvalidAxis { axis, rank });
    }

    let strategy = strategy.validate::<R>(client, n_reads)?;
    validate_elements::<R, P>(client)?;

    let expected = shape.iter().product::<usize>();
    let input_len = buffer_len(input, input_size::<P>());
    let output_len = buffer_len(output, accumulator_size::<P>());
    if input_len < expected || output_len < expected {
        return Err(ScanError::ShapeMismatch {
            expected,
            input: input_len,
            output: output_len,
        });
    }

    if expected == 0 {
        return Ok(());
    }

    let scan_axis = ScanAxis::new(shape[axis], shape[axis + 1..].iter().product());
    let batches = shape[..axis].iter().product::<usize>();
    let config = ScanConfig::generate(
        &ScanLimits::from_client(client),
        scan_axis,
        batches,
        n_reads,
        accumulator_size::<P>(),
        &strategy,
    )?;

    log::debug!("Scan {shape:?} along axis {axis} with {params:?} and {config:?}");

    match config.layout {
        ScanLayout::Contiguous => {
            launch_contiguous::<R, P, I>(client, input, output, scan_axis, batches, params, &config)
        }
        ScanLayout::Strided => {
            launch_strided::<R, P, I>(client, input, output, scan_axis, batches, params, &config)
        }
    }
}

/// Launch the contiguous kernel over `rows` rows. This function assumes the buffers hold
/// `rows * axis.length` elements and that the configuration was generated for them.
pub fn launch_contiguous<R: Runtime, P: ScanPrecision, I: ScanInstruction<P>>(
    client: &ComputeClient<R>,
    input: &Handle,
    output: &Handle,
    axis: ScanAxis,
    rows: usize,
    params: ScanParams,
    config: &ScanConfig,
) -> Result<(), ScanError> {
    let plane_dim = client.properties().hardware.plane_size_max;
    let len = rows * axis.length;
    let settings = ContiguousParams::new(
        params,
        config.n_reads,
        P::LINE_SIZE,
        config.plane_count(plane_dim),
    );
    let (x, y, z) = config.cube_count;

    unsafe {
        contiguous_scan::launch_unchecked::<P, I, R>(
            client,
            CubeCount::Static(x, y, z),
            config.cube_dim,
            ArrayArg::from_raw_parts::<P::EI>(input, len * P::LINE_SIZE, P::LINE_SIZE),
            ArrayArg::from_raw_parts::<P::EA>(output, len * P::LINE_SIZE, P::LINE_SIZE),
            ScalarArg::new(axis.length),
            ScalarArg::new(rows),
            settings,
        )
    }?;

    Ok(())
}

/// Launch the strided kernel over `batches` batches. This function assumes the buffers hold
/// `batches * axis.length * axis.stride` elements and that the configuration was generated for
/// them.
pub fn launch_strided<R: Runtime, P: ScanPrecision, I: ScanInstruction<P>>(
    client: &ComputeClient<R>,
    input: &Handle,
    output: &Handle,
    axis: ScanAxis,
    batches: usize,
    params: ScanParams,
    config: &ScanConfig,
) -> Result<(), ScanError> {
    let plane_dim = client.properties().hardware.plane_size_max;
    let len = batches * axis.length * axis.stride;
    let stride_blocks = axis.stride_blocks(config.tile_width);
    let settings = StridedParams::new(
        params,
        config.n_reads,
        P::LINE_SIZE,
        plane_dim,
        config.tile_width,
        config.tile_pitch,
    );
    let (x, y, z) = config.cube_count;

    unsafe {
        strided_scan::launch_unchecked::<P, I, R>(
            client,
            CubeCount::Static(x, y, z),
            config.cube_dim,
            ArrayArg::from_raw_parts::<P::EI>(input, len * P::LINE_SIZE, P::LINE_SIZE),
            ArrayArg::from_raw_parts::<P::EA>(output, len * P::LINE_SIZE, P::LINE_SIZE),
            ScalarArg::new(axis.length),
            ScalarArg::new(axis.stride),
            ScalarArg::new(stride_blocks),
            ScalarArg::new(batches * stride_blocks),
            settings,
        )
    }?;

    Ok(())
}

fn validate_elements<R: Runtime, P: ScanPrecision>(
    client: &ComputeClient<R>,
) -> Result<(), ScanError> {
    if !P::EI::supported_uses(client).contains(TypeUsage::Buffer) {
        return Err(ScanError::UnsupportedElement {
            name: core::any::type_name::<P::EI>(),
        });
    }

    if !P::EA::supported_uses(client).contains(TypeUsage::Arithmetic) {
        return Err(ScanError::UnsupportedElement {
            name: core::any::type_name::<P::EA>(),
        });
    }

    Ok(())
}

// Number of whole elements of `elem_size` bytes a buffer holds.
fn buffer_len(handle: &Handle, elem_size: usize) -> usize {
    usize::try_from(handle.size()).unwrap_or(usize::MAX) / elem_size.max(1)
}
