use bytemuck::{Pod, Zeroable};
use cubecl::{TestRuntime, prelude::*, server::Handle};
use cubescan::{
    Complex32, ScanError, ScanStrategy,
    instructions::{And, LogAddExp, Max, Min, Prod, ScanInstruction, Sum},
    kernels::ScanParams,
    precision::ScanPrecision,
    scan, scan_with,
};
use half::f16;
use pretty_assertions::assert_eq;

fn client() -> ComputeClient<TestRuntime> {
    TestRuntime::client(&Default::default())
}

fn upload<T: Pod>(client: &ComputeClient<TestRuntime>, values: &[T]) -> Handle {
    match values.is_empty() {
        true => client.empty(size_of::<T>()),
        false => client.create_from_slice(bytemuck::cast_slice(values)),
    }
}

fn is_unsupported(err: &ScanError) -> bool {
    matches!(
        err,
        ScanError::PlanesUnavailable
            | ScanError::ImprecisePlaneDim { .. }
            | ScanError::UnsupportedElement { .. }
    )
}

/// Scan `input` with a register tile width of `n_reads`, reading the output back as `Out`.
fn try_scan<P, I, In, Out>(
    input: &[In],
    shape: &[usize],
    axis: usize,
    params: ScanParams,
    strategy: ScanStrategy,
    n_reads: Option<usize>,
) -> Result<Vec<Out>, ScanError>
where
    P: ScanPrecision,
    I: ScanInstruction<P>,
    In: Pod,
    Out: Pod,
{
    let client = client();
    let len = shape.iter().product::<usize>();
    let input = upload(&client, input);
    let output = upload(&client, &vec![Out::zeroed(); len]);

    match n_reads {
        Some(n_reads) => scan_with::<TestRuntime, P, I>(
            &client, &input, &output, shape, axis, params, strategy, n_reads,
        )?,
        None => scan::<TestRuntime, P, I>(&client, &input, &output, shape, axis, params, strategy)?,
    }

    let bytes = client.read_one(output);
    let mut values = bytemuck::pod_collect_to_vec::<u8, Out>(&bytes);
    values.truncate(len);
    Ok(values)
}

/// Scan with the default strategy. `None` when the test runtime can't run the scan.
fn scan_vec<P, I, In, Out>(
    input: &[In],
    shape: &[usize],
    axis: usize,
    params: ScanParams,
) -> Option<Vec<Out>>
where
    P: ScanPrecision,
    I: ScanInstruction<P>,
    In: Pod,
    Out: Pod,
{
    match try_scan::<P, I, In, Out>(input, shape, axis, params, Default::default(), None) {
        Ok(output) => Some(output),
        Err(err) if is_unsupported(&err) => None,
        Err(err) => panic!("Scan of {shape:?} along {axis} failed: {err}"),
    }
}

fn transpose<T: Copy>(values: &[T], rows: usize, columns: usize) -> Vec<T> {
    (0..rows * columns)
        .map(|index| values[(index % rows) * columns + index / rows])
        .collect()
}

#[test_log::test]
fn sum_of_four_elements() {
    let input = [1i32, 2, 3, 4];
    let cases = [
        (ScanParams::new(true, false), [1, 3, 6, 10]),
        (ScanParams::new(false, false), [0, 1, 3, 6]),
        (ScanParams::new(true, true), [10, 9, 7, 4]),
        (ScanParams::new(false, true), [9, 7, 4, 0]),
    ];

    for (params, expected) in cases {
        let Some(output) = scan_vec::<i32, Sum, i32, i32>(&input, &[4], 0, params) else {
            return;
        };
        assert_eq!(output, expected.to_vec(), "{params:?}");
    }
}

#[test_log::test]
fn max_propagates_nan() {
    let Some(output) = scan_vec::<f32, Max, f32, f32>(
        &[1.0, 5.0, f32::NAN, 3.0],
        &[4],
        0,
        ScanParams::new(true, false),
    ) else {
        return;
    };

    assert_eq!(&output[..2], &[1.0, 5.0]);
    assert!(output[2].is_nan() && output[3].is_nan());
}

#[test_log::test]
fn boolean_and_along_columns() {
    let input = [1u32, 1, 0, 1, 1, 1];
    let Some(output) =
        scan_vec::<u32, And, u32, u32>(&input, &[3, 2], 0, ScanParams::new(true, false))
    else {
        return;
    };

    assert_eq!(output, vec![1, 1, 0, 1, 0, 1]);
}

#[test_log::test]
fn half_input_accumulates_in_f32() {
    // The running sum exceeds the largest finite f16.
    let input = vec![f16::from_f32(60000.0); 3];
    let Some(output) = scan_vec::<f16, Sum, f16, f32>(&input, &[3], 0, ScanParams::new(true, false))
    else {
        return;
    };

    assert_eq!(output, vec![60000.0f32, 120000.0, 180000.0]);
}

#[test_log::test]
fn complex_product_rotates() {
    let input = vec![Complex32::new(0.0, 1.0); 8];
    let Some(output) =
        scan_vec::<Complex32, Prod, Complex32, Complex32>(&input, &[8], 0, ScanParams::new(true, false))
    else {
        return;
    };

    let powers = [
        Complex32::new(0.0, 1.0),
        Complex32::new(-1.0, 0.0),
        Complex32::new(0.0, -1.0),
        Complex32::new(1.0, 0.0),
    ];
    for (i, value) in output.iter().enumerate() {
        assert_eq!(*value, powers[i % 4], "Position {i}");
    }
}

#[test_log::test]
fn complex_log_add_exp_of_equal_values() {
    let input = vec![Complex32::new(0.0, 0.0); 8];
    let Some(output) = scan_vec::<Complex32, LogAddExp, Complex32, Complex32>(
        &input,
        &[8],
        0,
        ScanParams::new(true, false),
    ) else {
        return;
    };

    for (i, value) in output.iter().enumerate() {
        assert!((value.re - ((i + 1) as f32).ln()).abs() < 1e-5, "Position {i}: {value:?}");
        assert!(value.im.abs() < 1e-5, "Position {i}: {value:?}");
    }
}

#[test_log::test]
fn contiguous_and_strided_agree_on_integers() {
    // The same data, laid out as a [rows, length] and a [length, rows] tensor.
    let (rows, length) = (7, 300);
    let data = (0..rows * length)
        .map(|v| (v % 13) as i32 - 6)
        .collect::<Vec<_>>();
    let transposed = transpose(&data, rows, length);

    for params in [ScanParams::new(true, false), ScanParams::new(false, true)] {
        let Some(contiguous) = scan_vec::<i32, Sum, i32, i32>(&data, &[rows, length], 1, params)
        else {
            return;
        };
        let Some(strided) =
            scan_vec::<i32, Sum, i32, i32>(&transposed, &[length, rows], 0, params)
        else {
            return;
        };

        assert_eq!(contiguous, transpose(&strided, length, rows));
    }
}

#[test_log::test]
fn contiguous_and_strided_agree_on_floats() {
    // Quarters stay exact in f32 whatever the combine order, so both layouts match bit for bit
    // even though they group the elements differently.
    let (rows, length) = (5, 1000);
    let data = (0..rows * length)
        .map(|v| ((v * 7) % 17) as f32 / 4.0 - 2.0)
        .collect::<Vec<_>>();
    let transposed = transpose(&data, rows, length);

    for params in [ScanParams::new(true, false), ScanParams::new(false, true)] {
        let Some(contiguous) = scan_vec::<f32, Sum, f32, f32>(&data, &[rows, length], 1, params)
        else {
            return;
        };
        let Some(strided) =
            scan_vec::<f32, Sum, f32, f32>(&transposed, &[length, rows], 0, params)
        else {
            return;
        };
        assert_eq!(contiguous, transpose(&strided, length, rows));

        let Some(contiguous) = scan_vec::<f32, Min, f32, f32>(&data, &[rows, length], 1, params)
        else {
            return;
        };
        let Some(strided) =
            scan_vec::<f32, Min, f32, f32>(&transposed, &[length, rows], 0, params)
        else {
            return;
        };
        assert_eq!(contiguous, transpose(&strided, length, rows));
    }
}

#[test_log::test]
fn exclusive_scan_around_tile_boundaries() {
    // Lengths where the last register tile is full, one short, or one over.
    for length in [3, 4, 5, 127, 128, 129, 4096, 4097] {
        let input = vec![1i32; length];

        for reverse in [false, true] {
            let Some(output) = scan_vec::<i32, Sum, i32, i32>(
                &input,
                &[length],
                0,
                ScanParams::new(false, reverse),
            ) else {
                return;
            };

            let expected = match reverse {
                false => (0..length as i32).collect::<Vec<_>>(),
                true => (0..length as i32).rev().collect::<Vec<_>>(),
            };
            assert_eq!(output, expected, "length {length}, reverse {reverse}");
        }
    }
}

#[test_log::test]
fn register_tile_width_does_not_change_results() {
    let input = (0..1000).map(|v| (v % 5) as u32).collect::<Vec<_>>();
    let params = ScanParams::new(false, false);

    let mut outputs = Vec::new();
    for n_reads in [1, 8] {
        match try_scan::<u32, Sum, u32, u32>(
            &input,
            &[10, 100],
            0,
            params,
            ScanStrategy::default(),
            Some(n_reads),
        ) {
            Ok(output) => outputs.push(output),
            Err(err) if is_unsupported(&err) => return,
            Err(err) => panic!("{err}"),
        }
    }

    assert_eq!(outputs[0], outputs[1]);
}

#[test]
fn invalid_problems_are_rejected() {
    let input = [1.0f32; 6];
    let params = ScanParams::default();
    let run = |shape: &[usize], axis: usize, strategy: ScanStrategy| {
        try_scan::<f32, Sum, f32, f32>(&input, shape, axis, params, strategy, None)
    };

    assert!(matches!(
        run(&[2, 3], 2, Default::default()),
        Err(ScanError::InvalidAxis { axis: 2, rank: 2 })
    ));

    let strategy = ScanStrategy {
        tile_width: 7,
        ..Default::default()
    };
    assert!(matches!(
        run(&[2, 3], 0, strategy),
        Err(ScanError::InvalidTileWidth {
            tile_width: 7,
            n_reads: 4,
        })
    ));

    // The output buffer is sized from the shape, so only the input is short.
    match run(&[2, 4], 0, Default::default()) {
        Err(err) if is_unsupported(&err) => {}
        result => assert!(matches!(
            result,
            Err(ScanError::ShapeMismatch {
                expected: 8,
                input: 6,
                output: 8,
            })
        )),
    }
}

#[test]
fn empty_tensors_are_a_no_op() {
    let result = try_scan::<f32, Sum, f32, f32>(
        &[],
        &[3, 0, 2],
        1,
        ScanParams::default(),
        Default::default(),
        None,
    );

    match result {
        Err(err) if is_unsupported(&err) => {}
        result => assert!(matches!(result.as_deref(), Ok([]))),
    }
}
