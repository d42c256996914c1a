//! End-to-end properties of the pixelation filter
//!
//! These tests drive the public API with synthetic images and check the
//! invariants the filter guarantees regardless of content.

use blockpix::buffer::{Channels, PixelBuffer};
use blockpix::pixelate::{
    tile_grid, GridDriver, ParallelConfig, PixelateSettings, Pixelator, RemainderMode,
};

/// Settings with no blur and no boost, everything else explicit
fn settings(base_size: u32, contrast_thresh: f64, min_size: u32) -> PixelateSettings {
    PixelateSettings {
        base_size,
        contrast_thresh,
        min_size,
        blur_radius: 0.0,
        edge_preserve: 1.0,
        color_boost: 1.0,
        remainder: RemainderMode::Leave,
    }
}

/// Deterministic RGB noise
fn noise(width: u32, height: u32) -> PixelBuffer {
    let mut state: u64 = 0x9e37_79b9_7f4a_7c15;
    PixelBuffer::from_fn(width, height, Channels::Rgb, |_, _| {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        [(state >> 8) as u8, (state >> 24) as u8, (state >> 40) as u8]
    })
}

fn render(source: &PixelBuffer, settings: PixelateSettings) -> PixelBuffer {
    Pixelator::new(settings)
        .expect("valid settings")
        .pixelate(source)
        .expect("render succeeds")
        .image
}

#[test]
fn test_scenario_uniform_gray_is_unchanged() {
    let source = PixelBuffer::from_fn(8, 8, Channels::Gray, |_, _| [128, 0, 0]);
    let s = PixelateSettings { edge_preserve: 0.5, ..settings(8, 20.0, 4) };
    assert_eq!(render(&source, s), source);
}

#[test]
fn test_scenario_quadrant_checkerboard_splits_into_quadrants() {
    let source = PixelBuffer::from_fn(8, 8, Channels::Gray, |x, y| {
        if (x < 4) == (y < 4) {
            [0; 3]
        } else {
            [255; 3]
        }
    });
    let output = render(&source, settings(8, 0.0, 2));
    assert_eq!(output, source);
}

#[test]
fn test_scenario_small_checkerboard_stays_whole() {
    let source = PixelBuffer::from_fn(4, 4, Channels::Gray, |x, y| {
        if (x < 2) == (y < 2) {
            [0; 3]
        } else {
            [255; 3]
        }
    });
    let output = render(&source, settings(4, 0.0, 2));
    assert!(output.as_raw().iter().all(|&v| v == 127));
}

#[test]
fn test_scenario_min_size_equal_to_base_never_splits() {
    let source = noise(64, 48);
    let s = settings(16, 0.0, 16);
    let rendering =
        Pixelator::new(s).expect("valid settings").pixelate(&source).expect("render succeeds");
    assert_eq!(rendering.stats.splits, 0);
    assert_eq!(rendering.stats.leaves, 12);
    assert_eq!(rendering.stats.max_depth, 0);
}

#[test]
fn test_dimensions_and_layout_are_preserved() {
    for (w, h) in [(1, 1), (3, 17), (31, 9), (64, 64), (100, 37)] {
        for channels in [Channels::Gray, Channels::Rgb] {
            let source = PixelBuffer::from_fn(w, h, channels, |x, y| {
                [(x * 13 + y) as u8, (y * 7) as u8, (x ^ y) as u8]
            });
            let output = render(&source, settings(16, 5.0, 2));
            assert_eq!(output.dimensions(), (w, h));
            assert_eq!(output.channels(), channels);
        }
    }
}

#[test]
fn test_uniform_input_is_fixed_point_for_any_settings() {
    for color in [[0, 0, 0], [255, 255, 255], [12, 200, 99]] {
        let source = PixelBuffer::from_fn(40, 24, Channels::Rgb, |_, _| color);
        for base_size in [4, 16, 64] {
            for min_size in [2, 4, 16] {
                let s = settings(base_size, 0.0, min_size);
                assert_eq!(render(&source, s), source, "base {} min {}", base_size, min_size);
            }
        }
    }
}

#[test]
fn test_full_boost_clamps_to_range() {
    let source = PixelBuffer::from_fn(8, 8, Channels::Rgb, |_, _| [254, 1, 128]);
    let s = PixelateSettings { color_boost: 2.0, ..settings(8, 20.0, 4) };
    let output = render(&source, s);
    assert_eq!(output.pixel(0, 0), &[255, 0, 128]);
}

#[test]
fn test_power_of_two_image_is_fully_painted() {
    let source = noise(64, 64);
    let rendering = Pixelator::new(settings(16, 10.0, 2))
        .expect("valid settings")
        .pixelate(&source)
        .expect("render succeeds");
    assert_eq!(rendering.stats.painted_pixels, 64 * 64);
    assert_eq!(rendering.stats.abandoned_blocks, 0);
}

#[test]
fn test_fill_mode_leaves_no_pixel_unpainted() {
    let source = noise(37, 23);
    let s = PixelateSettings { remainder: RemainderMode::Fill, ..settings(16, 0.0, 4) };
    let (output, stats) = GridDriver::new(&source, &s).render().expect("render succeeds");
    assert_eq!(stats.painted_pixels, 37 * 23);

    // Every pixel now belongs to a uniform leaf, so re-rendering changes nothing
    let (again, _) = GridDriver::new(&output, &s).render().expect("render succeeds");
    assert_eq!(again, output);
}

#[test]
fn test_leave_mode_keeps_uncovered_pixels() {
    let source = noise(37, 23);
    let s = settings(16, 0.0, 4);
    let output = render(&source, s);

    let mut covered = vec![false; 37 * 23];
    for tile in tile_grid(37, 23, 16, RemainderMode::Leave) {
        for y in tile.y..tile.y + tile.height {
            for x in tile.x..tile.x + tile.width {
                covered[(y * 37 + x) as usize] = true;
            }
        }
    }
    for y in 0..23 {
        for x in 0..37 {
            if !covered[(y * 37 + x) as usize] {
                assert_eq!(output.pixel(x, y), source.pixel(x, y), "pixel ({}, {})", x, y);
            }
        }
    }
}

#[test]
fn test_parallel_output_is_byte_identical() {
    let source = noise(150, 90);
    let s = PixelateSettings { edge_preserve: 0.7, color_boost: 1.3, ..settings(32, 12.0, 2) };
    let sequential = Pixelator::new(s)
        .expect("valid settings")
        .with_parallelism(ParallelConfig::sequential())
        .expect("no pool needed")
        .pixelate(&source)
        .expect("render succeeds");
    let parallel = Pixelator::new(s)
        .expect("valid settings")
        .with_parallelism(ParallelConfig { enabled: true, threads: 4, fork_min_size: 4 })
        .expect("pool builds")
        .pixelate(&source)
        .expect("render succeeds");
    assert_eq!(sequential.image.as_raw(), parallel.image.as_raw());
    assert_eq!(sequential.stats, parallel.stats);
}

#[test]
fn test_higher_threshold_never_adds_leaves() {
    let source = noise(64, 64);
    let mut previous = usize::MAX;
    for thresh in [0.0, 10.0, 25.0, 50.0] {
        let leaves = Pixelator::new(settings(32, thresh, 2))
            .expect("valid settings")
            .pixelate(&source)
            .expect("render succeeds")
            .stats
            .leaves;
        assert!(leaves <= previous, "threshold {} produced {} leaves", thresh, leaves);
        previous = leaves;
    }
}

#[test]
fn test_blur_runs_before_subdivision() {
    let source = PixelBuffer::from_fn(16, 16, Channels::Gray, |x, _| if x < 8 { [0; 3] } else { [255; 3] });
    let sharp = render(&source, settings(16, 50.0, 16));
    let blurred = render(&source, PixelateSettings { blur_radius: 3.0, ..settings(16, 50.0, 16) });
    // One leaf per tile either way
    assert!(sharp.as_raw().iter().all(|&v| v == 127));
    let first = blurred.pixel(0, 0)[0];
    assert!(blurred.as_raw().iter().all(|&v| v == first));
}
