// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for frame ingest and depth visualization

use rgbd_mesh::constants::{DEFAULT_FAR_CLIP, DEFAULT_NEAR_CLIP, DISPARITY_INVALID};
use rgbd_mesh::ingest::visualization::{DepthColormap, depth_to_rgba};
use rgbd_mesh::{ColorFrame, DepthFormat, DepthFrame, RenderError};

#[test]
fn test_driver_bytes_round_into_samples() {
    let samples: [u16; 4] = [0, 1000, 2000, 65535];
    let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_ne_bytes()).collect();
    let frame = DepthFrame::from_ne_bytes(2, 2, &bytes).unwrap();
    assert_eq!(frame.samples(), &samples);
    assert_eq!(frame.raw_at(1, 0), Some(1000));
    assert_eq!(frame.raw_at(2, 0), None);
}

#[test]
fn test_sample_count_must_match_dimensions() {
    assert!(matches!(
        DepthFrame::new(4, 4, vec![0; 15]),
        Err(RenderError::InvalidParameter(_))
    ));
    assert!(DepthFrame::from_ne_bytes(2, 2, &[0; 7]).is_err());
}

#[test]
fn test_disparity_frame_conversion() {
    let frame = DepthFrame::from_format(
        2,
        1,
        &[600 << 6, DISPARITY_INVALID],
        DepthFormat::Disparity16,
    )
    .unwrap();
    assert!(frame.raw_at(0, 0).unwrap() > 0);
    assert_eq!(frame.raw_at(1, 0), Some(0));
}

#[test]
fn test_units_per_sample_scales_depth() {
    let frame = DepthFrame::filled(2, 2, 250)
        .with_units_per_sample(4.0)
        .unwrap();
    assert_eq!(frame.depth_at(1, 1), Some(1000.0));
    assert!(DepthFrame::filled(1, 1, 1).with_units_per_sample(0.0).is_err());
}

#[test]
fn test_color_frame_from_rgb() {
    let frame = ColorFrame::from_rgb(2, 1, &[10, 20, 30, 40, 50, 60]).unwrap();
    assert_eq!(frame.image().get_pixel(1, 0).0, [40, 50, 60, 255]);
    assert!(ColorFrame::from_rgb(2, 2, &[0; 6]).is_err());
}

#[test]
fn test_depth_preview_marks_invalid_black() {
    let frame = DepthFrame::new(3, 1, vec![0, 1000, 9000]).unwrap();
    let image = depth_to_rgba(
        &frame,
        DEFAULT_NEAR_CLIP,
        DEFAULT_FAR_CLIP,
        DepthColormap::Grayscale,
        false,
    );
    assert_eq!(image.dimensions(), (3, 1));
    assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 255]);
    assert_ne!(image.get_pixel(1, 0).0, [0, 0, 0, 255]);
    assert_eq!(image.get_pixel(2, 0).0, [0, 0, 0, 255]);
}
