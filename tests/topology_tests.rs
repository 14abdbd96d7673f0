// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the mesh topology generator

use rgbd_mesh::mesh::TopologyGenerator;
use rgbd_mesh::{SimplificationFactor, TopologyChange};

#[test]
fn test_full_resolution_counts() {
    let mut generator = TopologyGenerator::new();
    generator.rebuild(640, 480, SimplificationFactor::default());
    let topology = generator.topology();

    assert_eq!(topology.vertex_count(), 640 * 480);
    assert_eq!(topology.triangle_count(), 2 * 639 * 479);
    assert!(
        topology
            .indices()
            .iter()
            .all(|&i| (i as usize) < topology.vertex_count())
    );
}

#[test]
fn test_counts_follow_ceiling_division() {
    let mut generator = TopologyGenerator::new();
    generator.rebuild(640, 480, SimplificationFactor::new(3.0, 7.0));
    let topology = generator.topology();

    // ceil(640 / 3) = 214, ceil(480 / 7) = 69
    assert_eq!(topology.columns(), 214);
    assert_eq!(topology.rows(), 69);
    assert_eq!(topology.triangle_count(), 2 * 213 * 68);
}

#[test]
fn test_repeat_rebuild_is_noop() {
    let mut generator = TopologyGenerator::new().with_colors(true);
    let step = SimplificationFactor::new(2.0, 2.0);
    assert_eq!(generator.rebuild(320, 240, step), TopologyChange::Rebuilt);

    let positions = generator.topology().position_bytes().to_vec();
    let indices = generator.topology().index_bytes().to_vec();
    let generation = generator.topology().generation();

    assert_eq!(generator.rebuild(320, 240, step), TopologyChange::Unchanged);
    assert_eq!(generator.topology().position_bytes(), positions.as_slice());
    assert_eq!(generator.topology().index_bytes(), indices.as_slice());
    assert_eq!(generator.topology().generation(), generation);
}

#[test]
fn test_non_positive_steps_keep_previous() {
    let mut generator = TopologyGenerator::new();
    generator.rebuild(64, 48, SimplificationFactor::uniform(2.0));
    let before = generator.topology().clone();

    for step in [
        SimplificationFactor::new(0.0, 1.0),
        SimplificationFactor::new(1.0, -2.0),
        SimplificationFactor::uniform(f32::NAN),
    ] {
        assert_eq!(generator.rebuild(64, 48, step), TopologyChange::Rejected);
        assert_eq!(generator.topology(), &before);
    }
}

#[test]
fn test_dimension_change_rebuilds() {
    let mut generator = TopologyGenerator::new();
    generator.rebuild(64, 48, SimplificationFactor::default());
    let generation = generator.topology().generation();

    assert_eq!(
        generator.rebuild(32, 24, SimplificationFactor::default()),
        TopologyChange::Rebuilt
    );
    assert_eq!(generator.topology().generation(), generation + 1);
    assert_eq!(generator.topology().depth_dimensions(), (32, 24));
}

#[test]
fn test_step_too_small_for_index_range_keeps_previous() {
    let mut generator = TopologyGenerator::new();
    generator.rebuild(640, 480, SimplificationFactor::uniform(4.0));
    let before = generator.topology().clone();

    assert_eq!(
        generator.rebuild(640, 480, SimplificationFactor::uniform(1e-6)),
        TopologyChange::Rejected
    );
    assert_eq!(generator.topology(), &before);
}
