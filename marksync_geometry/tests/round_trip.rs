// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property tests for the local ↔ world round trip.
//!
//! For every invertible linear parent transform and every parameter set,
//! mapping to world and back must reproduce the parameters up to rounding.

use glam::{DMat4, DQuat, DVec3};
use marksync_geometry::{
    BoxParams, NodeGeometry, ParentTransform, WorldGeometry, to_local, to_world,
};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-9;

fn vec3(range: core::ops::Range<f64>) -> impl Strategy<Value = DVec3> {
    (range.clone(), range.clone(), range).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

fn scale_component() -> impl Strategy<Value = f64> {
    (0.1_f64..10.0, any::<bool>()).prop_map(|(s, flip)| if flip { -s } else { s })
}

/// Scale (possibly mirrored), rotation and translation, plus an optional shear.
fn linear_transform() -> impl Strategy<Value = DMat4> {
    (
        (scale_component(), scale_component(), scale_component()),
        vec3(-3.2..3.2),
        vec3(-500.0..500.0),
        -0.5_f64..0.5,
    )
        .prop_map(|((sx, sy, sz), angles, translation, shear)| {
            let rotation = DQuat::from_euler(glam::EulerRot::XYZ, angles.x, angles.y, angles.z);
            let srt = DMat4::from_scale_rotation_translation(
                DVec3::new(sx, sy, sz),
                rotation,
                translation,
            );
            let mut shear_m = DMat4::IDENTITY;
            shear_m.y_axis.x = shear;
            srt * shear_m
        })
}

fn box_params() -> impl Strategy<Value = NodeGeometry> {
    (vec3(-1000.0..1000.0), vec3(0.0..200.0))
        .prop_map(|(center, radius)| NodeGeometry::Box(BoxParams::new(center, radius)))
}

fn point_params() -> impl Strategy<Value = NodeGeometry> {
    prop::collection::vec(vec3(-1000.0..1000.0), 1..12).prop_map(NodeGeometry::points)
}

proptest! {
    #[test]
    fn box_round_trip(params in box_params(), matrix in linear_transform()) {
        let parent = ParentTransform::Linear(matrix);
        let back = to_local(&to_world(&params, &parent), &parent);
        prop_assert!(back.relative_eq(&params, TOLERANCE), "{back:?} != {params:?}");
    }

    #[test]
    fn point_round_trip(params in point_params(), matrix in linear_transform()) {
        let parent = ParentTransform::Linear(matrix);
        let back = to_local(&to_world(&params, &parent), &parent);
        prop_assert!(back.relative_eq(&params, TOLERANCE), "{back:?} != {params:?}");
    }

    #[test]
    fn identity_round_trip_is_exact_for_points(params in point_params()) {
        let back = to_local(&to_world(&params, &ParentTransform::Identity), &ParentTransform::Identity);
        prop_assert_eq!(back, params);
    }

    #[test]
    fn world_bounds_are_always_ordered(params in box_params(), matrix in linear_transform()) {
        let world = to_world(&params, &ParentTransform::Linear(matrix));
        let WorldGeometry::Box(corners) = world else {
            unreachable!("box parameters always map to a box");
        };
        let b = corners.bounds().to_array();
        prop_assert!(b[0] <= b[1] && b[2] <= b[3] && b[4] <= b[5]);
    }
}

#[test]
fn translated_box_is_centered_on_offset() {
    let params = NodeGeometry::Box(BoxParams::new(DVec3::ZERO, DVec3::ONE));
    let parent = ParentTransform::Linear(DMat4::from_translation(DVec3::new(5.0, 0.0, 0.0)));
    let bounds = to_world(&params, &parent).bounds().unwrap();
    assert_eq!(bounds.center(), DVec3::new(5.0, 0.0, 0.0));
    assert_eq!(bounds.to_array(), [4.0, 6.0, -1.0, 1.0, -1.0, 1.0]);
}
