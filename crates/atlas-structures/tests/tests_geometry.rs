//! Tests for the geometry module
//!
//! Exercises the box arithmetic the region resolver depends on: intersection,
//! containment and anisotropic downsampling.

use atlas_structures::*;

fn bbox(min: [i64; 3], max: [i64; 3]) -> BBox {
    BBox::new(min.into(), max.into())
}

/// A small spread of boxes: nested, overlapping, touching, disjoint per axis
fn sample_boxes() -> Vec<BBox> {
    vec![
        bbox([0, 0, 0], [99, 99, 9]),
        bbox([10, 10, 0], [20, 20, 9]),
        bbox([90, 90, 0], [110, 110, 9]),
        bbox([99, 0, 0], [150, 99, 9]),
        bbox([100, 0, 0], [150, 99, 9]),
        bbox([0, 100, 0], [99, 200, 9]),
        bbox([0, 0, 10], [99, 99, 20]),
        bbox([-50, -50, -5], [5, 5, 0]),
        bbox([42, 42, 4], [42, 42, 4]),
    ]
}

fn axis_disjoint(a: &BBox, b: &BBox) -> bool {
    a.max.x < b.min.x
        || b.max.x < a.min.x
        || a.max.y < b.min.y
        || b.max.y < a.min.y
        || a.max.z < b.min.z
        || b.max.z < a.min.z
}

#[cfg(test)]
mod test_bbox {
    use super::*;

    #[test]
    fn test_intersection_succeeds_iff_no_axis_is_disjoint() {
        for a in sample_boxes() {
            for b in sample_boxes() {
                let result = a.intersection(&b);
                assert_eq!(
                    result.is_ok(),
                    !axis_disjoint(&a, &b),
                    "intersection of {} and {}",
                    a,
                    b
                );

                if let Ok(overlap) = result {
                    assert_eq!(overlap.min, a.min.max(&b.min));
                    assert_eq!(overlap.max, a.max.min(&b.max));
                    assert!(overlap.inside(&a));
                    assert!(overlap.inside(&b));
                }
            }
        }
    }

    #[test]
    fn test_containment_is_reflexive() {
        for a in sample_boxes() {
            assert!(a.inside(&a), "{} should be inside itself", a);
        }
    }

    #[test]
    fn test_box_inside_region_scenario() {
        let region = bbox([0, 0, 0], [99, 99, 9]);
        assert!(bbox([10, 10, 0], [20, 20, 9]).inside(&region));

        let straddling = bbox([90, 90, 0], [110, 110, 9]);
        assert!(!straddling.inside(&region));
        assert_eq!(
            straddling.intersection(&region),
            Ok(bbox([90, 90, 0], [99, 99, 9]))
        );
    }

    #[test]
    fn test_no_overlap_is_distinguishable_from_a_box() {
        let a = bbox([0, 0, 0], [1, 1, 1]);
        let b = bbox([5, 5, 5], [6, 6, 6]);
        let err = a.intersection(&b).unwrap_err();
        assert_eq!(err, NoOverlap);
        assert_eq!(err.to_string(), "no overlap");
    }
}

#[cfg(test)]
mod test_downsampling {
    use super::*;

    #[test]
    fn test_resolution_zero_is_identity() {
        for b in sample_boxes() {
            assert_eq!(b.min.downsample_aniso(0), b.min);
            assert_eq!(b.max.downsample_aniso(0), b.max);
            assert_eq!(b.downsample_aniso(0), b);
        }
    }

    #[test]
    fn test_z_is_never_scaled() {
        for b in sample_boxes() {
            for resolution in 0..8 {
                assert_eq!(b.min.downsample_aniso(resolution).z, b.min.z);
                assert_eq!(b.max.downsample_aniso(resolution).z, b.max.z);
            }
        }
    }

    #[test]
    fn test_downsampled_box_keeps_ordering() {
        for b in sample_boxes() {
            for resolution in 0..8 {
                let d = b.downsample_aniso(resolution);
                assert!(d.min.lesser_eq(&d.max), "{} at {}", b, resolution);
            }
        }
    }

    #[test]
    fn test_native_box_downsampled_to_query_level() {
        let native = bbox([4000, 8000, 100], [4100, 8100, 110]);
        assert_eq!(
            native.downsample_aniso(2),
            bbox([1000, 2000, 100], [1025, 2025, 110])
        );
    }
}

#[cfg(test)]
mod test_region {
    use super::*;

    #[test]
    fn test_region_from_path_segments() {
        let region = Region::parse(
            "team2_waypoint/pinky10/segmentation",
            0,
            "15736,35973",
            "19104,35456",
            "4003,4258",
        )
        .unwrap();

        assert_eq!(region.bbox, bbox([15736, 19104, 4003], [35972, 35455, 4257]));
        assert_eq!(region.bbox.to_half_open()[0], AxisRange::new(15736, 35973));
    }

    #[test]
    fn test_region_rejects_non_numeric_bounds() {
        let err = Region::parse("c/e/l", 0, "0,x", "0,1", "0,1").unwrap_err();
        assert!(matches!(err, AtlasDataError::BadParameters(_)));
    }
}
