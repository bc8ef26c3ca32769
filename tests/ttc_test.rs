use camera_lidar_ttc::detected_points::{Correspondence, ImageKeypoint};
use camera_lidar_ttc::ttc::{RangeTtcEstimator, VisionTtcEstimator, robust_min_x};
use camera_lidar_ttc::types::RangePoint;

fn wall(x: f64, n: usize) -> Vec<RangePoint> {
    (0..n)
        .map(|i| RangePoint::new(x, i as f64 * 0.1 - 0.5, -1.2))
        .collect()
}

fn xs(values: &[f64]) -> Vec<RangePoint> {
    values.iter().map(|&x| RangePoint::new(x, 0.0, 0.0)).collect()
}

fn identity_matches(n: usize) -> Vec<Correspondence> {
    (0..n).map(|i| Correspondence::new(i, i)).collect()
}

fn row(xs: &[f32]) -> Vec<ImageKeypoint> {
    xs.iter().map(|&x| ImageKeypoint::new(x, 0.0)).collect()
}

#[test]
fn test_robust_min_x_takes_nth_smallest() {
    let points = xs(&[7.0, 3.0, 1.0, 5.0, 2.0, 6.0, 4.0]);
    assert_eq!(robust_min_x(&points, 7), Some(7.0));

    let points = xs(&[10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0]);
    assert_eq!(robust_min_x(&points, 7), Some(7.0));
    assert_eq!(robust_min_x(&points, 1), Some(1.0));
}

#[test]
fn test_robust_min_x_with_few_points_takes_max() {
    let points = xs(&[5.0, 1.0, 9.0]);
    assert_eq!(robust_min_x(&points, 7), Some(9.0));
    assert_eq!(robust_min_x(&Vec::<RangePoint>::new(), 7), None);
}

#[test]
fn test_robust_min_x_ignores_near_strays() {
    let mut points = wall(8.0, 50);
    points.push(RangePoint::new(2.0, 0.0, -1.2));
    points.push(RangePoint::new(3.5, 0.1, -1.2));
    assert_eq!(robust_min_x(&points, 7), Some(8.0));
}

#[test]
fn test_range_ttc_approaching() {
    let estimator = RangeTtcEstimator::default();
    let ttc = estimator
        .estimate(&wall(10.0, 20), &wall(8.0, 20), 10.0)
        .unwrap();
    assert!((ttc - 0.4).abs() < 1e-9);
}

#[test]
fn test_range_ttc_receding_is_negative() {
    let ttc = RangeTtcEstimator::ttc_from_distances(8.0, 10.0, 10.0).unwrap();
    assert!((ttc + 0.5).abs() < 1e-9);
}

#[test]
fn test_range_ttc_undefined_cases() {
    let estimator = RangeTtcEstimator::new(7);
    assert_eq!(estimator.estimate(&wall(8.0, 20), &wall(8.0, 20), 10.0), None);
    assert_eq!(estimator.estimate(&wall(8.0, 20), &Vec::<RangePoint>::new(), 10.0), None);
    assert_eq!(estimator.estimate(&Vec::<RangePoint>::new(), &wall(8.0, 20), 10.0), None);
}

#[test]
fn test_vision_ttc_uniform_expansion() {
    let prev = row(&[0.0, 100.0, 200.0]);
    let curr = row(&[0.0, 120.0, 240.0]);
    let estimator = VisionTtcEstimator::default();

    let ratios = estimator
        .distance_ratios(&prev, &curr, &identity_matches(3))
        .unwrap();
    assert_eq!(ratios.len(), 3);
    assert!(ratios.iter().all(|r| (r - 1.2).abs() < 1e-6));

    let ttc = estimator
        .estimate(&prev, &curr, &identity_matches(3), 10.0)
        .unwrap()
        .unwrap();
    assert!((ttc - 0.5).abs() < 1e-6);
}

#[test]
fn test_vision_ttc_median_resists_bad_match() {
    let prev = row(&[0.0, 100.0, 200.0, 300.0, 400.0]);
    let mut curr = row(&[0.0, 125.0, 250.0, 375.0, 500.0]);
    // one keypoint matched to the wrong place
    curr[2] = ImageKeypoint::new(250.0, 300.0);
    let estimator = VisionTtcEstimator::default();
    let ttc = estimator
        .estimate(&prev, &curr, &identity_matches(5), 10.0)
        .unwrap()
        .unwrap();
    assert!((ttc - 0.4).abs() < 1e-6);
}

#[test]
fn test_vision_ttc_min_pixel_distance() {
    let prev = row(&[0.0, 10.0, 20.0]);
    let curr = row(&[0.0, 12.0, 24.0]);
    let matches = identity_matches(3);

    let estimator = VisionTtcEstimator::default();
    assert_eq!(estimator.estimate(&prev, &curr, &matches, 10.0).unwrap(), None);

    let estimator = VisionTtcEstimator::new(5.0);
    let ttc = estimator.estimate(&prev, &curr, &matches, 10.0).unwrap().unwrap();
    assert!((ttc - 0.5).abs() < 1e-5);
}

#[test]
fn test_stationary_scene_is_undefined_for_both() {
    let kpts = row(&[0.0, 150.0, 300.0]);
    let vision = VisionTtcEstimator::default();
    assert_eq!(
        vision.estimate(&kpts, &kpts, &identity_matches(3), 10.0).unwrap(),
        None
    );

    let range = RangeTtcEstimator::default();
    assert_eq!(range.estimate(&wall(12.0, 10), &wall(12.0, 10), 10.0), None);
}

#[test]
fn test_vision_ttc_needs_two_matches() {
    let prev = row(&[0.0, 200.0]);
    let curr = row(&[0.0, 240.0]);
    let estimator = VisionTtcEstimator::default();
    assert_eq!(
        estimator
            .estimate(&prev, &curr, &identity_matches(1), 10.0)
            .unwrap(),
        None
    );
    assert_eq!(estimator.estimate(&prev, &curr, &[], 10.0).unwrap(), None);
}

#[test]
fn test_vision_ttc_bad_index_is_an_error() {
    let prev = row(&[0.0, 200.0]);
    let curr = row(&[0.0, 240.0]);
    let matches = vec![Correspondence::new(0, 0), Correspondence::new(3, 1)];
    assert!(
        VisionTtcEstimator::default()
            .estimate(&prev, &curr, &matches, 10.0)
            .is_err()
    );
}
