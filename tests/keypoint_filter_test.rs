use camera_lidar_ttc::FusionError;
use camera_lidar_ttc::association::{OutlierRule, cluster_matches_with_roi};
use camera_lidar_ttc::detected_points::{Correspondence, ImageKeypoint};
use camera_lidar_ttc::types::{BoundingBox, Roi};

fn kp(x: f32, y: f32) -> ImageKeypoint {
    ImageKeypoint::new(x, y)
}

fn identity_matches(n: usize) -> Vec<Correspondence> {
    (0..n).map(|i| Correspondence::new(i, i)).collect()
}

fn unit_box() -> BoundingBox {
    BoundingBox::new(3, Roi::new(0.0, 0.0, 100.0, 100.0))
}

#[test]
fn test_fewer_than_three_matches_are_kept_unfiltered() {
    let prev = vec![kp(10.0, 10.0), kp(20.0, 20.0)];
    let curr = vec![kp(11.0, 10.0), kp(90.0, 90.0)];
    let mut bbox = unit_box();
    cluster_matches_with_roi(
        &mut bbox,
        &identity_matches(2),
        &prev,
        &curr,
        OutlierRule::tukey(),
    )
    .unwrap();
    assert_eq!(bbox.correspondences, vec![0, 1]);
}

#[test]
fn test_both_endpoints_must_lie_inside_box() {
    let prev = vec![kp(10.0, 10.0), kp(150.0, 10.0), kp(20.0, 20.0)];
    let curr = vec![kp(12.0, 10.0), kp(50.0, 10.0), kp(150.0, 20.0)];
    let mut bbox = unit_box();
    cluster_matches_with_roi(
        &mut bbox,
        &identity_matches(3),
        &prev,
        &curr,
        OutlierRule::default(),
    )
    .unwrap();
    // match 1 leaves from outside, match 2 ends outside
    assert_eq!(bbox.correspondences, vec![0]);
}

#[test]
fn test_conjunctive_rule_keeps_far_outlier() {
    let prev = vec![
        kp(10.0, 10.0),
        kp(20.0, 10.0),
        kp(10.0, 60.0),
        kp(30.0, 30.0),
        kp(40.0, 40.0),
    ];
    let curr = vec![
        kp(11.0, 10.0),
        kp(21.0, 10.0),
        kp(90.0, 60.0),
        kp(31.0, 30.0),
        kp(41.0, 40.0),
    ];
    let mut bbox = unit_box();
    cluster_matches_with_roi(
        &mut bbox,
        &identity_matches(5),
        &prev,
        &curr,
        OutlierRule::default(),
    )
    .unwrap();
    assert_eq!(bbox.correspondences, vec![0, 1, 2, 3, 4]);
}

#[test]
fn test_tukey_rule_removes_far_outlier() {
    let prev = vec![
        kp(10.0, 10.0),
        kp(20.0, 10.0),
        kp(10.0, 60.0),
        kp(30.0, 30.0),
        kp(40.0, 40.0),
    ];
    let curr = vec![
        kp(11.0, 10.0),
        kp(21.0, 10.0),
        kp(90.0, 60.0),
        kp(31.0, 30.0),
        kp(41.0, 40.0),
    ];
    let mut bbox = unit_box();
    cluster_matches_with_roi(
        &mut bbox,
        &identity_matches(5),
        &prev,
        &curr,
        OutlierRule::tukey(),
    )
    .unwrap();
    assert_eq!(bbox.correspondences, vec![0, 1, 3, 4]);
}

#[test]
fn test_outlier_rule_fences() {
    // q1 = 2, q3 = 4, iqr = 2
    let tukey = OutlierRule::Disjunctive { multiplier: 1.5 };
    assert!(tukey.is_outlier(7.1, 2.0, 4.0));
    assert!(tukey.is_outlier(-1.1, 2.0, 4.0));
    assert!(!tukey.is_outlier(7.0, 2.0, 4.0));
    assert!(!tukey.is_outlier(3.0, 2.0, 4.0));

    let conjunctive = OutlierRule::Conjunctive { multiplier: 1.0 };
    for d in [-100.0, 0.0, 3.0, 1e6] {
        assert!(!conjunctive.is_outlier(d, 2.0, 4.0));
    }
    assert_eq!(tukey.multiplier(), 1.5);
}

#[test]
fn test_outlier_rule_json() {
    let rule: OutlierRule =
        serde_json::from_str(r#"{"kind": "disjunctive", "multiplier": 3.0}"#).unwrap();
    assert_eq!(rule, OutlierRule::Disjunctive { multiplier: 3.0 });

    let json = serde_json::to_string(&OutlierRule::default()).unwrap();
    assert!(json.contains("conjunctive"));
}

#[test]
fn test_out_of_range_keypoint_index_is_an_error() {
    let prev = vec![kp(10.0, 10.0)];
    let curr = vec![kp(10.0, 10.0)];
    let mut bbox = unit_box();
    let res = cluster_matches_with_roi(
        &mut bbox,
        &[Correspondence::new(0, 4)],
        &prev,
        &curr,
        OutlierRule::default(),
    );
    assert!(matches!(
        res,
        Err(FusionError::KeypointIndexOutOfRange {
            frame: "current",
            index: 4,
            len: 1
        })
    ));
}
