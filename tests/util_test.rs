use camera_lidar_ttc::types::Roi;
use camera_lidar_ttc::util::{median_of_sorted, n_smallest, quartiles_of_sorted, sort_f64};

#[test]
fn test_sort_puts_nan_last() {
    let mut v = vec![3.0, f64::NAN, 1.0, 2.0];
    sort_f64(&mut v);
    assert_eq!(&v[..3], &[1.0, 2.0, 3.0]);
    assert!(v[3].is_nan());
}

#[test]
fn test_sort_orders_signed_zero() {
    let mut v = vec![0.0, f64::NAN, -0.0, -1.0];
    sort_f64(&mut v);
    assert_eq!(v[0], -1.0);
    assert!(v[1] == 0.0 && v[1].is_sign_negative());
    assert!(v[2] == 0.0 && v[2].is_sign_positive());
    assert!(v[3].is_nan());
}

#[test]
fn test_median_odd_and_even() {
    assert_eq!(median_of_sorted(&[]), None);
    assert_eq!(median_of_sorted(&[1.0, 2.0, 9.0]), Some(2.0));
    assert_eq!(median_of_sorted(&[1.0, 2.0, 4.0, 9.0]), Some(3.0));
}

#[test]
fn test_quartiles_by_index() {
    let sorted: Vec<f64> = (0..8).map(|i| i as f64).collect();
    assert_eq!(quartiles_of_sorted(&sorted), Some((2.0, 4.0, 6.0)));
    assert_eq!(quartiles_of_sorted(&[5.0]), Some((5.0, 5.0, 5.0)));
    assert_eq!(quartiles_of_sorted(&[]), None);
}

#[test]
fn test_n_smallest() {
    let v = [5.0, 3.0, 8.0, 1.0, 3.0, 9.0];
    assert_eq!(n_smallest(v, 3), vec![1.0, 3.0, 3.0]);
    assert_eq!(n_smallest(v, 10), vec![1.0, 3.0, 3.0, 5.0, 8.0, 9.0]);
    assert!(n_smallest(v, 0).is_empty());
}

#[test]
fn test_roi_half_open_and_shrink() {
    let roi = Roi::new(10.0, 20.0, 100.0, 50.0);
    assert!(roi.contains(10.0, 20.0));
    assert!(!roi.contains(110.0, 40.0));
    assert!(!roi.contains(50.0, 70.0));
    assert!(roi.contains(109.9, 69.9));

    let shrunk = roi.shrink(0.2);
    assert_eq!(shrunk, Roi::new(20.0, 25.0, 80.0, 40.0));
    assert_eq!(shrunk.center(), roi.center());
}
