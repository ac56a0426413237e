use approx::assert_abs_diff_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cribbdle::chart::*;

fn vp() -> Viewport {
    Viewport::default()
}

fn histogram(values: &[f64], reference: Option<f64>) -> HistogramGeometry {
    match layout(values, reference, ChartKind::Histogram, &vp()) {
        Some(Geometry::Histogram(h)) => h,
        other => panic!("expected histogram, got {:?}", other),
    }
}

fn line(values: &[f64], reference: Option<f64>) -> LineGeometry {
    match layout(values, reference, ChartKind::Line, &vp()) {
        Some(Geometry::Line(l)) => l,
        other => panic!("expected line, got {:?}", other),
    }
}

fn boxplot(values: &[f64], reference: Option<f64>) -> BoxGeometry {
    match layout(values, reference, ChartKind::Box, &vp()) {
        Some(Geometry::Box(b)) => b,
        other => panic!("expected box, got {:?}", other),
    }
}

fn random_values(rng: &mut StdRng) -> Vec<f64> {
    let n = rng.gen_range(1..=46);
    (0..n).map(|_| rng.gen_range(0..=29) as f64).collect()
}

// ---------------------------------------------------------------------------
// No data
// ---------------------------------------------------------------------------

#[test]
fn test_empty_values_produce_no_geometry() {
    for kind in [ChartKind::Histogram, ChartKind::Line, ChartKind::Box] {
        assert!(layout(&[], Some(3.0), kind, &vp()).is_none());
    }
}

#[test]
fn test_unknown_kind_produces_no_geometry() {
    assert!(layout_named(&[1.0, 2.0], None, "pie", &vp()).is_none());
    assert!(layout_named(&[1.0, 2.0], None, "BOX", &vp()).is_some());
}

#[test]
fn test_chart_kind_parse() {
    assert_eq!(ChartKind::parse("histogram"), Some(ChartKind::Histogram));
    assert_eq!(ChartKind::parse(" Line "), Some(ChartKind::Line));
    assert_eq!(ChartKind::parse("scatter"), None);
    assert_eq!(ChartKind::Box.to_string(), "box");
}

// ---------------------------------------------------------------------------
// Reference marker
// ---------------------------------------------------------------------------

#[test]
fn test_zero_reference_is_drawn() {
    let l = line(&[0.0, 2.0, 4.0], Some(0.0));
    let r = l.reference.expect("zero is a real reference value");
    assert_abs_diff_eq!(r.y1, vp().plot_bottom(), epsilon = 1e-9);
}

#[test]
fn test_non_finite_reference_is_omitted() {
    for reference in [None, Some(f64::NAN), Some(f64::INFINITY)] {
        for kind in [ChartKind::Histogram, ChartKind::Line, ChartKind::Box] {
            let g = layout(&[1.0, 2.0, 3.0], reference, kind, &vp()).unwrap();
            assert!(g.reference().is_none(), "{:?} {:?}", kind, reference);
        }
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[test]
fn test_histogram_groups_by_exact_value() {
    let h = histogram(&[6.0, 4.0, 6.0, 9.0, 4.0, 6.0], None);
    let bins: Vec<(f64, usize)> = h.bins.iter().map(|b| (b.value, b.count)).collect();
    assert_eq!(bins, vec![(4.0, 2), (6.0, 3), (9.0, 1)]);
    assert_eq!(h.max_count, 3);
}

#[test]
fn test_histogram_geometry() {
    let v = vp();
    let h = histogram(&[2.0, 2.0, 4.0, 8.0], None);
    let slot = v.plot_width() / 3.0;
    assert_abs_diff_eq!(h.slot_width, slot, epsilon = 1e-9);
    assert_abs_diff_eq!(h.bins[0].height, v.plot_height(), epsilon = 1e-9);
    assert_abs_diff_eq!(h.bins[1].height, v.plot_height() / 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(h.bins[2].x, v.margins.left + 2.0 * slot, epsilon = 1e-9);
    assert_abs_diff_eq!(h.bins[1].y + h.bins[1].height, v.plot_bottom(), epsilon = 1e-9);
    assert_abs_diff_eq!(h.bins[0].width, slot * BAR_FILL, epsilon = 1e-9);
}

#[test]
fn test_histogram_marker_on_rounded_reference() {
    let h = histogram(&[2.0, 4.0, 6.0, 8.0], Some(5.6));
    assert_eq!(h.reference_bin, Some(2));
    let r = h.reference.unwrap();
    assert_abs_diff_eq!(r.x1, vp().margins.left + 2.5 * h.slot_width, epsilon = 1e-9);
    assert_abs_diff_eq!(r.x1, r.x2, epsilon = 1e-9);
    assert_abs_diff_eq!(r.y1, vp().plot_top(), epsilon = 1e-9);
    assert_abs_diff_eq!(r.y2, vp().plot_bottom(), epsilon = 1e-9);
}

#[test]
fn test_histogram_marker_falls_back_to_nearest_bin() {
    // round(7.2) = 7 is not a bin; 8 is closest
    let h = histogram(&[2.0, 4.0, 8.0, 12.0], Some(7.2));
    assert_eq!(h.reference_bin, Some(2));
}

#[test]
fn test_histogram_counts_sum_to_len() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let values = random_values(&mut rng);
        let h = histogram(&values, None);
        let total: usize = h.bins.iter().map(|b| b.count).sum();
        assert_eq!(total, values.len());
        assert!(h.bins.windows(2).all(|w| w[0].value < w[1].value));
    }
}

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

#[test]
fn test_line_point_per_value_sorted() {
    let v = vp();
    let l = line(&[9.0, 1.0, 5.0], None);
    assert_eq!(l.points.len(), 3);
    assert_eq!((l.min, l.max), (1.0, 9.0));
    assert_abs_diff_eq!(l.points[0].x, v.margins.left, epsilon = 1e-9);
    assert_abs_diff_eq!(l.points[1].x, v.margins.left + v.plot_width() / 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(l.points[2].x, v.plot_right(), epsilon = 1e-9);
    // lowest value at the bottom, highest at the top
    assert_abs_diff_eq!(l.points[0].y, v.plot_bottom(), epsilon = 1e-9);
    assert_abs_diff_eq!(l.points[1].y, v.plot_top() + v.plot_height() / 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(l.points[2].y, v.plot_top(), epsilon = 1e-9);
}

#[test]
fn test_line_is_monotonic_for_distinct_values() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..100 {
        let mut values: Vec<f64> = random_values(&mut rng);
        values.sort_by(f64::total_cmp);
        values.dedup();
        let l = line(&values, None);
        assert_eq!(l.points.len(), values.len());
        for w in l.points.windows(2) {
            assert!(w[1].x > w[0].x);
            // higher value means smaller screen y
            assert!(w[1].y < w[0].y);
        }
    }
}

#[test]
fn test_line_reference_spans_plot() {
    let v = vp();
    let l = line(&[0.0, 10.0], Some(5.0));
    let r = l.reference.unwrap();
    assert_abs_diff_eq!(r.x1, v.margins.left, epsilon = 1e-9);
    assert_abs_diff_eq!(r.x2, v.plot_right(), epsilon = 1e-9);
    assert_abs_diff_eq!(r.y1, v.plot_top() + v.plot_height() / 2.0, epsilon = 1e-9);
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

#[test]
fn test_box_quartiles_by_index_selection() {
    let b = boxplot(&[15.0, 4.0, 6.0, 9.0, 6.0], Some(8.0));
    let s = b.stats;
    assert_eq!((s.q1, s.q2, s.q3), (6.0, 6.0, 9.0));
    assert_abs_diff_eq!(s.iqr, 3.0);
    assert_abs_diff_eq!(s.low_whisker, 4.0);
    assert_abs_diff_eq!(s.high_whisker, 13.5);
    let outliers: Vec<f64> = b.outliers.iter().map(|o| o.value).collect();
    assert_eq!(outliers, vec![15.0]);
    assert!(b.reference.is_some());
}

#[test]
fn test_box_stats_no_interpolation() {
    // n = 4: Q1 = v[1], Q2 = v[2], Q3 = v[3]
    let s = box_stats(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    assert_eq!((s.q1, s.q2, s.q3), (2.0, 3.0, 4.0));
    assert!(box_stats(&[]).is_none());
}

#[test]
fn test_box_outliers_share_center_x() {
    let b = boxplot(&[0.0, 10.0, 10.0, 10.0, 10.0, 11.0, 30.0], None);
    assert!(b.outliers.len() >= 2);
    for o in &b.outliers {
        assert_abs_diff_eq!(o.x, b.center_x, epsilon = 1e-9);
    }
    let v = vp();
    assert_abs_diff_eq!(b.center_x, (v.margins.left + v.plot_right()) / 2.0, epsilon = 1e-9);
}

#[test]
fn test_box_ordering_and_outlier_partition() {
    let mut rng = StdRng::seed_from_u64(23);
    for _ in 0..200 {
        let values = random_values(&mut rng);
        let b = boxplot(&values, None);
        let s = b.stats;
        assert!(s.low_whisker <= s.q1);
        assert!(s.q1 <= s.q2);
        assert!(s.q2 <= s.q3);
        assert!(s.q3 <= s.high_whisker);
        let expected = values.iter().filter(|&&v| v < s.low_whisker || v > s.high_whisker).count();
        assert_eq!(b.outliers.len(), expected);
        assert!(b.outliers.iter().all(|o| s.is_outlier(o.value)));
        // screen y is inverted
        assert!(b.high_y <= b.q3_y && b.q3_y <= b.q2_y && b.q2_y <= b.q1_y && b.q1_y <= b.low_y);
    }
}

// ---------------------------------------------------------------------------
// Degenerate inputs
// ---------------------------------------------------------------------------

#[test]
fn test_single_value_is_finite_everywhere() {
    let h = histogram(&[7.0], Some(7.0));
    assert_eq!(h.bins.len(), 1);
    assert_abs_diff_eq!(h.bins[0].height, vp().plot_height(), epsilon = 1e-9);
    assert_eq!(h.reference_bin, Some(0));

    let l = line(&[7.0], Some(7.0));
    assert_eq!(l.points.len(), 1);
    assert!(l.points[0].x.is_finite() && l.points[0].y.is_finite());
    assert!(l.reference.unwrap().y1.is_finite());

    let b = boxplot(&[7.0], Some(7.0));
    assert_eq!((b.stats.q1, b.stats.q2, b.stats.q3), (7.0, 7.0, 7.0));
    assert!(b.outliers.is_empty());
    assert!(b.q1_y.is_finite() && b.low_y.is_finite() && b.high_y.is_finite());
}

#[test]
fn test_all_equal_values() {
    let l = line(&[5.0, 5.0, 5.0], None);
    assert!(l.points.iter().all(|p| p.y.is_finite()));
    let b = boxplot(&[5.0, 5.0, 5.0], None);
    assert_abs_diff_eq!(b.stats.iqr, 0.0);
    assert!(b.outliers.is_empty());
}

#[test]
fn test_non_finite_values_count_as_zero() {
    let h = histogram(&[f64::NAN, 0.0, 3.0], None);
    let bins: Vec<(f64, usize)> = h.bins.iter().map(|b| (b.value, b.count)).collect();
    assert_eq!(bins, vec![(0.0, 2), (3.0, 1)]);
}

#[test]
fn test_layout_is_idempotent() {
    let values = [3.0, 8.0, 8.0, 12.0, 2.0];
    for kind in [ChartKind::Histogram, ChartKind::Line, ChartKind::Box] {
        let a = layout(&values, Some(6.6), kind, &vp());
        let b = layout(&values, Some(6.6), kind, &vp());
        assert_eq!(a, b);
    }
}
