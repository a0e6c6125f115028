use nalgebra::Point3;

/// Euclidean distance between two points in Ångström.
pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    nalgebra::distance(a, b)
}

/// The smallest distance from any of `points` to `target`, or `None` when `points` is empty.
pub fn min_distance<'a>(
    points: impl IntoIterator<Item = &'a Point3<f64>>,
    target: &Point3<f64>,
) -> Option<f64> {
    points
        .into_iter()
        .map(|p| distance(p, target))
        .min_by(f64::total_cmp)
}
