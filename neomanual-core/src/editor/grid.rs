/// Grid spacing of the editing canvas, in canvas units.
pub const DEFAULT_GRID_SIZE: f64 = 10.0;

/// Rounds `value` to the nearest grid line.
///
/// Halfway values round up, so `-15` snaps to `-10` and `15` to `20`.
/// A non-positive grid disables snapping.
pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
    if grid_size <= 0.0 || !grid_size.is_finite() {
        return value;
    }
    (value / grid_size + 0.5).floor() * grid_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(0.0, 10.0), 0.0);
        assert_eq!(snap_to_grid(54.0, 10.0), 50.0);
        assert_eq!(snap_to_grid(55.0, 10.0), 60.0);
        assert_eq!(snap_to_grid(-15.0, 10.0), -10.0);
        assert_eq!(snap_to_grid(123.4, 25.0), 125.0);
    }

    #[test]
    fn test_snap_disabled_for_invalid_grid() {
        assert_eq!(snap_to_grid(13.7, 0.0), 13.7);
        assert_eq!(snap_to_grid(13.7, -5.0), 13.7);
    }
}
