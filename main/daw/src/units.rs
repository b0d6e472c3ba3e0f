/// The dB value which is treated as silence (-150 dB, REAPER's old "soft minimum").
pub const DB_FLOOR: f64 = -150.0;

/// Converts decibels to REAPER's native linear volume unit (1.0 = 0 dB).
///
/// Everything at or below [`DB_FLOOR`] maps to 0.0.
pub fn db_to_linear(db: f64) -> f64 {
    if db <= DB_FLOOR {
        return 0.0;
    }
    10f64.powf(db / 20.0)
}

/// Converts REAPER's native linear volume unit to decibels, clamped at [`DB_FLOOR`].
pub fn linear_to_db(linear: f64) -> f64 {
    if linear <= 0.0 {
        return DB_FLOOR;
    }
    (20.0 * linear.log10()).max(DB_FLOOR)
}

/// 24-bit non-linear sRGB color.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor::rgb(0, 0, 0);

    /// Creates this color by providing the components contained in an array.
    pub const fn from_array(rgb: [u8; 3]) -> Self {
        Self::rgb(rgb[0], rgb[1], rgb[2])
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn db_conversion() {
        assert_abs_diff_eq!(db_to_linear(0.0), 1.0);
        assert_abs_diff_eq!(db_to_linear(-6.0), 0.501187, epsilon = 0.000001);
        assert_abs_diff_eq!(db_to_linear(12.0), 3.981071705535, epsilon = 0.000001);
        assert_eq!(db_to_linear(-150.0), 0.0);
        assert_eq!(db_to_linear(-1000.0), 0.0);
        assert_abs_diff_eq!(linear_to_db(1.0), 0.0);
        assert_abs_diff_eq!(linear_to_db(0.5), -6.0206, epsilon = 0.0001);
        assert_eq!(linear_to_db(0.0), DB_FLOOR);
        assert_eq!(linear_to_db(-1.0), DB_FLOOR);
        assert_eq!(linear_to_db(1e-12), DB_FLOOR);
        assert_abs_diff_eq!(linear_to_db(db_to_linear(-24.5)), -24.5, epsilon = 0.000001);
    }

    #[test]
    fn colors() {
        let color = RgbColor::from_array([255, 128, 0]);
        assert_eq!(color, RgbColor::rgb(255, 128, 0));
        assert_eq!(color.to_array(), [255, 128, 0]);
        assert!(!color.is_black());
        assert!(RgbColor::default().is_black());
    }
}
