// src/axis_names.rs

/// Centralized axis naming utilities
///
/// Provides consistent axis names across the analysis modules and their
/// consumers.

/// Number of control axes (roll, pitch, yaw).
pub const AXIS_COUNT: usize = 3;

/// All axis names as a static array, indexed 0=roll, 1=pitch, 2=yaw.
pub const AXIS_NAMES: [&str; AXIS_COUNT] = ["roll", "pitch", "yaw"];

/// Get the standard axis name for a given index
///
/// # Panics
/// Panics if index is greater than 2
pub fn axis_name(index: usize) -> &'static str {
    match index {
        0 => "roll",
        1 => "pitch",
        2 => "yaw",
        _ => panic!(
            "Invalid axis index: {}. Expected 0 (roll), 1 (pitch), or 2 (yaw)",
            index
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_name() {
        assert_eq!(axis_name(0), "roll");
        assert_eq!(axis_name(1), "pitch");
        assert_eq!(axis_name(2), "yaw");
    }

    #[test]
    #[should_panic(expected = "Invalid axis index")]
    fn test_axis_name_panic() {
        axis_name(3);
    }

    #[test]
    fn test_axis_names_constant() {
        assert_eq!(AXIS_NAMES.len(), AXIS_COUNT);
        assert_eq!(AXIS_NAMES[0], "roll");
        assert_eq!(AXIS_NAMES[2], "yaw");
    }
}
