use serde::{Deserialize, Serialize};

/// Default intensity for foot-traffic samples that carry none
pub const DEFAULT_INTENSITY: f64 = 0.5;

/// Three-tier bucketing of a 0-1 intensity value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntensityCategory {
    Low,
    Medium,
    High,
}

impl IntensityCategory {
    pub fn from_intensity(intensity: f64) -> Self {
        if intensity > 0.7 {
            IntensityCategory::High
        } else if intensity > 0.4 {
            IntensityCategory::Medium
        } else {
            IntensityCategory::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IntensityCategory::Low => "Low",
            IntensityCategory::Medium => "Medium",
            IntensityCategory::High => "High",
        }
    }
}

impl std::fmt::Display for IntensityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_are_exclusive() {
        assert_eq!(IntensityCategory::from_intensity(0.71), IntensityCategory::High);
        assert_eq!(IntensityCategory::from_intensity(0.7), IntensityCategory::Medium);
        assert_eq!(IntensityCategory::from_intensity(0.41), IntensityCategory::Medium);
        assert_eq!(IntensityCategory::from_intensity(0.4), IntensityCategory::Low);
        assert_eq!(IntensityCategory::from_intensity(0.0), IntensityCategory::Low);
    }

    #[test]
    fn test_default_intensity_is_medium() {
        assert_eq!(
            IntensityCategory::from_intensity(DEFAULT_INTENSITY).label(),
            "Medium"
        );
    }
}
