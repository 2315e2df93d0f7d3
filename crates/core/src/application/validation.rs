// Request validation shared by the use cases

use crate::application::constants::{MAX_SHORT_FIELD_LEN, MAX_TEXT_FIELD_LEN};
use crate::error::{AppError, Result};

/// Trimmed, non-empty, length-capped field
pub fn required(field: &str, value: String, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} cannot be empty", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} too long (max {} chars)",
            field, max_len
        )));
    }
    Ok(trimmed.to_string())
}

pub fn required_id(field: &str, value: String) -> Result<String> {
    required(field, value, MAX_SHORT_FIELD_LEN)
}

/// Optional free text: blank becomes `None`
pub fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>> {
    match value {
        Some(v) if !v.trim().is_empty() => required(field, v, MAX_TEXT_FIELD_LEN).map(Some),
        _ => Ok(None),
    }
}

pub fn coordinates(latitude: f64, longitude: f64) -> Result<()> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(AppError::Validation(format!(
            "latitude {} out of range [-90, 90]",
            latitude
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(AppError::Validation(format!(
            "longitude {} out of range [-180, 180]",
            longitude
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("x", "  F1 ".to_string(), 10).unwrap(), "F1");
        assert!(required("x", "   ".to_string(), 10)
            .unwrap_err()
            .to_string()
            .contains("empty"));
        assert!(required("x", "a".repeat(11), 10)
            .unwrap_err()
            .to_string()
            .contains("too long"));
    }

    #[test]
    fn test_optional_text_blank_is_none() {
        assert_eq!(optional_text("reason", Some("  ".to_string())).unwrap(), None);
        assert_eq!(optional_text("reason", None).unwrap(), None);
        assert_eq!(
            optional_text("reason", Some(" towed ".to_string())).unwrap(),
            Some("towed".to_string())
        );
    }

    #[test]
    fn test_coordinates() {
        assert!(coordinates(47.6, -122.3).is_ok());
        assert!(coordinates(90.1, 0.0).is_err());
        assert!(coordinates(0.0, -180.5).is_err());
        assert!(coordinates(f64::NAN, 0.0).is_err());
    }
}
