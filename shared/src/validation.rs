//! Validation utilities for Grow Smart

use rust_decimal::Decimal;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.ends_with('.') => Ok(()),
        _ => Err("Invalid email format"),
    }
}

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Validate password length
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

/// Validate the confirmation field matches the password
pub fn validate_password_confirmation(password: &str, confirm: &str) -> Result<(), &'static str> {
    if password != confirm {
        return Err("Passwords do not match");
    }
    Ok(())
}

// ============================================================================
// Crop and Log Validations
// ============================================================================

/// Validate a field is present and not blank
pub fn validate_required(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("This field is required");
    }
    Ok(())
}

/// Validate a crop name
pub fn validate_crop_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Crop name is required");
    }
    if name.chars().count() > 100 {
        return Err("Crop name must be at most 100 characters");
    }
    Ok(())
}

/// Validate a schedule frequency in days, when one is given
pub fn validate_frequency(days: Option<i32>) -> Result<(), &'static str> {
    match days {
        Some(d) if d < 1 => Err("Frequency must be at least 1 day"),
        Some(d) if d > 365 => Err("Frequency must be at most 365 days"),
        _ => Ok(()),
    }
}

// ============================================================================
// Photo and Location Validations
// ============================================================================

/// Image types accepted for upload
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Validate an upload's content type
pub fn validate_image_content_type(content_type: &str) -> Result<(), &'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    if ALLOWED_IMAGE_TYPES.contains(&mime.as_str()) {
        Ok(())
    } else {
        Err("Only JPEG, PNG, GIF and WebP images are allowed")
    }
}

/// Validate latitude and longitude ranges
pub fn validate_coordinates(latitude: Decimal, longitude: Decimal) -> Result<(), &'static str> {
    if latitude < Decimal::from(-90) || latitude > Decimal::from(90) {
        return Err("Latitude must be between -90 and 90");
    }
    if longitude < Decimal::from(-180) || longitude > Decimal::from(180) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================================================
    // Account Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_email() {
        assert!(validate_email("gardener@example.com").is_ok());
        assert!(validate_email(" a@b.co ").is_ok());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@localhost").is_err());
        assert!(validate_email("user@example.").is_err());
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_password_confirmation() {
        assert!(validate_password_confirmation("secret1", "secret1").is_ok());
        assert!(validate_password_confirmation("secret1", "secret2").is_err());
    }

    // ========================================================================
    // Crop Validation Tests
    // ========================================================================

    #[test]
    fn test_validate_crop_name() {
        assert!(validate_crop_name("Tomatoes").is_ok());
        assert!(validate_crop_name("   ").is_err());
        assert!(validate_crop_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_frequency() {
        assert!(validate_frequency(None).is_ok());
        assert!(validate_frequency(Some(1)).is_ok());
        assert!(validate_frequency(Some(0)).is_err());
        assert!(validate_frequency(Some(-3)).is_err());
        assert!(validate_frequency(Some(400)).is_err());
    }

    #[test]
    fn test_validate_required() {
        assert!(validate_required("500 ml").is_ok());
        assert!(validate_required("").is_err());
    }

    // ========================================================================
    // Photo and Location Validation Tests
    // ========================================================================

    #[test]
    fn test_image_content_types() {
        assert!(validate_image_content_type("image/jpeg").is_ok());
        assert!(validate_image_content_type("IMAGE/PNG").is_ok());
        assert!(validate_image_content_type("image/webp; charset=binary").is_ok());
        assert!(validate_image_content_type("image/svg+xml").is_err());
        assert!(validate_image_content_type("application/pdf").is_err());
    }

    #[test]
    fn test_validate_coordinates() {
        let lat = Decimal::new(129716, 4);
        let lon = Decimal::new(775946, 4);
        assert!(validate_coordinates(lat, lon).is_ok());
        assert!(validate_coordinates(Decimal::from(91), lon).is_err());
        assert!(validate_coordinates(lat, Decimal::from(-181)).is_err());
    }
}
