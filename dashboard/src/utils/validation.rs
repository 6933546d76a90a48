/// Validation utilities for user input

use shared::dto::Emotion;

pub const NOTES_MIN_CHARS: usize = 10;
pub const NOTES_MAX_CHARS: usize = 500;
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub struct ValidationResult {
    pub is_valid: bool,
    pub error: Option<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            error: Some(message.into()),
        }
    }
}

/// Validate a Solana wallet address (base58, 32-44 chars)
pub fn validate_wallet_address(address: &str) -> ValidationResult {
    if address.is_empty() {
        return ValidationResult::err("Wallet address is required");
    }

    if address.len() < 32 || address.len() > 44 {
        return ValidationResult::err("Wallet address must be 32-44 characters");
    }

    if !address.chars().all(|c| BASE58_ALPHABET.contains(c)) {
        return ValidationResult::err("Wallet address must be base58 encoded");
    }

    ValidationResult::ok()
}

/// Validate journal notes: empty (omitted) or 10-500 characters
pub fn validate_notes(notes: &str) -> ValidationResult {
    let len = notes.chars().count();
    if len == 0 {
        return ValidationResult::ok();
    }

    if len < NOTES_MIN_CHARS {
        return ValidationResult::err(format!(
            "Notes must be at least {} characters",
            NOTES_MIN_CHARS
        ));
    }

    if len > NOTES_MAX_CHARS {
        return ValidationResult::err(format!(
            "Notes must be at most {} characters",
            NOTES_MAX_CHARS
        ));
    }

    ValidationResult::ok()
}

/// Validate emotion against the fixed set
pub fn validate_emotion(emotion: &str) -> ValidationResult {
    if emotion.parse::<Emotion>().is_ok() {
        return ValidationResult::ok();
    }

    let allowed: Vec<&str> = Emotion::all().iter().map(Emotion::as_str).collect();
    ValidationResult::err(format!("Emotion must be one of: {}", allowed.join(", ")))
}

/// Validate rating (integer 1-5)
pub fn validate_rating(rating: i64) -> ValidationResult {
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return ValidationResult::err(format!(
            "Rating must be between {} and {}",
            RATING_MIN, RATING_MAX
        ));
    }

    ValidationResult::ok()
}

/// Validate hypothetical exit price (strictly positive)
pub fn validate_exit_price(price: f64) -> ValidationResult {
    if !price.is_finite() {
        return ValidationResult::err("Hypothetical exit price must be a number");
    }

    if price <= 0.0 {
        return ValidationResult::err("Hypothetical exit price must be greater than 0");
    }

    ValidationResult::ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wallet_address_validation() {
        assert!(validate_wallet_address("8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL").is_valid);
        assert!(!validate_wallet_address("").is_valid);
        assert!(!validate_wallet_address("short").is_valid);
        // '0' and 'O' are not in the base58 alphabet
        assert!(!validate_wallet_address("0W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAO").is_valid);
    }

    #[test]
    fn test_notes_validation() {
        assert!(validate_notes("").is_valid);
        assert!(!validate_notes("short").is_valid);
        assert!(!validate_notes("123456789").is_valid);
        assert!(validate_notes("1234567890").is_valid);
        assert!(validate_notes(&"x".repeat(500)).is_valid);
        assert!(!validate_notes(&"x".repeat(501)).is_valid);
    }

    #[test]
    fn test_notes_length_counts_chars_not_bytes() {
        // 10 multi-byte chars
        assert!(validate_notes("éééééééééé").is_valid);
    }

    #[test]
    fn test_emotion_validation() {
        assert!(validate_emotion("Calm").is_valid);
        assert!(validate_emotion("Anxious").is_valid);
        assert!(!validate_emotion("calm").is_valid);
        assert!(!validate_emotion("Euphoric").is_valid);
    }

    #[test]
    fn test_rating_validation() {
        assert!(!validate_rating(0).is_valid);
        assert!(validate_rating(1).is_valid);
        assert!(validate_rating(3).is_valid);
        assert!(validate_rating(5).is_valid);
        assert!(!validate_rating(6).is_valid);
    }

    #[test]
    fn test_exit_price_validation() {
        assert!(validate_exit_price(0.01).is_valid);
        assert!(!validate_exit_price(0.0).is_valid);
        assert!(!validate_exit_price(-3.0).is_valid);
        assert!(!validate_exit_price(f64::NAN).is_valid);
    }
}
