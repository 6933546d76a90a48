//! # Shared Utility Functions
//!
//! Wallet address helpers used in logs, events and the CLI summary.
//!
//! ```rust
//! use shared::utils::short_wallet;
//!
//! assert_eq!(short_wallet("8W6QginkhTTxoP2deQjq7rZ9YMwN5FH9JYuLfSKuJKAL"), "8W6Q...JKAL");
//! ```

/// Keep the first `head` and last `tail` characters of a wallet address.
///
/// Addresses too short to shorten are returned unchanged. Works on chars, so
/// non-ASCII input never splits inside a code point.
pub fn abbreviate_wallet(address: &str, head: usize, tail: usize) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= head + tail {
        return address.to_string();
    }

    let prefix: String = chars[..head].iter().collect();
    let suffix: String = chars[chars.len() - tail..].iter().collect();
    format!("{}...{}", prefix, suffix)
}

/// [`abbreviate_wallet`] with four characters on each side.
pub fn short_wallet(address: &str) -> String {
    abbreviate_wallet(address, 4, 4)
}
