//! Access key token generation
//!
//! Tokens are drawn from the operating-system randomness source; a seeded
//! general-purpose PRNG is not acceptable here.

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

/// Default token length: 10 characters
pub const DEFAULT_TOKEN_LENGTH: usize = 10;

/// Generator for fixed-length alphanumeric access key tokens
#[derive(Debug, Clone)]
pub struct KeyGenerator {
    length: usize,
}

impl KeyGenerator {
    /// Create a generator producing tokens of the given length
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    /// Generate a new token, uniform over `[A-Za-z0-9]`
    pub fn generate(&self) -> String {
        OsRng
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_length() {
        let generator = KeyGenerator::default();
        assert_eq!(generator.generate().len(), 10);

        let generator = KeyGenerator::new(32);
        assert_eq!(generator.generate().len(), 32);
    }

    #[test]
    fn test_token_alphabet() {
        let generator = KeyGenerator::default();

        for _ in 0..50 {
            let token = generator.generate();
            assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_token_uniqueness() {
        let generator = KeyGenerator::default();
        let first = generator.generate();
        let second = generator.generate();

        assert_ne!(first, second);
    }
}
