//! Identifier validation
//!
//! A length heuristic, not an address decoder: the text is trimmed and
//! accepted when it has at least `min_len` characters and no inner whitespace.

use crate::models::{AppError, AppResult, Identifier};

#[derive(Debug, Clone, Copy)]
pub struct IdentifierValidator {
    min_len: usize,
}

impl IdentifierValidator {
    pub fn new(min_len: usize) -> Self {
        Self { min_len }
    }

    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Accept `raw` as an identifier or report why not. No side effects.
    pub fn validate(&self, raw: &str) -> AppResult<Identifier> {
        let trimmed = raw.trim();
        let len = trimmed.chars().count();

        if len < self.min_len {
            return Err(AppError::rejected(format!(
                "expected at least {} characters, got {}",
                self.min_len, len
            )));
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(AppError::rejected("identifier contains whitespace"));
        }

        Ok(Identifier::from_trimmed(trimmed))
    }
}
