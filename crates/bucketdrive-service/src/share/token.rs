//! Share link token generation.

use rand::RngCore;
use rand::rngs::OsRng;

use bucketdrive_core::error::{AppError, ErrorKind};
use bucketdrive_core::result::AppResult;

/// Random bytes per token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Produces share link tokens.
pub trait TokenSource: Send + Sync + std::fmt::Debug + 'static {
    /// Mint a new token.
    fn generate(&self) -> AppResult<String>;
}

/// Mints tokens from the operating system's entropy source, rendered as
/// 64 lowercase hex characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenGenerator;

impl TokenGenerator {
    /// Creates a new generator.
    pub fn new() -> Self {
        Self
    }
}

impl TokenSource for TokenGenerator {
    fn generate(&self) -> AppResult<String> {
        let mut bytes = [0u8; TOKEN_BYTES];
        // No fallback to a weaker generator: creation fails instead.
        OsRng.try_fill_bytes(&mut bytes).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Entropy source unavailable", e)
        })?;
        Ok(hex::encode(bytes))
    }
}
