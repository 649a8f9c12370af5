// src/engine/classroom_code.rs

use std::collections::HashSet;

use async_trait::async_trait;

use super::{error::EngineError, random::RandomSource};

pub const CODE_LENGTH: usize = 6;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Answers whether a classroom code is already in use.
///
/// The database-backed implementation lives with the classroom handlers; the
/// `HashSet` implementation serves tests and offline tooling.
#[async_trait]
pub trait CodeRegistry: Sync {
    type Error: From<EngineError> + Send;

    async fn is_taken(&self, code: &str) -> Result<bool, Self::Error>;
}

#[async_trait]
impl CodeRegistry for HashSet<String> {
    type Error = EngineError;

    async fn is_taken(&self, code: &str) -> Result<bool, Self::Error> {
        Ok(self.contains(code))
    }
}

/// Draws one candidate code.
pub fn random_code<R: RandomSource + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.below(ALPHABET.len())] as char)
        .collect()
}

/// Normalizes user input (`" ab12cd "` -> `"AB12CD"`). `None` if it can't be a code.
pub fn normalize_code(input: &str) -> Option<String> {
    let code = input.trim().to_ascii_uppercase();
    is_valid_code(&code).then_some(code)
}

pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
}

/// Draws codes until the registry reports one as free.
///
/// Gives up with [`EngineError::CodeSpaceExhausted`] after `max_attempts` collisions.
/// The registry check is not atomic with the later insert; the store's unique
/// index on `classrooms.code` catches the remaining race.
pub async fn generate_unique_code<R, C>(
    rng: &mut R,
    registry: &C,
    max_attempts: u32,
) -> Result<String, C::Error>
where
    R: RandomSource + Send + ?Sized,
    C: CodeRegistry + ?Sized,
{
    let attempts = max_attempts.max(1);
    for _ in 0..attempts {
        let candidate = random_code(rng);
        if !registry.is_taken(&candidate).await? {
            return Ok(candidate);
        }
        tracing::debug!("Classroom code {} already taken, drawing again", candidate);
    }

    Err(EngineError::CodeSpaceExhausted { attempts }.into())
}
