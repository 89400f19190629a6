//! Slug generation. Uniqueness is checked by the datastore, not here.

use rand::distributions::Alphanumeric;
use rand::Rng;

pub trait SlugGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// `[A-Za-z0-9]{length}` from the thread-local CSPRNG.
#[derive(Debug, Clone)]
pub struct RandomSlugGenerator {
    length: usize,
}

impl RandomSlugGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl SlugGenerator for RandomSlugGenerator {
    fn generate(&self) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect()
    }
}
