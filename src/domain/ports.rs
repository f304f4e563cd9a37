use async_trait::async_trait;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::domain::puzzle::Puzzle;

// Port for the uniform rolls behind spawning and power-up drops.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn unit(&mut self) -> f32;

    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.unit()
    }

    fn chance(&mut self, probability: f32) -> bool {
        self.unit() < probability
    }

    /// Uniform index into a table of `len` entries (`len` must be non-zero).
    fn pick(&mut self, len: usize) -> usize {
        ((self.unit() * len as f32) as usize).min(len.saturating_sub(1))
    }
}

impl RandomSource for Pcg32 {
    fn unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleFetchError {
    Unreachable,
    Status(u16),
    Malformed,
}

// Port for the optional remote puzzle endpoint.
#[async_trait]
pub trait PuzzleSource: Send + Sync {
    async fn fetch_puzzle(&self) -> Result<Puzzle, PuzzleFetchError>;
}
