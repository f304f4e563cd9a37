// Remote puzzle retrieval with the built-in fallback.

use tracing::warn;

use crate::domain::{FALLBACK_NOTICE, Puzzle, PuzzleSource};

/// A puzzle ready to install, plus the notice to show with it.
#[derive(Debug, Clone, PartialEq)]
pub struct PuzzleDelivery {
    pub puzzle: Puzzle,
    pub notice: Option<String>,
}

/// Never fails: any source error yields the fallback puzzle and its notice.
pub async fn fetch_puzzle_or_fallback(source: &dyn PuzzleSource) -> PuzzleDelivery {
    match source.fetch_puzzle().await {
        Ok(puzzle) => PuzzleDelivery {
            puzzle,
            notice: None,
        },
        Err(error) => {
            warn!(?error, "puzzle fetch failed, using fallback puzzle");
            PuzzleDelivery {
                puzzle: Puzzle::fallback(),
                notice: Some(FALLBACK_NOTICE.to_string()),
            }
        }
    }
}
