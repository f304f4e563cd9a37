use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::{Puzzle, PuzzleFetchError, PuzzleSource};

// Raw payload: `question` is an image reference, `solution` usually a number.
#[derive(Debug, Deserialize)]
struct PuzzlePayload {
    question: String,
    solution: serde_json::Value,
}

// Thin reqwest client for the remote puzzle endpoint.
#[derive(Clone)]
pub struct PuzzleClient {
    http: reqwest::Client,
    url: String,
}

impl PuzzleClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PuzzleSource for PuzzleClient {
    async fn fetch_puzzle(&self) -> Result<Puzzle, PuzzleFetchError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|_| PuzzleFetchError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            return Err(PuzzleFetchError::Status(status.as_u16()));
        }

        let payload = response
            .json::<PuzzlePayload>()
            .await
            .map_err(|_| PuzzleFetchError::Malformed)?;
        parse_payload(payload)
    }
}

fn parse_payload(payload: PuzzlePayload) -> Result<Puzzle, PuzzleFetchError> {
    let question = payload.question.trim().to_string();
    if question.is_empty() {
        return Err(PuzzleFetchError::Malformed);
    }

    let solution = match payload.solution {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Err(PuzzleFetchError::Malformed),
    };

    let image = question.starts_with("http").then(|| question.clone());
    Ok(Puzzle {
        question,
        image,
        solution,
        reward: None,
    })
}
