use std::{env, path::PathBuf, time::Duration};

// Runtime/server settings (not gameplay tuning).

pub fn http_port() -> u16 {
    env::var("ARCADE_SERVER_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3003)
}

/// Remote puzzle endpoint; set to an empty string to always use the built-in puzzle.
pub fn puzzle_api_url() -> Option<String> {
    match env::var("PUZZLE_API_URL") {
        Ok(url) if url.trim().is_empty() => None,
        Ok(url) => Some(url.trim().to_string()),
        Err(_) => Some("http://marcconrad.com/uob/heart/api.php?out=json".to_string()),
    }
}

pub fn puzzle_fetch_timeout() -> Duration {
    millis_var("PUZZLE_FETCH_TIMEOUT_MS", 2000)
}

pub fn tick_interval() -> Duration {
    millis_var("ARCADE_TICK_MS", 50)
}

pub fn countdown_interval() -> Duration {
    millis_var("ARCADE_COUNTDOWN_MS", 1000)
}

/// Optional TOML file overriding the built-in variant presets.
pub fn tuning_file() -> Option<PathBuf> {
    env::var("ARCADE_TUNING_FILE")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Fixed seed for reproducible spawns; entropy-seeded when unset.
pub fn rng_seed() -> Option<u64> {
    env::var("ARCADE_RNG_SEED")
        .ok()
        .and_then(|v| v.trim().parse().ok())
}

fn millis_var(name: &str, default: u64) -> Duration {
    let millis = env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .unwrap_or(default);
    Duration::from_millis(millis)
}

pub const COMMAND_CHANNEL_CAPACITY: usize = 64;
