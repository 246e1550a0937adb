use std::collections::HashMap;

use tracing::{info, warn};

/// Key under which the best score is persisted, as a stringified integer.
pub const BEST_SCORE_KEY: &str = "bestScore";

/// Minimal string key-value persistence, e.g. browser `localStorage`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Store that lives as long as the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.set(key, value);
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_owned(), value.to_owned());
    }
}

/// Running score of the current game plus the persisted best score.
///
/// The best score never goes down, not even on reset.
#[derive(Debug)]
pub struct ScoreTracker<S> {
    store: S,
    score: u32,
    best: u32,
}

impl<S: KeyValueStore> ScoreTracker<S> {
    pub fn new(store: S) -> Self {
        let best = read_best(&store);
        Self {
            store,
            score: 0,
            best,
        }
    }

    pub const fn score(&self) -> u32 {
        self.score
    }

    pub const fn best_score(&self) -> u32 {
        self.best
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Adds a move's score. Returns true when this set a new best, which is
    /// written to the store right away.
    pub fn record(&mut self, delta: u32) -> bool {
        self.score = self.score.saturating_add(delta);
        if self.score <= self.best {
            return false;
        }
        self.best = self.score;
        self.store.set(BEST_SCORE_KEY, &self.best.to_string());
        info!(best = self.best, "new best score");
        true
    }

    pub const fn reset(&mut self) {
        self.score = 0;
    }
}

fn read_best(store: &impl KeyValueStore) -> u32 {
    let Some(raw) = store.get(BEST_SCORE_KEY) else {
        return 0;
    };
    raw.trim().parse().unwrap_or_else(|err| {
        warn!(%raw, %err, "ignoring unreadable best score");
        0
    })
}
