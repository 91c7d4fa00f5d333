/// Occurrence counting with first-seen tie breaking.
use std::collections::HashMap;

use serde_json::Value as JsonValue;

/// Counts string occurrences, remembering the order keys were first seen.
#[derive(Debug, Clone, Default)]
pub struct FrequencyCounter {
    counts: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.counts.len());
                self.counts.push((key.to_string(), 1));
            }
        }
    }

    /// Count `key` unless it is empty.
    pub fn add_nonempty(&mut self, key: &str) {
        if !key.is_empty() {
            self.add(key);
        }
    }

    /// Count every non-empty string inside a JSON array; anything else is ignored.
    pub fn add_strings(&mut self, value: Option<&JsonValue>) {
        let Some(JsonValue::Array(values)) = value else {
            return;
        };
        for key in values.iter().filter_map(JsonValue::as_str) {
            self.add_nonempty(key);
        }
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// All keys by descending count; ties keep first-seen order.
    pub fn into_sorted(self) -> Vec<(String, usize)> {
        let mut counts = self.counts;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// The `n` most frequent keys.
    pub fn top(self, n: usize) -> Vec<(String, usize)> {
        let mut sorted = self.into_sorted();
        sorted.truncate(n);
        sorted
    }
}
