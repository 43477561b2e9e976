use serde::{Deserialize, Serialize};

use super::engine::{Outcome, SourceSlot};

/// Counters for one run. Created by the run, returned by value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    pub processed: usize,
    pub found_in_cache: usize,
    #[serde(rename = "foundSourceA")]
    pub found_primary: usize,
    #[serde(rename = "foundSourceB")]
    pub found_secondary: usize,
    pub not_found: usize,
}

impl RunStats {
    /// Count one processed item under its outcome.
    pub fn tally(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Cached(_) => self.found_in_cache += 1,
            Outcome::Found(SourceSlot::Primary, _) => self.found_primary += 1,
            Outcome::Found(SourceSlot::Secondary, _) => self.found_secondary += 1,
            Outcome::NotFound => self.not_found += 1,
        }
        self.processed += 1;
    }

    /// Every processed item lands in exactly one outcome bucket.
    pub fn is_consistent(&self) -> bool {
        self.found_in_cache + self.found_primary + self.found_secondary + self.not_found
            == self.processed
    }
}
