use serde::Serialize;

/// Named states of the search view, mirrored to the frontend via
/// `search-state` events.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SearchPhase {
    Idle,
    Searching { seq: u64 },
    ResultsShown { seq: u64, count: usize },
    NoResults { seq: u64 },
    SearchError { seq: u64 },
    Writing { seq: u64 },
    WriteError { seq: u64 },
    Closed,
}

/// State machine for one search view. Every submitted search takes a fresh
/// sequence number; a completion whose number no longer matches the current
/// one is stale and must be discarded, so a slow response can never
/// overwrite a newer result list.
#[derive(Debug)]
pub struct SearchSession {
    phase: SearchPhase,
    next_seq: u64,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self {
            phase: SearchPhase::Idle,
            next_seq: 0,
        }
    }
}

impl SearchSession {
    pub fn phase(&self) -> &SearchPhase {
        &self.phase
    }

    /// Current sequence number, if an operation is underway or displayed.
    fn current_seq(&self) -> Option<u64> {
        match self.phase {
            SearchPhase::Idle | SearchPhase::Closed => None,
            SearchPhase::Searching { seq }
            | SearchPhase::ResultsShown { seq, .. }
            | SearchPhase::NoResults { seq }
            | SearchPhase::SearchError { seq }
            | SearchPhase::Writing { seq }
            | SearchPhase::WriteError { seq } => Some(seq),
        }
    }

    /// A new submit supersedes whatever was happening before, including a
    /// still-running search. Returns the sequence number of the new search.
    pub fn begin_search(&mut self) -> u64 {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.phase = SearchPhase::Searching { seq };
        seq
    }

    /// True when a completion for `seq` is still the one the view waits for.
    pub fn is_current(&self, seq: u64) -> bool {
        self.current_seq() == Some(seq)
    }

    /// Search completed with `count` results. Returns false (and leaves the
    /// phase untouched) when the completion is stale.
    pub fn finish_search(&mut self, seq: u64, count: usize) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        self.phase = if count == 0 {
            SearchPhase::NoResults { seq }
        } else {
            SearchPhase::ResultsShown { seq, count }
        };
        true
    }

    /// Search failed. Stale failures are discarded like stale successes.
    pub fn fail_search(&mut self, seq: u64) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        self.phase = SearchPhase::SearchError { seq };
        true
    }

    /// Row clicked. Only legal while results are shown, or after a failed
    /// write (the user may reselect).
    pub fn begin_write(&mut self) -> Option<u64> {
        match self.phase {
            SearchPhase::ResultsShown { seq, .. } | SearchPhase::WriteError { seq } => {
                self.phase = SearchPhase::Writing { seq };
                Some(seq)
            }
            _ => None,
        }
    }

    /// Note written; the view closes.
    pub fn finish_write(&mut self, seq: u64) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        self.phase = SearchPhase::Closed;
        true
    }

    /// Write failed; the view stays open for another attempt.
    pub fn fail_write(&mut self, seq: u64) -> bool {
        if !self.is_current(seq) {
            return false;
        }
        self.phase = SearchPhase::WriteError { seq };
        true
    }
}
