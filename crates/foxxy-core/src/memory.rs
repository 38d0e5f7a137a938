//! Conversation Memory: bounded recent-turn log giving the model short-term context.
//!
//! Process memory only; nothing survives a restart. Turns are keyed by session so
//! concurrent visitors do not read each other's context. Callers without a session
//! share [`DEFAULT_SESSION`].

use std::collections::VecDeque;
use std::time::Instant;

use dashmap::DashMap;
use serde::Serialize;

pub const DEFAULT_SESSION: &str = "default";

const MAX_SESSION_KEY_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message of a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Ordered turns, never longer than `cap`. Oldest turns drop first.
#[derive(Debug, Clone)]
pub(crate) struct ConversationHistory {
    turns: VecDeque<Turn>,
    cap: usize,
}

impl ConversationHistory {
    pub fn new(cap: usize) -> Self {
        Self { turns: VecDeque::with_capacity(cap.min(64)), cap }
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
        while self.turns.len() > self.cap {
            self.turns.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }
}

struct Session {
    history: ConversationHistory,
    last_used: Instant,
}

/// Session-keyed histories, bounded in both turns per session and number of sessions.
pub struct MemoryStore {
    sessions: DashMap<String, Session>,
    cap: usize,
    max_sessions: usize,
}

impl MemoryStore {
    pub fn new(cap: usize, max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            cap,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Current turns of `session`, oldest first. Unknown sessions are empty.
    pub fn snapshot(&self, session: &str) -> Vec<Turn> {
        self.sessions
            .get(session)
            .map(|s| s.history.snapshot())
            .unwrap_or_default()
    }

    /// Appends `turns` in order, trimming to the cap. A new session may evict the
    /// least recently used one when `max_sessions` is reached.
    ///
    /// The capacity check and the insert are not one atomic step: new sessions racing
    /// each other can overshoot `max_sessions` by at most the number of racers, and
    /// the next new session brings the count back under the bound.
    pub fn append(&self, session: &str, turns: impl IntoIterator<Item = Turn>) {
        if !self.sessions.contains_key(session) {
            while self.sessions.len() >= self.max_sessions {
                if !self.evict_oldest() {
                    break;
                }
            }
        }
        let cap = self.cap;
        let mut entry = self
            .sessions
            .entry(session.to_string())
            .or_insert_with(|| Session {
                history: ConversationHistory::new(cap),
                last_used: Instant::now(),
            });
        for turn in turns {
            entry.history.append(turn);
        }
        entry.last_used = Instant::now();
    }

    pub fn len(&self, session: &str) -> usize {
        self.sessions.get(session).map(|s| s.history.len()).unwrap_or(0)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// False when there was nothing left to evict.
    fn evict_oldest(&self) -> bool {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|s| s.value().last_used)
            .map(|s| s.key().clone());
        match oldest {
            Some(key) => {
                tracing::debug!("[MEMORY] Evicting idle session {}", key);
                self.sessions.remove(&key);
                true
            }
            None => false,
        }
    }
}

/// Normalizes a client-supplied session id. Blank, overlong or non-printable ids
/// fall back to [`DEFAULT_SESSION`].
pub fn session_key(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s)
            if !s.is_empty()
                && s.len() <= MAX_SESSION_KEY_LEN
                && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') =>
        {
            s.to_string()
        }
        _ => DEFAULT_SESSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_never_exceeds_cap() {
        for cap in [0usize, 1, 2, 20, 40] {
            let mut h = ConversationHistory::new(cap);
            for i in 0..(cap * 3 + 5) {
                h.append(Turn::user(format!("m{}", i)));
                assert!(h.len() <= cap);
            }
        }
    }

    #[test]
    fn trimming_keeps_most_recent_in_order() {
        let mut h = ConversationHistory::new(3);
        for i in 0..5 {
            h.append(Turn::user(i.to_string()));
        }
        let contents: Vec<String> = h.snapshot().iter().map(|t| t.content().to_string()).collect();
        assert_eq!(contents, vec!["2", "3", "4"]);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = MemoryStore::new(40, 16);
        store.append("a", [Turn::user("hi"), Turn::assistant("hello")]);
        store.append("b", [Turn::user("other")]);
        assert_eq!(store.len("a"), 2);
        assert_eq!(store.len("b"), 1);
        assert_eq!(store.snapshot("a")[1], Turn::assistant("hello"));
        assert!(store.snapshot("missing").is_empty());
    }

    #[test]
    fn store_respects_cap_per_session() {
        let store = MemoryStore::new(4, 16);
        for i in 0..10 {
            store.append(DEFAULT_SESSION, [Turn::user(i.to_string()), Turn::assistant("ok")]);
            assert!(store.len(DEFAULT_SESSION) <= 4);
        }
        assert_eq!(store.snapshot(DEFAULT_SESSION)[0].content(), "8");
    }

    #[test]
    fn least_recently_used_session_is_evicted() {
        let store = MemoryStore::new(10, 2);
        store.append("first", [Turn::user("1")]);
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.append("second", [Turn::user("2")]);
        std::thread::sleep(std::time::Duration::from_millis(2));
        store.append("first", [Turn::user("1b")]);
        store.append("third", [Turn::user("3")]);
        assert_eq!(store.session_count(), 2);
        assert_eq!(store.len("second"), 0);
        assert_eq!(store.len("first"), 2);
        assert_eq!(store.len("third"), 1);
    }

    #[test]
    fn concurrent_new_sessions_stay_bounded() {
        let store = std::sync::Arc::new(MemoryStore::new(4, 16));
        let workers: Vec<_> = (0..8)
            .map(|w| {
                let store = std::sync::Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..200 {
                        store.append(&format!("w{}-{}", w, i), [Turn::user("hi")]);
                    }
                })
            })
            .collect();
        for w in workers {
            w.join().unwrap();
        }
        assert!(store.session_count() <= 16 + 8, "{} sessions", store.session_count());

        store.append("after", [Turn::user("hi")]);
        assert!(store.session_count() <= 16);
        assert_eq!(store.len("after"), 1);
    }

    #[test]
    fn session_key_normalization() {
        assert_eq!(session_key(None), DEFAULT_SESSION);
        assert_eq!(session_key(Some("   ")), DEFAULT_SESSION);
        assert_eq!(session_key(Some(" abc-123_X ")), "abc-123_X");
        assert_eq!(session_key(Some("has space")), DEFAULT_SESSION);
        assert_eq!(session_key(Some(&"x".repeat(65))), DEFAULT_SESSION);
    }

    #[test]
    fn turns_serialize_with_lowercase_roles() {
        let json = serde_json::to_value(Turn::assistant("hey")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "hey");
    }
}
