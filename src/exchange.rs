// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Exchange Kinds and Routing
//!
//! Exchanges on a real broker are provisioned out of band; this module only names
//! their kinds and implements the routing-key match each kind performs, which the
//! in-memory broker uses to route publishes to bound queues.

/// Represents the types of exchanges the delivery layer routes through.
///
/// - Direct: the binding key must equal the routing key
/// - Topic: the binding key is a dot-separated pattern where `*` matches exactly
///   one word and `#` matches zero or more words
/// - Fanout: every bound queue receives every message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExchangeKind {
    #[default]
    Direct,
    Topic,
    Fanout,
}

impl ExchangeKind {
    /// Returns whether a message published with `routing_key` reaches a queue bound
    /// with `binding_key`.
    pub fn matches(&self, binding_key: &str, routing_key: &str) -> bool {
        match self {
            ExchangeKind::Direct => binding_key == routing_key,
            ExchangeKind::Fanout => true,
            ExchangeKind::Topic => {
                let pattern: Vec<&str> = binding_key.split('.').collect();
                let words: Vec<&str> = routing_key.split('.').collect();
                topic_matches(&pattern, &words)
            }
        }
    }
}

/// `reachable[j]` holds when the pattern read so far can consume exactly the first
/// `j` words.
fn topic_matches(pattern: &[&str], words: &[&str]) -> bool {
    let mut reachable = vec![false; words.len() + 1];
    reachable[0] = true;

    for token in pattern {
        let mut next = vec![false; words.len() + 1];
        match *token {
            "#" => {
                let mut seen = false;
                for (j, slot) in next.iter_mut().enumerate() {
                    seen |= reachable[j];
                    *slot = seen;
                }
            }
            "*" => {
                for j in 1..=words.len() {
                    next[j] = reachable[j - 1];
                }
            }
            literal => {
                for j in 1..=words.len() {
                    next[j] = reachable[j - 1] && words[j - 1] == literal;
                }
            }
        }
        reachable = next;
    }

    reachable[words.len()]
}

/// Definition of an exchange to provision on the in-memory broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeDefinition {
    pub(crate) name: String,
    pub(crate) kind: ExchangeKind,
}

impl ExchangeDefinition {
    /// Creates a new direct exchange definition with the given name.
    pub fn new(name: &str) -> ExchangeDefinition {
        ExchangeDefinition {
            name: name.to_owned(),
            kind: ExchangeKind::Direct,
        }
    }

    /// Sets the exchange type.
    pub fn kind(mut self, kind: ExchangeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the exchange type to Direct.
    pub fn direct(self) -> Self {
        self.kind(ExchangeKind::Direct)
    }

    /// Sets the exchange type to Topic.
    pub fn topic(self) -> Self {
        self.kind(ExchangeKind::Topic)
    }

    /// Sets the exchange type to Fanout.
    pub fn fanout(self) -> Self {
        self.kind(ExchangeKind::Fanout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_requires_exact_key() {
        assert!(ExchangeKind::Direct.matches("pause", "pause"));
        assert!(!ExchangeKind::Direct.matches("pause.*", "pause"));
        assert!(!ExchangeKind::Direct.matches("pause", "pause.alice"));
    }

    #[test]
    fn topic_star_matches_exactly_one_word() {
        let topic = ExchangeKind::Topic;

        assert!(topic.matches("army_moves.*", "army_moves.alice"));
        assert!(!topic.matches("army_moves.*", "army_moves"));
        assert!(!topic.matches("army_moves.*", "army_moves.alice.bob"));
        assert!(!topic.matches("army_moves.*", "war.alice"));
    }

    #[test]
    fn topic_hash_matches_zero_or_more_words() {
        let topic = ExchangeKind::Topic;

        assert!(topic.matches("#", ""));
        assert!(topic.matches("#", "game_logs.alice"));
        assert!(topic.matches("game_logs.#", "game_logs"));
        assert!(topic.matches("game_logs.#", "game_logs.alice.2"));
        assert!(topic.matches("*.#.end", "a.b.c.end"));
        assert!(!topic.matches("game_logs.#", "army_moves.alice"));
    }

    #[test]
    fn topic_with_many_hashes_resolves_without_backtracking() {
        let topic = ExchangeKind::Topic;
        let pattern = vec!["#"; 24].join(".") + ".x";
        let long_key = vec!["w"; 64].join(".");

        assert!(!topic.matches(&pattern, &long_key));
        assert!(topic.matches(&pattern, &(long_key.clone() + ".x")));
        assert!(topic.matches("#.#", "a"));
        assert!(!topic.matches("#.*.#.*", "a"));
    }

    #[test]
    fn fanout_ignores_key() {
        assert!(ExchangeKind::Fanout.matches("", "anything.at.all"));
    }
}
