//! Streaming statement splitter.
//!
//! Reassembles semicolon-terminated statements from arbitrarily chunked
//! reads. Splitting is purely lexical: the only boundary is the ASCII `;`,
//! and with quote awareness off a `;` inside a string literal still ends the
//! statement.
//!
//! Bytes are treated as opaque. `;` never occurs inside a multi-byte UTF-8
//! sequence, so byte-level splitting keeps characters intact; the text is
//! only decoded (lossily) when a complete statement is emitted.

/// What to do with unterminated text left over at end of input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TrailingPolicy {
    /// Discard it silently.
    #[default]
    Drop,
    /// Return it as a final statement.
    Emit,
}

/// Splits a byte stream into statements.
#[derive(Debug, Default)]
pub struct StatementSplitter {
    carry_over: Vec<u8>,
    policy: TrailingPolicy,
    quote_aware: bool,
    in_quote: bool,
}

impl StatementSplitter {
    /// Creates a splitter that drops trailing fragments and ignores quotes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the end-of-stream policy.
    pub fn with_trailing_policy(mut self, policy: TrailingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Makes `;` inside single-quoted literals part of the statement.
    pub fn with_quote_awareness(mut self, enabled: bool) -> Self {
        self.quote_aware = enabled;
        self
    }

    /// Consumes one chunk and returns every statement it completes, in order.
    ///
    /// Each statement keeps its terminating `;`. Only the bytes of `chunk`
    /// are scanned; the carry-over is never re-examined.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut statements = Vec::new();
        let mut start = 0;

        for (pos, &byte) in chunk.iter().enumerate() {
            match byte {
                b'\'' if self.quote_aware => self.in_quote = !self.in_quote,
                b';' if !self.in_quote => {
                    self.carry_over.extend_from_slice(&chunk[start..=pos]);
                    statements.push(String::from_utf8_lossy(&self.carry_over).into_owned());
                    self.carry_over.clear();
                    start = pos + 1;
                }
                _ => {}
            }
        }

        self.carry_over.extend_from_slice(&chunk[start..]);
        statements
    }

    /// Returns true if unterminated, non-blank text is waiting for more input.
    pub fn has_pending(&self) -> bool {
        self.carry_over.iter().any(|b| !b.is_ascii_whitespace())
    }

    /// Ends the stream, applying the trailing policy to any leftover text.
    pub fn finish(self) -> Option<String> {
        if !self.has_pending() {
            return None;
        }
        match self.policy {
            TrailingPolicy::Drop => {
                tracing::debug!(
                    bytes = self.carry_over.len(),
                    "Dropping unterminated statement at end of input"
                );
                None
            }
            TrailingPolicy::Emit => Some(String::from_utf8_lossy(&self.carry_over).into_owned()),
        }
    }
}

/// Splits a complete input in one go, including the end-of-stream step.
pub fn split_all(input: &[u8], policy: TrailingPolicy) -> Vec<String> {
    let mut splitter = StatementSplitter::new().with_trailing_policy(policy);
    let mut statements = splitter.feed(input);
    statements.extend(splitter.finish());
    statements
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCRIPT: &str = "CREATE KEYSPACE ks WITH replication = {'class': 'SimpleStrategy'};\n\
        USE ks;\n\
        CREATE TABLE t (id int PRIMARY KEY, name text);\n\
        INSERT INTO t (id, name) VALUES (1, 'alice');\n\
        SELECT * FROM t;\n";

    fn split_in_chunks(input: &[u8], size: usize, policy: TrailingPolicy) -> Vec<String> {
        let mut splitter = StatementSplitter::new().with_trailing_policy(policy);
        let mut out = Vec::new();
        for chunk in input.chunks(size) {
            out.extend(splitter.feed(chunk));
        }
        out.extend(splitter.finish());
        out
    }

    #[test]
    fn test_multiple_statements_in_one_chunk() {
        let mut splitter = StatementSplitter::new();
        assert_eq!(splitter.feed(b"a;b;c;"), vec!["a;", "b;", "c;"]);
        assert!(!splitter.has_pending());
    }

    #[test]
    fn test_chunking_does_not_change_statements() {
        let whole = split_all(SCRIPT.as_bytes(), TrailingPolicy::Drop);
        assert_eq!(whole.len(), 5);

        for size in [1, 2, 3, 7, 16, 64, 1023] {
            assert_eq!(
                split_in_chunks(SCRIPT.as_bytes(), size, TrailingPolicy::Drop),
                whole,
                "chunk size {size}"
            );
        }
    }

    #[test]
    fn test_semicolon_at_chunk_boundary() {
        let mut splitter = StatementSplitter::new();
        assert_eq!(splitter.feed(b"SELECT 1;"), vec!["SELECT 1;"]);
        assert_eq!(splitter.feed(b"SELECT 2;"), vec!["SELECT 2;"]);
        assert!(splitter.feed(b"").is_empty());
        assert_eq!(splitter.finish(), None);
    }

    #[test]
    fn test_semicolon_right_after_carry_over() {
        let mut splitter = StatementSplitter::new();
        assert!(splitter.feed(b"SELECT * FROM").is_empty());
        assert!(splitter.has_pending());
        assert_eq!(splitter.feed(b" t"), Vec::<String>::new());
        assert_eq!(splitter.feed(b";x"), vec!["SELECT * FROM t;"]);
        assert!(splitter.has_pending());
    }

    #[test]
    fn test_trailing_fragment_dropped_by_default() {
        let statements = split_all(b"a; b", TrailingPolicy::Drop);
        assert_eq!(statements, vec!["a;"]);
    }

    #[test]
    fn test_trailing_fragment_emitted_on_request() {
        let statements = split_all(b"a; b", TrailingPolicy::Emit);
        assert_eq!(statements, vec!["a;", " b"]);
    }

    #[test]
    fn test_whitespace_tail_is_not_pending() {
        let statements = split_all(b"a;\n\n  ", TrailingPolicy::Emit);
        assert_eq!(statements, vec!["a;"]);
    }

    #[test]
    fn test_multibyte_character_split_across_chunks() {
        let input = "INSERT INTO t (name) VALUES ('żółw');".as_bytes();
        assert_eq!(
            split_in_chunks(input, 1, TrailingPolicy::Drop),
            vec!["INSERT INTO t (name) VALUES ('żółw');"]
        );
    }

    #[test]
    fn test_invalid_utf8_is_not_rejected() {
        let statements = split_all(b"SELECT \xff;", TrailingPolicy::Drop);
        assert_eq!(statements, vec!["SELECT \u{fffd};"]);
    }

    #[test]
    fn test_semicolon_in_literal_splits_without_quote_awareness() {
        let statements = split_all(b"INSERT INTO t VALUES ('a;b');", TrailingPolicy::Drop);
        assert_eq!(statements, vec!["INSERT INTO t VALUES ('a;"]);
    }

    #[test]
    fn test_quote_aware_keeps_literal_across_chunks() {
        let input = b"INSERT INTO t VALUES ('a;b', 'it''s;');SELECT 1;";
        for size in [1, 5, input.len()] {
            let mut splitter = StatementSplitter::new().with_quote_awareness(true);
            let mut out = Vec::new();
            for chunk in input.chunks(size) {
                out.extend(splitter.feed(chunk));
            }
            assert_eq!(
                out,
                vec!["INSERT INTO t VALUES ('a;b', 'it''s;');", "SELECT 1;"],
                "chunk size {size}"
            );
        }
    }

    #[test]
    fn test_empty_statements_are_still_split() {
        assert_eq!(split_all(b";;", TrailingPolicy::Drop), vec![";", ";"]);
    }
}
