use std::collections::VecDeque;

/// A delimiter-free byte run cut from the stream. May be empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token(pub Vec<u8>);

impl Token {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.as_bytes().to_vec())
    }
}

/// Incremental splitter over an append-only byte stream.
///
/// Bytes after the last delimiter are carried over to the next `feed`.
/// The carried-over buffer is bounded: once it holds more than `limit`
/// bytes with no delimiter, only the trailing `keep` bytes survive.
pub struct TokenParser {
    buffer: VecDeque<u8>,
    delimiter: u8,
    limit: usize,
    keep: usize,
}

impl TokenParser {
    pub fn new(delimiter: u8, limit: usize, keep: usize) -> TokenParser {
        TokenParser {
            buffer: VecDeque::new(),
            delimiter,
            limit,
            keep: keep.min(limit),
        }
    }

    /// Appends `bytes` and returns the tokens completed so far, lazily.
    /// Tokens not pulled from the iterator stay buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Tokens<'_> {
        self.buffer.extend(bytes);
        Tokens { parser: self }
    }

    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn find_delimiter(&self) -> Option<usize> {
        self.buffer.iter().position(|b| *b == self.delimiter)
    }

    fn next_token(&mut self) -> Option<Token> {
        let index = self.find_delimiter()?;
        let token = self.buffer.drain(..index).collect::<Vec<_>>();
        self.buffer.pop_front(); // delimiter
        Some(Token(token))
    }

    fn truncate_if_overflowing(&mut self) {
        if self.buffer.len() <= self.limit {
            return;
        }
        let discarded = self.buffer.len() - self.keep;
        log::warn!(
            "No delimiter in {} pending bytes, discarding the oldest {}",
            self.buffer.len(),
            discarded
        );
        self.buffer.drain(..discarded);
    }
}

pub struct Tokens<'a> {
    parser: &'a mut TokenParser,
}

impl Iterator for Tokens<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        match self.parser.next_token() {
            Some(token) => Some(token),
            None => {
                self.parser.truncate_if_overflowing();
                None
            }
        }
    }
}
