//! The token stream of one ESIL instruction.

use crate::esil::Keyword;

/// An ordered stream over the comma-delimited tokens of one instruction,
/// with skip-ahead support for conditional bodies.
#[derive(Clone, Debug)]
pub struct TokenStream<'a> {
    tokens: Vec<&'a str>,
    position: usize,
}

impl<'a> TokenStream<'a> {
    /// Tokenize an instruction's ESIL text. Empty tokens (an empty
    /// instruction, stray commas) are dropped.
    pub fn new(code: &'a str) -> TokenStream<'a> {
        TokenStream {
            tokens: code.split(',').filter(|token| !token.is_empty()).collect(),
            position: 0,
        }
    }

    /// Build a stream over already-split tokens.
    pub fn from_tokens(tokens: &[&'a str]) -> TokenStream<'a> {
        TokenStream {
            tokens: tokens.to_vec(),
            position: 0,
        }
    }

    /// The next token, advancing the stream.
    pub fn next(&mut self) -> Option<&'a str> {
        let token = self.tokens.get(self.position).copied();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    /// The tokens not yet consumed.
    pub fn remaining(&self) -> &[&'a str] {
        &self.tokens[self.position..]
    }

    /// Consume the rest of the stream.
    pub fn exhaust(&mut self) {
        self.position = self.tokens.len();
    }

    /// Skip past the end-conditional token matching the start-conditional
    /// just consumed, honoring nesting. A body with no terminator skips
    /// to the end of the stream.
    pub fn skip_conditional_body(&mut self) {
        match TokenStream::matching_terminator(self.remaining()) {
            Some(index) => self.position += index + 1,
            None => self.exhaust(),
        }
    }

    /// The index of the end-conditional token closing the conditional
    /// body which starts at the beginning of `tokens`, honoring nesting.
    pub fn matching_terminator(tokens: &[&'a str]) -> Option<usize> {
        let mut depth = 0usize;
        for (index, token) in tokens.iter().enumerate() {
            if *token == Keyword::StartConditional.token() {
                depth += 1;
            } else if *token == Keyword::EndConditional.token() {
                if depth == 0 {
                    return Some(index);
                }
                depth -= 1;
            }
        }
        None
    }
}
