//! Classification of raw ESIL tokens.

use crate::architecture::RegisterFile;
use crate::esil::Keyword;

/// A classified ESIL token.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Token<'a> {
    Keyword(Keyword),
    Constant(u64),
    Register(&'a str),
    Flag(&'a str),
}

/// Decides, for a raw token, which of the four syntactic categories it
/// belongs to. Register and flag names come from the driver-supplied
/// `RegisterFile`; the operator vocabulary is fixed.
#[derive(Clone, Debug)]
pub struct Classifier<'r> {
    registers: &'r RegisterFile,
}

impl<'r> Classifier<'r> {
    pub fn new(registers: &'r RegisterFile) -> Classifier<'r> {
        Classifier { registers }
    }

    /// Classify a token, or `None` when it fits no category. Precedence
    /// is keyword, then numeric constant, then register, then flag.
    pub fn classify<'a>(&self, token: &'a str) -> Option<Token<'a>> {
        if let Some(keyword) = Keyword::from_token(token) {
            return Some(Token::Keyword(keyword));
        }
        if let Some(value) = self.parse_constant(token) {
            return Some(Token::Constant(value));
        }
        if self.registers.is_register(token) {
            return Some(Token::Register(token));
        }
        if self.registers.is_flag(token) {
            return Some(Token::Flag(token));
        }
        None
    }

    /// Parse a numeric literal in the disassembler's syntaxes
    /// (hexadecimal with an `0x` prefix, or decimal, either optionally
    /// negated), wrapped into the platform word width.
    fn parse_constant(&self, token: &str) -> Option<u64> {
        let (negative, digits) = match token.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, token),
        };
        let magnitude = match digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            Some(hex) => u128::from_str_radix(hex, 16).ok()?,
            None => digits.parse::<u128>().ok()?,
        };
        let value = magnitude as u64;
        let value = if negative { value.wrapping_neg() } else { value };
        Some(self.registers.word_width().truncate(value))
    }
}
