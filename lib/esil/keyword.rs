//! The closed vocabulary of ESIL operator keywords.

use std::fmt;

/// An ESIL operator keyword.
///
/// Note the trap: `!=` is negate-and-assign, not inequality, and the
/// `[...]`/`=[...]` families are memory reads and writes at the bracketed
/// byte width (`*` meaning the operation's natural width).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Keyword {
    Assignment,
    Compare,
    Smaller,
    SmallerOrEqual,
    Bigger,
    BiggerOrEqual,
    ShiftLeft,
    ShiftRight,
    RotateLeft,
    RotateRight,
    And,
    Or,
    Xor,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Inc,
    Dec,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    RotateLeftAssign,
    RotateRightAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    IncAssign,
    DecAssign,
    NegAssign,
    Poke,
    PokeAuto,
    Poke1,
    Poke2,
    Poke4,
    Poke8,
    Peek,
    PeekAuto,
    Peek1,
    Peek2,
    Peek4,
    Peek8,
    StartConditional,
    EndConditional,
}

impl Keyword {
    /// Parse a token into a `Keyword`. Returns `None` when the token is
    /// not part of the vocabulary.
    pub fn from_token(token: &str) -> Option<Keyword> {
        Some(match token {
            "=" => Keyword::Assignment,
            "==" => Keyword::Compare,
            "<" => Keyword::Smaller,
            "<=" => Keyword::SmallerOrEqual,
            ">" => Keyword::Bigger,
            ">=" => Keyword::BiggerOrEqual,
            "<<" => Keyword::ShiftLeft,
            ">>" => Keyword::ShiftRight,
            "<<<" => Keyword::RotateLeft,
            ">>>" => Keyword::RotateRight,
            "&" => Keyword::And,
            "|" => Keyword::Or,
            "^" => Keyword::Xor,
            "+" => Keyword::Add,
            "-" => Keyword::Sub,
            "*" => Keyword::Mul,
            "/" => Keyword::Div,
            "%" => Keyword::Mod,
            "!" => Keyword::Neg,
            "++" => Keyword::Inc,
            "--" => Keyword::Dec,
            "+=" => Keyword::AddAssign,
            "-=" => Keyword::SubAssign,
            "*=" => Keyword::MulAssign,
            "/=" => Keyword::DivAssign,
            "%=" => Keyword::ModAssign,
            "<<=" => Keyword::ShiftLeftAssign,
            ">>=" => Keyword::ShiftRightAssign,
            "<<<=" => Keyword::RotateLeftAssign,
            ">>>=" => Keyword::RotateRightAssign,
            "&=" => Keyword::AndAssign,
            "|=" => Keyword::OrAssign,
            "^=" => Keyword::XorAssign,
            "++=" => Keyword::IncAssign,
            "--=" => Keyword::DecAssign,
            "!=" => Keyword::NegAssign,
            "=[]" => Keyword::Poke,
            "=[*]" => Keyword::PokeAuto,
            "=[1]" => Keyword::Poke1,
            "=[2]" => Keyword::Poke2,
            "=[4]" => Keyword::Poke4,
            "=[8]" => Keyword::Poke8,
            "[]" => Keyword::Peek,
            "[*]" => Keyword::PeekAuto,
            "[1]" => Keyword::Peek1,
            "[2]" => Keyword::Peek2,
            "[4]" => Keyword::Peek4,
            "[8]" => Keyword::Peek8,
            "?{" => Keyword::StartConditional,
            "}" => Keyword::EndConditional,
            _ => return None,
        })
    }

    /// The token spelling of this `Keyword`.
    pub fn token(&self) -> &'static str {
        match *self {
            Keyword::Assignment => "=",
            Keyword::Compare => "==",
            Keyword::Smaller => "<",
            Keyword::SmallerOrEqual => "<=",
            Keyword::Bigger => ">",
            Keyword::BiggerOrEqual => ">=",
            Keyword::ShiftLeft => "<<",
            Keyword::ShiftRight => ">>",
            Keyword::RotateLeft => "<<<",
            Keyword::RotateRight => ">>>",
            Keyword::And => "&",
            Keyword::Or => "|",
            Keyword::Xor => "^",
            Keyword::Add => "+",
            Keyword::Sub => "-",
            Keyword::Mul => "*",
            Keyword::Div => "/",
            Keyword::Mod => "%",
            Keyword::Neg => "!",
            Keyword::Inc => "++",
            Keyword::Dec => "--",
            Keyword::AddAssign => "+=",
            Keyword::SubAssign => "-=",
            Keyword::MulAssign => "*=",
            Keyword::DivAssign => "/=",
            Keyword::ModAssign => "%=",
            Keyword::ShiftLeftAssign => "<<=",
            Keyword::ShiftRightAssign => ">>=",
            Keyword::RotateLeftAssign => "<<<=",
            Keyword::RotateRightAssign => ">>>=",
            Keyword::AndAssign => "&=",
            Keyword::OrAssign => "|=",
            Keyword::XorAssign => "^=",
            Keyword::IncAssign => "++=",
            Keyword::DecAssign => "--=",
            Keyword::NegAssign => "!=",
            Keyword::Poke => "=[]",
            Keyword::PokeAuto => "=[*]",
            Keyword::Poke1 => "=[1]",
            Keyword::Poke2 => "=[2]",
            Keyword::Poke4 => "=[4]",
            Keyword::Poke8 => "=[8]",
            Keyword::Peek => "[]",
            Keyword::PeekAuto => "[*]",
            Keyword::Peek1 => "[1]",
            Keyword::Peek2 => "[2]",
            Keyword::Peek4 => "[4]",
            Keyword::Peek8 => "[8]",
            Keyword::StartConditional => "?{",
            Keyword::EndConditional => "}",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}
