//! ESIL tokenization, classification and abstract interpretation.
//!
//! ESIL is a compact, comma-delimited postfix representation of machine
//! instructions. `Transformer` interprets one instruction's ESIL over
//! the abstract domains in `crate::domain`, turning an input
//! `AbstractEnvironment` into the environment after the instruction.

mod classifier;
mod keyword;
mod token;
mod transformer;

pub use self::classifier::{Classifier, Token};
pub use self::keyword::Keyword;
pub use self::token::TokenStream;
pub use self::transformer::{Transformation, Transformer, Warning};
