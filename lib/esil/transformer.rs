//! The ESIL transformer: an abstract interpreter for one instruction.

use crate::architecture::RegisterFile;
use crate::domain::{AbstractEnvironment, Bool3, StridedInterval, ValueSet};
use crate::error::{Error, Result};
use crate::esil::{Classifier, Keyword, Token, TokenStream};
use crate::types::DataWidth;
use log::{debug, trace, warn};
use std::fmt;

/// Conditionals nested deeper than this within a single instruction
/// abort the transformation rather than recursing further.
const MAX_CONDITIONAL_DEPTH: usize = 64;

/// An operation the interpreter encountered but deliberately does not
/// model. The result it produced is a sound over-approximation; the
/// warning records that precision was given up.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Warning {
    UnmodeledCompare,
    UnmodeledOrdering,
    UnmodeledMemoryRead,
    UnmodeledMemoryWrite,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Warning::UnmodeledCompare => write!(f, "comparison is not modeled"),
            Warning::UnmodeledOrdering => write!(f, "ordering predicates are not modeled"),
            Warning::UnmodeledMemoryRead => write!(f, "memory reads are not modeled"),
            Warning::UnmodeledMemoryWrite => write!(f, "memory writes are not modeled"),
        }
    }
}

/// The result of transforming one instruction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Transformation {
    /// The abstract machine state after the instruction.
    pub environment: AbstractEnvironment,
    /// Unmodeled operations encountered along the way.
    pub warnings: Vec<Warning>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum IdentifierKind {
    Register,
    Flag,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Identifier<'t> {
    name: &'t str,
    kind: IdentifierKind,
}

/// One operand on the interpreter's stack. Register and flag names stay
/// symbolic until an operator forces a typed value out of them, because
/// assignment targets must not be dereferenced.
#[derive(Clone, Debug)]
enum StackEntry<'t> {
    Value(ValueSet),
    Boolean(Bool3),
    Identifier(Identifier<'t>),
}

impl<'t> StackEntry<'t> {
    /// Does this entry want boolean treatment under the kind-dispatched
    /// connectives (`&`, `|`, `^`)?
    fn is_boolean_kind(&self) -> bool {
        match *self {
            StackEntry::Boolean(_) => true,
            StackEntry::Identifier(identifier) => identifier.kind == IdentifierKind::Flag,
            StackEntry::Value(_) => false,
        }
    }
}

impl<'t> fmt::Display for StackEntry<'t> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            StackEntry::Value(ref value) => value.fmt(f),
            StackEntry::Boolean(value) => value.fmt(f),
            StackEntry::Identifier(identifier) => write!(f, "{}", identifier.name),
        }
    }
}

/// The abstract interpreter for ESIL instructions.
///
/// A `Transformer` borrows the platform's `RegisterFile` and is otherwise
/// stateless: each call to `transform` allocates a fresh operand stack
/// and a fresh copy of the input environment, so one transformation is a
/// pure function of the instruction text and the input environment.
#[derive(Clone, Debug)]
pub struct Transformer<'r> {
    registers: &'r RegisterFile,
}

impl<'r> Transformer<'r> {
    pub fn new(registers: &'r RegisterFile) -> Transformer<'r> {
        Transformer { registers }
    }

    /// Transform an instruction's ESIL against the given input
    /// environment. An empty instruction is a no-op returning an
    /// unmodified copy of the input.
    pub fn transform(
        &self,
        esil: &str,
        environment: &AbstractEnvironment,
    ) -> Result<Transformation> {
        debug!("transforming [{}]", esil);
        let stream = TokenStream::new(esil);
        let (environment, warnings) = self.interpret(stream.remaining(), environment, 0)?;
        Ok(Transformation {
            environment,
            warnings,
        })
    }

    fn interpret(
        &self,
        tokens: &[&str],
        environment: &AbstractEnvironment,
        depth: usize,
    ) -> Result<(AbstractEnvironment, Vec<Warning>)> {
        if depth > MAX_CONDITIONAL_DEPTH {
            return Err(Error::ConditionalDepth(MAX_CONDITIONAL_DEPTH));
        }
        let mut interpretation = Interpretation {
            transformer: self,
            classifier: Classifier::new(self.registers),
            width: self.registers.word_width(),
            env: environment.clone(),
            stack: Vec::new(),
            warnings: Vec::new(),
            depth,
        };
        let mut stream = TokenStream::from_tokens(tokens);
        while let Some(token) = stream.next() {
            interpretation.step(token, &mut stream)?;
        }
        Ok((interpretation.env, interpretation.warnings))
    }
}

/// The state of one in-flight transformation.
struct Interpretation<'a, 'r, 't> {
    transformer: &'a Transformer<'r>,
    classifier: Classifier<'r>,
    width: DataWidth,
    env: AbstractEnvironment,
    stack: Vec<StackEntry<'t>>,
    warnings: Vec<Warning>,
    depth: usize,
}

impl<'a, 'r, 't> Interpretation<'a, 'r, 't> {
    fn step(&mut self, token: &'t str, stream: &mut TokenStream<'t>) -> Result<()> {
        match self.classifier.classify(token) {
            Some(Token::Keyword(keyword)) => self.execute(keyword, stream),
            Some(Token::Constant(value)) => {
                self.stack.push(StackEntry::Value(ValueSet::new_global(
                    StridedInterval::singleton(value, self.width),
                )));
                Ok(())
            }
            Some(Token::Register(name)) => {
                self.stack.push(StackEntry::Identifier(Identifier {
                    name,
                    kind: IdentifierKind::Register,
                }));
                Ok(())
            }
            Some(Token::Flag(name)) => {
                self.stack.push(StackEntry::Identifier(Identifier {
                    name,
                    kind: IdentifierKind::Flag,
                }));
                Ok(())
            }
            None => Err(Error::UnknownToken(token.to_string())),
        }
    }

    fn execute(&mut self, keyword: Keyword, stream: &mut TokenStream<'t>) -> Result<()> {
        trace!("executing {} ({} operands on stack)", keyword, self.stack.len());
        match keyword {
            Keyword::Assignment => self.execute_assignment(),
            Keyword::Compare => {
                warn!("comparison (==) is not modeled; discarding operands");
                self.warnings.push(Warning::UnmodeledCompare);
                self.pop(keyword)?;
                self.pop(keyword)?;
                Ok(())
            }
            Keyword::Smaller
            | Keyword::SmallerOrEqual
            | Keyword::Bigger
            | Keyword::BiggerOrEqual => {
                warn!("ordering predicate {} is not modeled; result is unconstrained", keyword);
                self.warnings.push(Warning::UnmodeledOrdering);
                self.pop(keyword)?;
                self.pop(keyword)?;
                self.stack.push(StackEntry::Boolean(Bool3::Maybe));
                Ok(())
            }
            Keyword::ShiftLeft => self.execute_value_binop(keyword, ValueSet::shl),
            Keyword::ShiftRight => self.execute_value_binop(keyword, ValueSet::shr),
            Keyword::RotateLeft => self.execute_value_binop(keyword, ValueSet::rol),
            Keyword::RotateRight => self.execute_value_binop(keyword, ValueSet::ror),
            Keyword::And => self.execute_connective(keyword, Bool3::and, ValueSet::and),
            Keyword::Or => self.execute_connective(keyword, Bool3::or, ValueSet::or),
            Keyword::Xor => self.execute_connective(keyword, Bool3::xor, ValueSet::xor),
            Keyword::Add => self.execute_value_binop(keyword, ValueSet::add),
            Keyword::Sub => self.execute_value_binop(keyword, ValueSet::sub),
            Keyword::Mul => self.execute_value_binop(keyword, ValueSet::mul),
            Keyword::Div => self.execute_value_binop(keyword, ValueSet::div),
            Keyword::Mod => self.execute_value_binop(keyword, ValueSet::rem),
            Keyword::Neg => {
                let value = self.pop_boolean(keyword)?;
                self.stack.push(StackEntry::Boolean(value.not()));
                Ok(())
            }
            Keyword::Inc => self.execute_inc(keyword),
            Keyword::Dec => self.execute_dec(keyword),
            Keyword::AddAssign => {
                self.execute_compound(keyword, |i| i.execute_value_binop(keyword, ValueSet::add))
            }
            Keyword::SubAssign => {
                self.execute_compound(keyword, |i| i.execute_value_binop(keyword, ValueSet::sub))
            }
            Keyword::MulAssign => {
                self.execute_compound(keyword, |i| i.execute_value_binop(keyword, ValueSet::mul))
            }
            Keyword::DivAssign => {
                self.execute_compound(keyword, |i| i.execute_value_binop(keyword, ValueSet::div))
            }
            Keyword::ModAssign => {
                self.execute_compound(keyword, |i| i.execute_value_binop(keyword, ValueSet::rem))
            }
            Keyword::ShiftLeftAssign => {
                self.execute_compound(keyword, |i| i.execute_value_binop(keyword, ValueSet::shl))
            }
            Keyword::ShiftRightAssign => {
                self.execute_compound(keyword, |i| i.execute_value_binop(keyword, ValueSet::shr))
            }
            Keyword::RotateLeftAssign => {
                self.execute_compound(keyword, |i| i.execute_value_binop(keyword, ValueSet::rol))
            }
            Keyword::RotateRightAssign => {
                self.execute_compound(keyword, |i| i.execute_value_binop(keyword, ValueSet::ror))
            }
            Keyword::AndAssign => self.execute_compound(keyword, |i| {
                i.execute_connective(keyword, Bool3::and, ValueSet::and)
            }),
            Keyword::OrAssign => self.execute_compound(keyword, |i| {
                i.execute_connective(keyword, Bool3::or, ValueSet::or)
            }),
            Keyword::XorAssign => self.execute_compound(keyword, |i| {
                i.execute_connective(keyword, Bool3::xor, ValueSet::xor)
            }),
            Keyword::IncAssign => self.execute_compound(keyword, |i| i.execute_inc(keyword)),
            Keyword::DecAssign => self.execute_compound(keyword, |i| i.execute_dec(keyword)),
            Keyword::NegAssign => self.execute_compound(keyword, |i| {
                let value = i.pop_boolean(keyword)?;
                i.stack.push(StackEntry::Boolean(value.not()));
                Ok(())
            }),
            Keyword::Poke
            | Keyword::PokeAuto
            | Keyword::Poke1
            | Keyword::Poke2
            | Keyword::Poke4
            | Keyword::Poke8 => {
                warn!("memory writes are not modeled; discarding store");
                self.warnings.push(Warning::UnmodeledMemoryWrite);
                self.pop(keyword)?;
                self.pop(keyword)?;
                Ok(())
            }
            Keyword::Peek
            | Keyword::PeekAuto
            | Keyword::Peek1
            | Keyword::Peek2
            | Keyword::Peek4
            | Keyword::Peek8 => {
                warn!("memory reads are not modeled; result is unconstrained");
                self.warnings.push(Warning::UnmodeledMemoryRead);
                self.pop(keyword)?;
                let width = peek_width(keyword, self.width);
                self.stack.push(StackEntry::Value(ValueSet::new_top(width)));
                Ok(())
            }
            Keyword::StartConditional => self.execute_conditional(stream),
            Keyword::EndConditional => Ok(()),
        }
    }

    /// Pop two value sets and push the operation applied to them. The
    /// first pop is the left-hand side: `a,b,-` computes `b - a`.
    fn execute_value_binop(
        &mut self,
        keyword: Keyword,
        op: fn(&ValueSet, &ValueSet) -> ValueSet,
    ) -> Result<()> {
        let lhs = self.pop_value_set(keyword)?;
        let rhs = self.pop_value_set(keyword)?;
        self.stack.push(StackEntry::Value(op(&lhs, &rhs)));
        Ok(())
    }

    /// `&`, `|` and `^` dispatch on operand kind: if either operand is
    /// boolean-typed the logical connective applies, otherwise the
    /// bitwise operation on value sets.
    fn execute_connective(
        &mut self,
        keyword: Keyword,
        bool_op: fn(Bool3, Bool3) -> Bool3,
        value_op: fn(&ValueSet, &ValueSet) -> ValueSet,
    ) -> Result<()> {
        let lhs = self.pop(keyword)?;
        let rhs = self.pop(keyword)?;
        if lhs.is_boolean_kind() || rhs.is_boolean_kind() {
            let lhs = self.boolean_of(lhs)?;
            let rhs = self.boolean_of(rhs)?;
            self.stack.push(StackEntry::Boolean(bool_op(lhs, rhs)));
        } else {
            let lhs = self.value_set_of(lhs)?;
            let rhs = self.value_set_of(rhs)?;
            self.stack.push(StackEntry::Value(value_op(&lhs, &rhs)));
        }
        Ok(())
    }

    fn execute_inc(&mut self, keyword: Keyword) -> Result<()> {
        let one = ValueSet::new_global(StridedInterval::singleton(1, self.width));
        let value = self.pop_value_set(keyword)?;
        self.stack.push(StackEntry::Value(value.add(&one)));
        Ok(())
    }

    fn execute_dec(&mut self, keyword: Keyword) -> Result<()> {
        let one = ValueSet::new_global(StridedInterval::singleton(1, self.width));
        let value = self.pop_value_set(keyword)?;
        self.stack.push(StackEntry::Value(value.sub(&one)));
        Ok(())
    }

    /// Run a base operation while preserving the identifier beneath its
    /// operands, then assign: `a,b,+=` is `b := b + a`.
    fn execute_compound<F>(&mut self, keyword: Keyword, base: F) -> Result<()>
    where
        F: FnOnce(&mut Interpretation<'a, 'r, 't>) -> Result<()>,
    {
        let element = self
            .stack
            .last()
            .cloned()
            .ok_or_else(|| Error::StackUnderflow(keyword.to_string()))?;
        base(self)?;
        self.stack.push(element);
        self.execute_assignment()
    }

    fn execute_assignment(&mut self) -> Result<()> {
        let identifier = self.pop_identifier(Keyword::Assignment)?;
        match identifier.kind {
            IdentifierKind::Register => {
                let value = self.pop_value_set(Keyword::Assignment)?;
                self.env.set_register(identifier.name, value);
            }
            IdentifierKind::Flag => {
                let value = self.pop_boolean(Keyword::Assignment)?;
                self.env.set_flag(identifier.name, value);
            }
        }
        Ok(())
    }

    /// `?{`: a certainly-false condition skips the conditional body, a
    /// certainly-true one falls through into it, and an undetermined one
    /// interprets both continuations against the current environment and
    /// joins the results.
    fn execute_conditional(&mut self, stream: &mut TokenStream<'t>) -> Result<()> {
        match self.pop_boolean(Keyword::StartConditional)? {
            Bool3::True => Ok(()),
            Bool3::False => {
                stream.skip_conditional_body();
                Ok(())
            }
            Bool3::Maybe => {
                let remaining: Vec<&'t str> = stream.remaining().to_vec();
                stream.exhaust();
                let (taken, taken_warnings) =
                    self.transformer
                        .interpret(&remaining, &self.env, self.depth + 1)?;
                let (not_taken, else_warnings) =
                    match TokenStream::matching_terminator(&remaining) {
                        Some(index) if index + 1 < remaining.len() => self
                            .transformer
                            .interpret(&remaining[index + 1..], &self.env, self.depth + 1)?,
                        _ => (self.env.clone(), Vec::new()),
                    };
                self.env = taken.join(&not_taken);
                self.warnings.extend(taken_warnings);
                self.warnings.extend(else_warnings);
                Ok(())
            }
        }
    }

    fn pop(&mut self, keyword: Keyword) -> Result<StackEntry<'t>> {
        self.stack
            .pop()
            .ok_or_else(|| Error::StackUnderflow(keyword.to_string()))
    }

    fn pop_value_set(&mut self, keyword: Keyword) -> Result<ValueSet> {
        let entry = self.pop(keyword)?;
        self.value_set_of(entry)
    }

    fn pop_boolean(&mut self, keyword: Keyword) -> Result<Bool3> {
        let entry = self.pop(keyword)?;
        self.boolean_of(entry)
    }

    fn pop_identifier(&mut self, keyword: Keyword) -> Result<Identifier<'t>> {
        match self.pop(keyword)? {
            StackEntry::Identifier(identifier) => Ok(identifier),
            entry => Err(Error::RegisterOrFlagExpected(entry.to_string())),
        }
    }

    /// Resolve an operand to a value set, dereferencing identifiers
    /// against the current output environment.
    fn value_set_of(&self, entry: StackEntry<'t>) -> Result<ValueSet> {
        match entry {
            StackEntry::Value(value) => Ok(value),
            StackEntry::Boolean(value) => Ok(self.value_set_of_boolean(value)),
            StackEntry::Identifier(identifier) => match identifier.kind {
                IdentifierKind::Register => Ok(self.register_value(identifier.name)),
                IdentifierKind::Flag => {
                    Ok(self.value_set_of_boolean(self.flag_value(identifier.name)))
                }
            },
        }
    }

    /// Resolve an operand to a boolean, dereferencing identifiers
    /// against the current output environment.
    fn boolean_of(&self, entry: StackEntry<'t>) -> Result<Bool3> {
        match entry {
            StackEntry::Boolean(value) => Ok(value),
            StackEntry::Value(ref value) => self.boolean_of_value_set(value),
            StackEntry::Identifier(identifier) => match identifier.kind {
                IdentifierKind::Flag => Ok(self.flag_value(identifier.name)),
                IdentifierKind::Register => {
                    self.boolean_of_value_set(&self.register_value(identifier.name))
                }
            },
        }
    }

    /// A register known to the platform but missing from the environment
    /// is simply unconstrained.
    fn register_value(&self, name: &str) -> ValueSet {
        self.env
            .register(name)
            .cloned()
            .unwrap_or_else(|| ValueSet::new_top(self.width))
    }

    fn flag_value(&self, name: &str) -> Bool3 {
        self.env.flag(name).unwrap_or(Bool3::Maybe)
    }

    fn value_set_of_boolean(&self, value: Bool3) -> ValueSet {
        ValueSet::new_global(match value {
            Bool3::True => StridedInterval::singleton(1, self.width),
            Bool3::False => StridedInterval::singleton(0, self.width),
            Bool3::Maybe => StridedInterval::interval(0, 1, self.width),
        })
    }

    fn boolean_of_value_set(&self, value: &ValueSet) -> Result<Bool3> {
        let interval = value.global();
        if interval.is_bottom() {
            return Err(Error::BooleanExpected(value.to_string()));
        }
        if interval.is_zero() {
            Ok(Bool3::False)
        } else if !interval.contains(0) {
            Ok(Bool3::True)
        } else {
            Ok(Bool3::Maybe)
        }
    }
}

fn peek_width(keyword: Keyword, word: DataWidth) -> DataWidth {
    match keyword {
        Keyword::Peek1 => DataWidth::R8,
        Keyword::Peek2 => DataWidth::R16,
        Keyword::Peek4 => DataWidth::R32,
        Keyword::Peek8 => DataWidth::R64,
        _ => word,
    }
}

#[cfg(test)]
mod tests {
    use super::{Transformer, Warning};
    use crate::architecture::RegisterFile;
    use crate::domain::{
        AbstractEnvironment, Bool3, Region, RegionId, StridedInterval, ValueSet,
    };
    use crate::error::Error;
    use crate::types::DataWidth;

    const W: DataWidth = DataWidth::R64;

    fn register_file() -> RegisterFile {
        RegisterFile::new(W)
            .with_registers(vec!["rax", "rbx", "eax", "ebx"])
            .with_flags(vec!["zf", "cf"])
    }

    fn global(value: u64) -> ValueSet {
        ValueSet::new_global(StridedInterval::singleton(value, W))
    }

    fn transform(esil: &str, env: &AbstractEnvironment) -> super::Transformation {
        let registers = register_file();
        let transformer = Transformer::new(&registers);
        transformer.transform(esil, env).unwrap()
    }

    fn transform_err(esil: &str, env: &AbstractEnvironment) -> Error {
        let registers = register_file();
        let transformer = Transformer::new(&registers);
        transformer.transform(esil, env).unwrap_err()
    }

    #[test]
    fn assign_constant() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", ValueSet::new_top(W));
        let result = transform("3,eax,=", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(3)));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn empty_instruction_is_a_no_op() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        let result = transform("", &env);
        assert_eq!(result.environment, env);
    }

    #[test]
    fn add_assign() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        let result = transform("1,eax,+=", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(6)));
    }

    #[test]
    fn sub_operand_order() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        // a,b,- computes b - a
        let result = transform("4,eax,-,eax,=", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(1)));
    }

    #[test]
    fn inc_and_dec() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        let result = transform("eax,++,eax,=", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(6)));
        let result = transform("eax,--,eax,=", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(4)));
        let result = transform("eax,--=", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(4)));
    }

    #[test]
    fn assignment_observes_earlier_assignment() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(1));
        env.set_register("ebx", global(0));
        let result = transform("7,eax,=,eax,ebx,=", &env);
        assert_eq!(result.environment.register("ebx"), Some(&global(7)));
    }

    #[test]
    fn flag_assignment_coerces() {
        let env = AbstractEnvironment::new();
        let result = transform("1,zf,=", &env);
        assert_eq!(result.environment.flag("zf"), Some(Bool3::True));
        let result = transform("0,zf,=", &env);
        assert_eq!(result.environment.flag("zf"), Some(Bool3::False));
    }

    #[test]
    fn register_assignment_from_flag() {
        let mut env = AbstractEnvironment::new();
        env.set_flag("zf", Bool3::True);
        let result = transform("zf,eax,=", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(1)));

        let mut env = AbstractEnvironment::new();
        env.set_flag("zf", Bool3::Maybe);
        let result = transform("zf,eax,=", &env);
        assert_eq!(
            result.environment.register("eax").unwrap().global(),
            StridedInterval::interval(0, 1, W)
        );
    }

    #[test]
    fn negate_flag() {
        let mut env = AbstractEnvironment::new();
        env.set_flag("zf", Bool3::False);
        let result = transform("zf,!,zf,=", &env);
        assert_eq!(result.environment.flag("zf"), Some(Bool3::True));
        let result = transform("zf,!=", &env);
        assert_eq!(result.environment.flag("zf"), Some(Bool3::True));
    }

    #[test]
    fn bitwise_and_logical_connectives() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(0xc));
        env.set_register("ebx", global(0xa));
        let result = transform("eax,ebx,&,eax,=", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(8)));

        let mut env = AbstractEnvironment::new();
        env.set_flag("zf", Bool3::True);
        env.set_flag("cf", Bool3::Maybe);
        let result = transform("zf,cf,|,cf,=", &env);
        assert_eq!(result.environment.flag("cf"), Some(Bool3::True));
        let result = transform("zf,cf,&,cf,=", &env);
        assert_eq!(result.environment.flag("cf"), Some(Bool3::Maybe));
    }

    #[test]
    fn conditional_maybe_joins_both_paths() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        env.set_flag("zf", Bool3::Maybe);
        let result = transform("zf,?{,1,eax,=,}", &env);
        let joined = result.environment.register("eax").unwrap().global();
        assert_eq!(joined, StridedInterval::strided(1, 4, 2, W));
        assert!(joined.contains(1));
        assert!(joined.contains(5));
    }

    #[test]
    fn conditional_true_executes_body() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        env.set_flag("zf", Bool3::True);
        let result = transform("zf,?{,1,eax,=,}", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(1)));
    }

    #[test]
    fn conditional_false_skips_body() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        env.set_flag("zf", Bool3::False);
        let result = transform("zf,?{,1,eax,=,}", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(5)));
    }

    #[test]
    fn conditional_false_skips_nested_bodies() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(9));
        env.set_register("ebx", global(9));
        let result = transform("0,?{,1,?{,2,eax,=,},3,ebx,=,},5,eax,=", &env);
        assert_eq!(result.environment.register("eax"), Some(&global(5)));
        assert_eq!(result.environment.register("ebx"), Some(&global(9)));
    }

    #[test]
    fn conditional_maybe_with_continuation() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        env.set_register("ebx", global(0));
        env.set_flag("zf", Bool3::Maybe);
        let result = transform("zf,?{,1,eax,=,},2,ebx,=", &env);
        // The continuation runs on both paths.
        assert_eq!(result.environment.register("ebx"), Some(&global(2)));
        let eax = result.environment.register("eax").unwrap().global();
        assert!(eax.contains(1));
        assert!(eax.contains(5));
    }

    #[test]
    fn conditional_nesting_depth_is_bounded() {
        let env = AbstractEnvironment::new();
        let esil = "zf,?{,".repeat(70);
        let esil = esil.trim_end_matches(',');
        assert!(matches!(
            transform_err(esil, &env),
            Error::ConditionalDepth(_)
        ));
    }

    #[test]
    fn compare_discards_and_warns() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        let result = transform("1,eax,==", &env);
        assert_eq!(result.environment, env);
        assert_eq!(result.warnings, vec![Warning::UnmodeledCompare]);
    }

    #[test]
    fn ordering_pushes_maybe_and_warns() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        let result = transform("1,eax,<,zf,=", &env);
        assert_eq!(result.environment.flag("zf"), Some(Bool3::Maybe));
        assert_eq!(result.warnings, vec![Warning::UnmodeledOrdering]);
    }

    #[test]
    fn peek_is_unconstrained() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(0x1000));
        let result = transform("eax,[],eax,=", &env);
        assert_eq!(
            result.environment.register("eax"),
            Some(&ValueSet::new_top(W))
        );
        assert_eq!(result.warnings, vec![Warning::UnmodeledMemoryRead]);
    }

    #[test]
    fn sized_peek_is_unconstrained_at_its_width() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(0x1000));
        let result = transform("eax,[1],eax,=", &env);
        assert_eq!(
            result.environment.register("eax"),
            Some(&ValueSet::new_top(DataWidth::R8))
        );
    }

    #[test]
    fn poke_discards_and_warns() {
        let mut env = AbstractEnvironment::new();
        env.set_register("eax", global(5));
        let result = transform("eax,0x1000,=[]", &env);
        assert_eq!(result.environment, env);
        assert_eq!(result.warnings, vec![Warning::UnmodeledMemoryWrite]);
    }

    #[test]
    fn unknown_token_fails() {
        let env = AbstractEnvironment::new();
        assert_eq!(
            transform_err("foo", &env),
            Error::UnknownToken("foo".to_string())
        );
    }

    #[test]
    fn stack_underflow_fails() {
        let env = AbstractEnvironment::new();
        assert!(matches!(
            transform_err("+", &env),
            Error::StackUnderflow(_)
        ));
    }

    #[test]
    fn assignment_to_non_identifier_fails() {
        let env = AbstractEnvironment::new();
        assert!(matches!(
            transform_err("1,2,=", &env),
            Error::RegisterOrFlagExpected(_)
        ));
    }

    #[test]
    fn region_only_value_is_not_a_boolean() {
        let mut env = AbstractEnvironment::new();
        env.set_register(
            "rax",
            ValueSet::new_region(
                Region::Object(RegionId::new(1)),
                StridedInterval::singleton(0x1000, W),
            ),
        );
        assert!(matches!(
            transform_err("rax,?{,}", &env),
            Error::BooleanExpected(_)
        ));
    }

    #[test]
    fn pointer_arithmetic_keeps_region() {
        let pointer = ValueSet::new_region(
            Region::Object(RegionId::new(7)),
            StridedInterval::singleton(0x1000, W),
        );
        let mut env = AbstractEnvironment::new();
        env.set_register("rax", pointer);
        let result = transform("8,rax,+=", &env);
        assert_eq!(
            result.environment.register("rax"),
            Some(&ValueSet::new_region(
                Region::Object(RegionId::new(7)),
                StridedInterval::singleton(0x1008, W)
            ))
        );
    }
}
