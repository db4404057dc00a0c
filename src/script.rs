//! Recursive descent compiler for textual chains.
//!
//! A script spells a chain the way it reads in prose, for example
//! `RE.globally.matching.oneOrMore.digit.then("-")`. Compilation produces a
//! [`Script`]; evaluating it drives the staged builders and yields a
//! [`Pattern`].
//!
//! Operation names may be written in camelCase or snake_case. A call group
//! that an operation does not take itself is applied to the step's result:
//! literal text at a fragment position, members inside a set.

use std::iter::Peekable;
use std::str::Chars;

use anyhow::{Context, Result, bail};
use itertools::Itertools;
use phf::{Map, phf_map};
use tracing::{debug, trace};

use crate::chain::stage::{Fragments, Lazy, Negated, Open, Quantifiable, Quantified, Set, Stage};
use crate::chain::{Builder, SetPattern, Start, re};
use crate::error::BuildError;
use crate::pattern::Pattern;
use crate::pattern::fragment::Fragment;
use crate::pattern::lexical::{CodeInput, IN_PATTERN, IN_SET, NamedClass, QUANTIFIABLE};

/// Compile a chain script.
pub fn compile(input: &str) -> Result<Script> {
    let mut compiler = Compiler {
        chars: input.chars().peekable(),
    };
    let script = compiler.compile_chain()?;
    compiler.skip_whitespace_and_comments();
    if let Some(ch) = compiler.chars.peek() {
        bail!("Syntax error: unexpected '{ch}' after chain.");
    }
    Ok(script)
}

/// Compile and evaluate a chain script in one go.
pub fn evaluate(input: &str) -> Result<Pattern> {
    compile(input)?.evaluate()
}

/// A compiled chain: the steps that follow the leading `RE`.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    /// `.name` with the call group the operation takes, if any.
    Op { name: String, op: Op, args: Vec<Arg> },
    /// A call group forwarded to the previous step's result.
    Call(Vec<Arg>),
}

#[derive(Debug, Clone, PartialEq)]
enum Arg {
    Text(String),
    Number(i64),
    Infinity,
    Null,
    /// Body of a `/…/` literal.
    Raw(String),
    Chain(Script),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Globally,
    AnyCase,
    FullText,
    WithUnicode,
    Stickily,
    WithFlags,
    Matching,
    Then,
    Or,
    Not,
    Lazily,
    Between,
    Exactly,
    AtLeast,
    AtMost,
    AnyAmountOf,
    NoneOrOne,
    OneOrMore,
    Class(NamedClass),
    Ascii,
    CodePoint,
    Control,
    Group,
    Capture,
    Reference,
    OneOf,
    And,
    Range,
    FollowedBy,
}

impl Op {
    fn is_flag(self) -> bool {
        matches!(
            self,
            Op::Globally | Op::AnyCase | Op::FullText | Op::WithUnicode | Op::Stickily | Op::WithFlags
        )
    }
}

#[derive(Clone, Copy)]
struct OpInfo {
    op: Op,
    /// The operation consumes the call group that follows it.
    takes_args: bool,
}

/// Operations other than the named classes, keyed by camelCase name.
/// Please keep names sorted alphabetically.
static NAME_TO_OP_MAP: Map<&'static str, OpInfo> = phf_map! {
    "and" => OpInfo { op: Op::And, takes_args: false },
    "anyAmountOf" => OpInfo { op: Op::AnyAmountOf, takes_args: false },
    "anyCase" => OpInfo { op: Op::AnyCase, takes_args: false },
    "ascii" => OpInfo { op: Op::Ascii, takes_args: true },
    "atLeast" => OpInfo { op: Op::AtLeast, takes_args: true },
    "atMost" => OpInfo { op: Op::AtMost, takes_args: true },
    "between" => OpInfo { op: Op::Between, takes_args: true },
    "capture" => OpInfo { op: Op::Capture, takes_args: true },
    "codePoint" => OpInfo { op: Op::CodePoint, takes_args: true },
    "control" => OpInfo { op: Op::Control, takes_args: true },
    "exactly" => OpInfo { op: Op::Exactly, takes_args: true },
    "followedBy" => OpInfo { op: Op::FollowedBy, takes_args: true },
    "fullText" => OpInfo { op: Op::FullText, takes_args: false },
    "globally" => OpInfo { op: Op::Globally, takes_args: false },
    "group" => OpInfo { op: Op::Group, takes_args: true },
    "lazily" => OpInfo { op: Op::Lazily, takes_args: false },
    "matching" => OpInfo { op: Op::Matching, takes_args: false },
    "noneOrOne" => OpInfo { op: Op::NoneOrOne, takes_args: false },
    "not" => OpInfo { op: Op::Not, takes_args: false },
    "oneOf" => OpInfo { op: Op::OneOf, takes_args: false },
    "oneOrMore" => OpInfo { op: Op::OneOrMore, takes_args: false },
    "or" => OpInfo { op: Op::Or, takes_args: false },
    "range" => OpInfo { op: Op::Range, takes_args: true },
    "reference" => OpInfo { op: Op::Reference, takes_args: true },
    "stickily" => OpInfo { op: Op::Stickily, takes_args: false },
    "then" => OpInfo { op: Op::Then, takes_args: false },
    "unicode" => OpInfo { op: Op::CodePoint, takes_args: true },
    "withFlags" => OpInfo { op: Op::WithFlags, takes_args: true },
    "withUnicode" => OpInfo { op: Op::WithUnicode, takes_args: false },
};

/// Resolve an operation name, accepting snake_case spellings.
fn name_to_info(name: &str) -> Option<OpInfo> {
    let camel = to_camel_case(name);
    if let Some(info) = NAME_TO_OP_MAP.get(camel.as_str()) {
        return Some(*info);
    }
    NamedClass::from_name(&camel).map(|class| OpInfo {
        op: Op::Class(class),
        takes_args: false,
    })
}

fn to_camel_case(name: &str) -> String {
    name.split('_')
        .enumerate()
        .map(|(idx, part)| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) if idx > 0 => first.to_ascii_uppercase().to_string() + chars.as_str(),
                _ => part.to_string(),
            }
        })
        .collect()
}

struct Compiler<'a> {
    chars: Peekable<Chars<'a>>,
}

impl Compiler<'_> {
    /// Parse `RE` followed by any number of steps.
    fn compile_chain(&mut self) -> Result<Script> {
        self.skip_whitespace_and_comments();
        let root = self.parse_identifier();
        if root != "RE" {
            bail!("Syntax error: a chain must start with 'RE'.");
        }
        self.compile_steps()
    }

    /// Parse an operation name and, when it takes one, its call group.
    fn compile_op(&mut self) -> Result<Step> {
        self.skip_whitespace_and_comments();
        let name = self.parse_identifier();
        if name.is_empty() {
            bail!("Syntax error: expected operation name after '.'.");
        }
        let Some(info) = name_to_info(&name) else {
            bail!("Syntax error: unknown operation '{name}'.");
        };
        let args = if info.takes_args {
            self.skip_whitespace_and_comments();
            if self.chars.peek() != Some(&'(') {
                bail!("Syntax error: '{name}' expects arguments.");
            }
            self.parse_call()?
        } else {
            Vec::new()
        };
        Ok(Step::Op {
            name,
            op: info.op,
            args,
        })
    }

    /// Parse `( arg, … )`.
    fn parse_call(&mut self) -> Result<Vec<Arg>> {
        // Consume '('
        self.chars.next();
        let mut args = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            if self.chars.peek() == Some(&')') {
                self.chars.next();
                return Ok(args);
            }
            if !args.is_empty() {
                match self.chars.next() {
                    Some(',') => self.skip_whitespace_and_comments(),
                    Some(ch) => bail!("Syntax error: expected ',' or ')' but found '{ch}'."),
                    None => bail!("Syntax error: unclosed argument list."),
                }
            }
            args.push(self.parse_arg()?);
        }
    }

    fn parse_arg(&mut self) -> Result<Arg> {
        match self.chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                self.parse_string(quote).map(Arg::Text)
            }
            Some('/') => {
                self.chars.next();
                self.parse_regex_literal().map(Arg::Raw)
            }
            Some(ch) if ch == '-' || ch.is_ascii_digit() => self.parse_number().map(Arg::Number),
            Some(ch) if ch.is_ascii_alphabetic() => {
                let ident = self.parse_identifier();
                match ident.as_str() {
                    "Infinity" => Ok(Arg::Infinity),
                    "null" | "undefined" => Ok(Arg::Null),
                    "RE" => self.compile_steps().map(Arg::Chain),
                    _ => bail!("Syntax error: unexpected '{ident}' in argument list."),
                }
            }
            Some(ch) => bail!("Syntax error: unexpected '{ch}' in argument list."),
            None => bail!("Syntax error: unclosed argument list."),
        }
    }

    /// Steps following an already consumed `RE`.
    fn compile_steps(&mut self) -> Result<Script> {
        let mut steps = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.chars.peek() {
                Some('.') => {
                    self.chars.next();
                    steps.push(self.compile_op()?);
                }
                Some('(') => steps.push(Step::Call(self.parse_call()?)),
                _ => break,
            }
        }
        Ok(Script { steps })
    }

    /// Parse a quoted string; the opening quote is already consumed.
    fn parse_string(&mut self, quote: char) -> Result<String> {
        let mut content = String::new();
        loop {
            match self.chars.next() {
                Some(c) if c == quote => return Ok(content),
                Some('\\') => content.push(self.parse_string_escape()?),
                Some(c) => content.push(c),
                None => bail!("Syntax error: unclosed string."),
            }
        }
    }

    fn parse_string_escape(&mut self) -> Result<char> {
        let Some(ch) = self.chars.next() else {
            bail!("Syntax error: unclosed string.");
        };
        Ok(match ch {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            'v' => '\u{b}',
            'f' => '\u{c}',
            'b' => '\u{8}',
            '0' => '\0',
            'x' => self.parse_hex_char(2)?,
            'u' if self.chars.peek() == Some(&'{') => {
                self.chars.next();
                let digits: String = self.chars.peeking_take_while(|&c| c != '}').collect();
                if self.chars.next() != Some('}') {
                    bail!("Syntax error: unclosed unicode escape.");
                }
                let code = u32::from_str_radix(&digits, 16)
                    .with_context(|| format!("Invalid unicode escape '{digits}'"))?;
                char::from_u32(code).with_context(|| format!("Invalid code point {code:#x}"))?
            }
            'u' => self.parse_hex_char(4)?,
            other => other,
        })
    }

    fn parse_hex_char(&mut self, len: usize) -> Result<char> {
        let digits: String = self.chars.by_ref().take(len).collect();
        if digits.len() != len || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            bail!("Syntax error: invalid escape '{digits}'.");
        }
        let code = u32::from_str_radix(&digits, 16)?;
        char::from_u32(code).with_context(|| format!("Invalid code point {code:#x}"))
    }

    /// Parse a `/…/flags` literal; the opening slash is already consumed.
    /// Flags are accepted and dropped.
    fn parse_regex_literal(&mut self) -> Result<String> {
        let mut source = String::new();
        let mut in_set = false;
        loop {
            match self.chars.next() {
                Some('/') if !in_set => break,
                Some('\\') => {
                    source.push('\\');
                    match self.chars.next() {
                        Some(c) => source.push(c),
                        None => bail!("Syntax error: unclosed regex literal."),
                    }
                }
                Some(c) => {
                    match c {
                        '[' => in_set = true,
                        ']' => in_set = false,
                        _ => {}
                    }
                    source.push(c);
                }
                None => bail!("Syntax error: unclosed regex literal."),
            }
        }
        let _flags: String = self
            .chars
            .peeking_take_while(|c| c.is_ascii_alphabetic())
            .collect();
        Ok(source)
    }

    fn parse_number(&mut self) -> Result<i64> {
        let negative = self.chars.next_if_eq(&'-').is_some();
        let leading_zero = self.chars.next_if_eq(&'0').is_some();
        let hex = leading_zero && self.chars.next_if(|&c| c == 'x' || c == 'X').is_some();
        let digits: String = self
            .chars
            .peeking_take_while(|c| c.is_ascii_hexdigit())
            .collect();
        let magnitude = match (hex, digits.is_empty()) {
            (true, true) => bail!("Syntax error: invalid number '0x'."),
            (true, false) => i64::from_str_radix(&digits, 16)?,
            (false, true) if leading_zero => 0,
            (false, true) => bail!("Syntax error: invalid number, digits expected."),
            (false, false) => {
                if !digits.chars().all(|c| c.is_ascii_digit()) {
                    bail!("Syntax error: invalid number '{digits}'.");
                }
                digits.parse::<i64>()?
            }
        };
        Ok(if negative { -magnitude } else { magnitude })
    }

    fn parse_identifier(&mut self) -> String {
        self.chars
            .peeking_take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
            .collect()
    }

    /// Skip whitespace and `//`-to-end-of-line comments.
    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.chars.peek() {
                Some(&ch) if ch.is_whitespace() => {
                    self.chars.next();
                }
                Some(&'/') => {
                    let mut ahead = self.chars.clone();
                    ahead.next();
                    if ahead.peek() != Some(&'/') {
                        break;
                    }
                    for ch in self.chars.by_ref() {
                        if ch == '\n' {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
    }
}

/// Where evaluation currently stands: one variant per builder stage plus the
/// two finished forms.
#[derive(Debug)]
enum Value {
    Start(Start),
    Open(Builder<Open>),
    Quantified(Builder<Quantified>),
    Lazy(Builder<Lazy>),
    NotOpen(Builder<Negated<Open>>),
    NotQuantified(Builder<Negated<Quantified>>),
    Set(Builder<Set>),
    NotSet(Builder<Negated<Set>>),
    Pattern(Pattern),
    SetPattern(SetPattern),
}

impl Value {
    fn description(&self) -> &'static str {
        match self {
            Value::Start(_) => "at the start of a chain",
            Value::Open(_) => Open::DESCRIPTION,
            Value::Quantified(_) => Quantified::DESCRIPTION,
            Value::Lazy(_) => Lazy::DESCRIPTION,
            Value::NotOpen(_) => Negated::<Open>::DESCRIPTION,
            Value::NotQuantified(_) => Negated::<Quantified>::DESCRIPTION,
            Value::Set(_) => Set::DESCRIPTION,
            Value::NotSet(_) => Negated::<Set>::DESCRIPTION,
            Value::Pattern(_) => "after a complete fragment",
            Value::SetPattern(_) => "after a set member",
        }
    }

    fn usage(&self, op: &str) -> anyhow::Error {
        BuildError::Usage {
            op: op.to_string(),
            state: self.description(),
        }
        .into()
    }
}

impl Script {
    /// Run the steps against a fresh chain.
    pub fn evaluate(&self) -> Result<Pattern> {
        debug!(steps = self.steps.len(), "evaluating chain");
        let mut value = Value::Start(re());
        for step in &self.steps {
            value = match step {
                Step::Op { name, op, args } => apply(value, name, *op, args)?,
                Step::Call(args) => call(value, args)?,
            };
        }
        match value {
            Value::Pattern(pattern) => Ok(pattern),
            Value::SetPattern(set) => Ok(set.into_pattern()),
            other => bail!("Chain ends {} without a fragment.", other.description()),
        }
    }

    /// Operation names in order, for diagnostics.
    pub fn op_names(&self) -> String {
        self.steps
            .iter()
            .map(|step| match step {
                Step::Op { name, .. } => name.as_str(),
                Step::Call(_) => "()",
            })
            .join(".")
    }
}

fn apply(value: Value, name: &str, op: Op, args: &[Arg]) -> Result<Value> {
    trace!(op = name, state = value.description(), "applying step");
    Ok(match (op, value) {
        (Op::Globally, Value::Start(start)) => Value::Start(start.globally()),
        (Op::AnyCase, Value::Start(start)) => Value::Start(start.any_case()),
        (Op::FullText, Value::Start(start)) => Value::Start(start.full_text()),
        (Op::WithUnicode, Value::Start(start)) => Value::Start(start.with_unicode()),
        (Op::Stickily, Value::Start(start)) => Value::Start(start.stickily()),
        (Op::WithFlags, Value::Start(start)) => Value::Start(start.with_flags(&flags_arg(args)?)),
        (Op::Matching, Value::Start(start)) => Value::Open(start.matching()),
        // Everything else at the start acts on an open pattern.
        (op, Value::Start(start)) if !op.is_flag() => {
            return apply(Value::Open(start.matching()), name, op, args);
        }

        (Op::Then, Value::Pattern(pattern)) => Value::Open(pattern.then()),
        (Op::Then, Value::SetPattern(set)) => Value::Open(set.then()),
        (Op::Or, Value::Pattern(pattern)) => Value::Open(pattern.or()),
        (Op::Or, Value::SetPattern(set)) => Value::Open(set.or()),
        (Op::And, Value::SetPattern(set)) => Value::Set(set.and()),

        (Op::FollowedBy, Value::Pattern(pattern)) => {
            Value::Pattern(pattern.followed_by(fragments(args)?))
        }
        (Op::FollowedBy, Value::SetPattern(set)) => Value::Pattern(set.followed_by(fragments(args)?)),
        (Op::FollowedBy, Value::Open(builder)) => Value::Pattern(builder.followed_by(fragments(args)?)),
        (Op::FollowedBy, Value::NotOpen(builder)) => {
            Value::Pattern(builder.followed_by(fragments(args)?))
        }

        (Op::Not, Value::Open(builder)) => Value::NotOpen(builder.not()),
        (Op::Not, Value::Quantified(builder)) => Value::NotQuantified(builder.not()),
        (Op::Not, Value::Set(builder)) => Value::NotSet(builder.not()),
        (Op::Lazily, Value::Open(builder)) => Value::Lazy(builder.lazily()),

        (
            Op::Between
            | Op::Exactly
            | Op::AtLeast
            | Op::AtMost
            | Op::AnyAmountOf
            | Op::NoneOrOne
            | Op::OneOrMore,
            Value::Open(builder),
        ) => Value::Quantified(quantify(&builder, op, args)?),
        (
            Op::Between
            | Op::Exactly
            | Op::AtLeast
            | Op::AtMost
            | Op::AnyAmountOf
            | Op::NoneOrOne
            | Op::OneOrMore,
            Value::Lazy(builder),
        ) => Value::Quantified(quantify(&builder, op, args)?),

        (Op::Class(class), value) => class_step(value, name, class)?,

        (
            Op::Ascii | Op::CodePoint | Op::Control | Op::Group | Op::Capture | Op::Reference,
            Value::Open(builder),
        ) => Value::Pattern(fragment_op(&builder, op, args)?),
        (
            Op::Ascii | Op::CodePoint | Op::Control | Op::Group | Op::Capture | Op::Reference,
            Value::Quantified(builder),
        ) => Value::Pattern(fragment_op(&builder, op, args)?),
        (Op::Ascii, Value::Set(builder)) => Value::SetPattern(builder.ascii(code_arg(args)?)?),
        (Op::CodePoint, Value::Set(builder)) => {
            Value::SetPattern(builder.code_point(code_arg(args)?)?)
        }
        (Op::Control, Value::Set(builder)) => Value::SetPattern(builder.control(letter_arg(args)?)?),

        (Op::OneOf, Value::Open(builder)) => Value::Set(builder.one_of()),
        (Op::OneOf, Value::Quantified(builder)) => Value::Set(builder.one_of()),
        (Op::OneOf, Value::NotOpen(builder)) => Value::Set(builder.one_of()),
        (Op::OneOf, Value::NotQuantified(builder)) => Value::Set(builder.one_of()),
        (Op::Range, Value::Set(builder)) => {
            let (start, end) = match args {
                [start, end] => (fragment(start)?, fragment(end)?),
                _ => bail!("'{name}' expects two endpoints."),
            };
            Value::SetPattern(builder.range(start, end)?)
        }

        (_, other) => return Err(other.usage(name)),
    })
}

/// A call group applied to the current value.
fn call(value: Value, args: &[Arg]) -> Result<Value> {
    Ok(match value {
        Value::Start(start) => Value::Pattern(start.text(fragments(args)?)),
        Value::Open(builder) => Value::Pattern(builder.text(fragments(args)?)),
        Value::Quantified(builder) => Value::Pattern(builder.text(fragments(args)?)),
        Value::Set(builder) => Value::SetPattern(builder.chars(fragments(args)?)),
        other => return Err(other.usage("()")),
    })
}

/// Named class at the current position, checked against its capabilities.
fn class_step(value: Value, name: &str, class: NamedClass) -> Result<Value> {
    let def = class.def();
    let free = def.allows(IN_PATTERN);
    let repeatable = free && def.allows(QUANTIFIABLE);
    let in_set = def.allows(IN_SET);
    let negatable = def.is_negatable();
    trace!(class = class.name(), "named class");
    Ok(match value {
        Value::Open(builder) if free => Value::Pattern(builder.emit_class(class)),
        Value::Quantified(builder) if repeatable => Value::Pattern(builder.emit_class(class)),
        Value::NotOpen(builder) if free && negatable => Value::Pattern(builder.emit_class(class)),
        Value::NotQuantified(builder) if repeatable && negatable => {
            Value::Pattern(builder.emit_class(class))
        }
        Value::Set(builder) if in_set => Value::SetPattern(builder.splice_class(class)),
        Value::NotSet(builder) if in_set && negatable => {
            Value::SetPattern(builder.splice_class(class))
        }
        other => return Err(other.usage(name)),
    })
}

fn quantify<S: Quantifiable>(builder: &Builder<S>, op: Op, args: &[Arg]) -> Result<Builder<Quantified>> {
    let first = args.first().map(count_arg).transpose()?.flatten();
    Ok(match op {
        Op::Between => {
            let second = args.get(1).map(count_arg).transpose()?.flatten();
            builder.between_bounds(first, second)?
        }
        Op::Exactly => builder.between_bounds(first, first)?,
        Op::AtLeast => builder.between_bounds(first, None)?,
        Op::AtMost => builder.between_bounds(None, first)?,
        Op::AnyAmountOf => builder.any_amount_of(),
        Op::NoneOrOne => builder.none_or_one(),
        _ => builder.one_or_more(),
    })
}

fn fragment_op<S: Fragments>(builder: &Builder<S>, op: Op, args: &[Arg]) -> Result<Pattern> {
    Ok(match op {
        Op::Ascii => builder.ascii(code_arg(args)?)?,
        Op::CodePoint => builder.code_point(code_arg(args)?)?,
        Op::Control => builder.control(letter_arg(args)?)?,
        Op::Group => builder.group(fragments(args)?),
        Op::Capture => builder.capture(fragments(args)?),
        _ => builder.reference(reference_arg(args)?),
    })
}

fn fragment(arg: &Arg) -> Result<Fragment> {
    Ok(match arg {
        Arg::Text(text) => Fragment::Text(text.clone()),
        Arg::Number(n) => Fragment::Text(n.to_string()),
        Arg::Raw(source) => Fragment::raw(source.as_str()),
        Arg::Chain(script) => Fragment::from(script.evaluate()?),
        Arg::Infinity | Arg::Null => bail!("Expected text, a pattern or a chain."),
    })
}

fn fragments(args: &[Arg]) -> Result<Vec<Fragment>> {
    args.iter().map(fragment).collect()
}

/// A repetition count; `null` and `Infinity` leave the bound open.
fn count_arg(arg: &Arg) -> Result<Option<u32>> {
    match arg {
        Arg::Number(n) => match u32::try_from(*n) {
            Ok(count) => Ok(Some(count)),
            Err(_) => Err(BuildError::Bounds(format!("{n} is not a valid repetition count")).into()),
        },
        Arg::Infinity | Arg::Null => Ok(None),
        _ => Err(BuildError::Bounds("repetition count expected".into()).into()),
    }
}

fn code_arg(args: &[Arg]) -> Result<CodeInput> {
    match args.first() {
        Some(Arg::Number(n)) => Ok(CodeInput::Number(*n)),
        Some(Arg::Text(text)) => Ok(CodeInput::Text(text.clone())),
        _ => Err(BuildError::CharCode("number or string expected".into()).into()),
    }
}

fn letter_arg(args: &[Arg]) -> Result<char> {
    match args.first() {
        Some(Arg::Text(text)) => match text.chars().exactly_one() {
            Ok(letter) => Ok(letter),
            Err(_) => Err(BuildError::ControlCode(text.chars().next().unwrap_or(' ')).into()),
        },
        _ => Err(BuildError::ControlCode(' ').into()),
    }
}

fn reference_arg(args: &[Arg]) -> Result<u32> {
    match args.first() {
        Some(Arg::Number(n)) => u32::try_from(*n)
            .map_err(|_| BuildError::Bounds(format!("invalid back reference number {n}")).into()),
        _ => Err(BuildError::Bounds("back reference number expected".into()).into()),
    }
}

fn flags_arg(args: &[Arg]) -> Result<String> {
    match args.first() {
        Some(Arg::Text(codes)) => Ok(codes.clone()),
        _ => bail!("'withFlags' expects a string of flag letters."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source(input: &str) -> String {
        match evaluate(input) {
            Ok(pattern) => pattern.source().to_string(),
            Err(err) => panic!("evaluation of {input} failed: {err:#}"),
        }
    }

    fn eval_err(input: &str) -> String {
        match evaluate(input) {
            Ok(pattern) => panic!("expected failure for {input}, got {pattern}"),
            Err(err) => format!("{err:#}"),
        }
    }

    fn build_err(input: &str) -> BuildError {
        match evaluate(input) {
            Ok(pattern) => panic!("expected failure for {input}, got {pattern}"),
            Err(err) => match err.downcast::<BuildError>() {
                Ok(build) => build,
                Err(other) => panic!("expected a BuildError for {input}, got {other:#}"),
            },
        }
    }

    // --- Parsing ---

    #[test]
    fn test_steps_and_calls() {
        let script = compile("RE.matching.oneOrMore(\"a\").then.digit").unwrap();
        assert_eq!(script.op_names(), "matching.oneOrMore.().then.digit");
    }

    #[test]
    fn test_whitespace_and_comments() {
        let spaced = "RE.matching // open\n    .digit\n    .then ( 'x' )";
        assert_eq!(source(spaced), "\\dx");
    }

    #[test]
    fn test_snake_case_names() {
        assert_eq!(source("RE.matching.one_or_more.alpha_numeric"), "\\w+");
        assert_eq!(source("RE.any_case.matching.the_start"), "^");
    }

    #[test]
    fn test_argument_forms() {
        assert_eq!(source("RE.matching(\"a\", /b|c/, RE(\"d\"))"), "ab|cd");
        assert_eq!(source("RE.matching('it\\'s')"), "it's");
        assert_eq!(source("RE.matching.ascii(0xa0)"), "\\xa0");
        assert_eq!(source("RE.matching.codePoint(\"\\u2661\")"), "\\u2661");
        assert_eq!(source("RE.matching.between(2, Infinity)(\"a\")"), "a{2,}");
        assert_eq!(source("RE.matching.between(null, 3)(\"a\")"), "a{,3}");
        assert_eq!(source("RE.matching.between(0, 10)(\"a\")"), "a{0,10}");
        assert_eq!(source("RE.matching.group(/[/]/)"), "(?:[/])");
    }

    #[test]
    fn test_syntax_errors() {
        assert!(eval_err("matching.digit").contains("must start with 'RE'"));
        assert!(eval_err("RE.matching.bogus").contains("unknown operation 'bogus'"));
        assert!(eval_err("RE.matching(\"abc").contains("unclosed string"));
        assert!(eval_err("RE.matching(\"a\" \"b\")").contains("expected ',' or ')'"));
        assert!(eval_err("RE.matching.group").contains("expects arguments"));
        assert!(eval_err("RE.matching.digit;").contains("unexpected ';'"));
        assert!(eval_err("RE.matching.exactly(-)(\"a\")").contains("invalid number"));
        assert!(eval_err("RE.matching.exactly(-a)(\"a\")").contains("invalid number"));
        assert!(eval_err("RE.matching.ascii(0x)").contains("invalid number"));
    }

    // --- Evaluation ---

    #[test]
    fn test_start_acts_as_open() {
        assert_eq!(source("RE(\"abc\")"), "abc");
        assert_eq!(source("RE.digit"), "\\d");
        assert_eq!(source("RE.oneOf(\"01\").then.digit"), "[01]\\d");
        assert_eq!(source("RE.exactly(3)(RE.oneOf.digit.and.range(\"a\", \"f\"))"), "[\\da-f]{3}");
    }

    #[test]
    fn test_flags() {
        let pattern = evaluate("RE.globally.anyCase.matching(\"abc\")").unwrap();
        assert_eq!(pattern.to_string(), "/abc/gi");
        let pattern = evaluate("RE.withFlags(\"img\").matching(\"abc\")").unwrap();
        assert_eq!(pattern.flags().to_string(), "gim");
    }

    #[test]
    fn test_sets_and_negation() {
        assert_eq!(source("RE.matching.oneOf(\"abc\").and(\"de\")"), "[abcde]");
        assert_eq!(source("RE.matching.not.oneOf.not.digit"), "[^\\D]");
        assert_eq!(source("RE.matching.oneOf.backspace.and.newLine"), "[\\b\\n]");
        assert_eq!(source("RE.matching(\"0\").or.not.followedBy(\"b\").then.alphaNumeric"), "0|(?!b)\\w");
    }

    #[test]
    fn test_lazy_and_references() {
        assert_eq!(
            source("RE.matching.capture(RE.oneOf(\"'\\\"\")).then.lazily.anyAmountOf.anyChar.then.reference(1)"),
            "(['\"]).*?\\1"
        );
    }

    #[test]
    fn test_time_pattern() {
        let input = r#"
            RE.matching.theStart.then.group(
                RE.oneOf("01").then.digit
                    .or("2").then.oneOf.range("0", "3")
            ).then.exactly(2).group(
                RE(":").then.oneOf.range("0", "5").then.digit
            ).then.theEnd
        "#;
        assert_eq!(source(input), "^(?:[01]\\d|2[0-3])(?::[0-5]\\d){2}$");
    }

    #[test]
    fn test_usage_errors_name_the_state() {
        let err = build_err("RE.matching.oneOrMore.exactly(2)");
        assert_eq!(
            err,
            BuildError::Usage {
                op: "exactly".into(),
                state: "after a quantifier",
            }
        );
        assert!(build_err("RE.matching.backspace").is_usage_error());
        assert!(build_err("RE.matching.oneOrMore.theStart").is_usage_error());
        assert!(build_err("RE.matching.not.tab").is_usage_error());
        assert!(build_err("RE.matching.oneOf.anyChar").is_usage_error());
        assert!(build_err("RE.matching.digit.digit").is_usage_error());
        assert!(build_err("RE.matching.digit.and").is_usage_error());
        assert!(build_err("RE.matching.lazily(\"a\")").is_usage_error());
    }

    #[test]
    fn test_range_errors_surface() {
        assert!(build_err("RE.matching.ascii(256)").is_range_error());
        assert!(build_err("RE.matching.between(-1, 2)(\"a\")").is_range_error());
        assert!(build_err("RE.matching.between(null, null)(\"a\")").is_range_error());
        assert!(build_err("RE.matching.oneOf.range(\"ab\", \"z\")").is_range_error());
        assert!(build_err("RE.matching.control(\"1\")").is_range_error());
        assert!(build_err("RE.matching.reference(-2)").is_range_error());
    }

    #[test]
    fn test_incomplete_chain() {
        assert!(eval_err("RE.matching.oneOrMore").contains("after a quantifier without a fragment"));
        assert!(eval_err("RE.globally").contains("at the start of a chain"));
    }
}
