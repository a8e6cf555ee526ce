//! Tokenizer that turns dice expressions into typed tokens.
//!
//! Rules are tried in a fixed priority order at every position, and the first one that matches wins. Lookup forms
//! (tables, sections, tags, dataview queries) come before plain dice, since they may embed a dice expression of their
//! own (e.g. `1d4+1[[Note^block]]`).

use core::{fmt, ops::Range};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
	dice::condition::{ComparisonOp, Conditional},
	engine::Error,
	lookup::FieldLookup,
	narrative,
	parse::{DiceSpec, FaceSpec},
	reduce::reduce,
	settings::Settings,
};

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[expect(clippy::exhaustive_enums, reason = "Unlikely to change")]
pub enum MathOp {
	/// `+`
	Add,

	/// `-`
	Sub,

	/// `*`
	Mul,

	/// `/`
	Div,

	/// `^`
	Pow,
}

impl MathOp {
	/// Finds the operator for a symbol.
	#[must_use]
	pub const fn from_symbol(symbol: char) -> Option<Self> {
		Some(match symbol {
			'+' => Self::Add,
			'-' => Self::Sub,
			'*' => Self::Mul,
			'/' => Self::Div,
			'^' => Self::Pow,
			_ => return None,
		})
	}

	/// Symbol of the operator.
	#[must_use]
	pub const fn symbol(&self) -> char {
		match self {
			Self::Add => '+',
			Self::Sub => '-',
			Self::Mul => '*',
			Self::Div => '/',
			Self::Pow => '^',
		}
	}

	/// Binding strength of the operator; higher binds tighter.
	#[must_use]
	pub const fn precedence(&self) -> u8 {
		match self {
			Self::Add | Self::Sub => 1,
			Self::Mul | Self::Div => 2,
			Self::Pow => 3,
		}
	}

	/// Whether chains of the operator group from the right (`2^3^2` is `2^(3^2)`).
	#[must_use]
	pub const fn is_right_associative(&self) -> bool {
		matches!(self, Self::Pow)
	}

	/// Applies the operator.
	#[must_use]
	pub fn apply(&self, a: f64, b: f64) -> f64 {
		match self {
			Self::Add => a + b,
			Self::Sub => a - b,
			Self::Mul => a * b,
			Self::Div => a / b,
			Self::Pow => a.powf(b),
		}
	}
}

/// Type of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum TokenKind {
	/// Dice (`3d6`) or a plain number (`4`)
	Dice,

	/// Percentile composite dice (`1d66%`)
	Percent,

	/// Fudge dice (`4dF`)
	Fudge,

	/// Stunt dice (`1dS`)
	Stunt,

	/// Narrative dice pool (`2g1y3p`)
	Narrative,

	/// Arithmetic operator
	Math(MathOp),

	/// `(`
	LeftParen,

	/// `)`
	RightParen,

	/// `kh` or `k`
	KeepHigh,

	/// `kl`
	KeepLow,

	/// `dh`
	DropHigh,

	/// `dl`
	DropLow,

	/// `!`
	Explode,

	/// `!!`
	ExplodeCombine,

	/// `r`
	Reroll,

	/// `s`, `sa` or `sd`
	Sort,

	/// `u`
	Unique,

	/// Table lookup (`[[Note^block]]`)
	Table,

	/// Section lookup (`[[Note]]`)
	Section,

	/// Line lookup (`[[Note]]|line`)
	Line,

	/// Tag lookup (`#tag`)
	Tag,

	/// Dataview lookup (`dv(#tag)`)
	Dataview,

	/// A condition that had no token before it to attach to
	Condition,
}

impl TokenKind {
	/// Whether tokens of this kind become dice.
	#[must_use]
	pub const fn is_dice(&self) -> bool {
		matches!(self, Self::Dice | Self::Percent | Self::Fudge | Self::Stunt)
	}

	/// Whether tokens of this kind modify the dice before them.
	#[must_use]
	pub const fn is_modifier(&self) -> bool {
		matches!(
			self,
			Self::KeepHigh
				| Self::KeepLow
				| Self::DropHigh
				| Self::DropLow
				| Self::Explode
				| Self::ExplodeCombine
				| Self::Reroll
				| Self::Sort
				| Self::Unique
		)
	}

	/// Whether tokens of this kind are resolved by an external sub-roller.
	#[must_use]
	pub const fn is_lookup(&self) -> bool {
		matches!(self, Self::Table | Self::Section | Self::Line | Self::Tag | Self::Dataview)
	}
}

/// A lexical token of a dice expression.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Token {
	/// Type of the token
	pub kind: TokenKind,

	/// Normalized value (e.g. `1d100` for `d`, `100` for the `i` in `!i`, `3` for `kh3`)
	pub value: String,

	/// Source text the token came from
	pub text: String,

	/// Conditions that directly followed the token
	pub conditions: Vec<Conditional>,

	/// Whether the token is dice whose count comes from the parenthesised group before it
	pub parened: bool,

	/// Parsed dice literal, for dice tokens that aren't plain numbers
	pub dice: Option<DiceSpec>,
}

impl Token {
	/// Creates a new token.
	#[must_use]
	pub fn new(kind: TokenKind, value: impl Into<String>, text: impl Into<String>) -> Self {
		Self {
			kind,
			value: value.into(),
			text: text.into(),
			conditions: Vec::new(),
			parened: false,
			dice: None,
		}
	}

	/// Creates a new dice token from a parsed dice literal. The value is the literal's canonical form.
	#[must_use]
	pub fn dice(kind: TokenKind, spec: DiceSpec, text: impl Into<String>) -> Self {
		Self {
			value: spec.to_string(),
			dice: Some(spec),
			..Self::new(kind, "", text)
		}
	}

	/// Creates a new arithmetic operator token.
	#[must_use]
	pub fn math(op: MathOp) -> Self {
		Self::new(TokenKind::Math(op), op.symbol(), op.symbol())
	}

	/// Gets the arithmetic operator of the token, if it is one.
	#[must_use]
	pub const fn math_op(&self) -> Option<MathOp> {
		match self.kind {
			TokenKind::Math(op) => Some(op),
			_ => None,
		}
	}

	/// Whether the token is a `+` or `-` operator.
	fn is_sign(&self) -> bool {
		matches!(self.math_op(), Some(MathOp::Add | MathOp::Sub))
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.value)?;
		self.conditions
			.iter()
			.try_for_each(|condition| write!(f, "{}{}", condition.operator, condition.comparer))
	}
}

/// Error that can occur while tokenizing a dice expression.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LexError {
	/// No rule matched the input at an offset.
	#[error("unexpected input {found:?} at offset {offset}")]
	Unexpected {
		/// Byte offset of the unexpected input
		offset: usize,

		/// The unexpected input, up to the next whitespace
		found: String,
	},

	/// A dice literal was malformed (e.g. `1d0`).
	#[error("invalid dice {text:?} at offset {offset}: {details}")]
	InvalidDice {
		/// Byte offset of the dice literal
		offset: usize,

		/// Text of the dice literal
		text: String,

		/// Why the literal is invalid
		details: String,
	},

	/// A bare word wasn't resolved by the field lookup.
	#[error("unknown field {name:?} at offset {offset}")]
	UnknownField {
		/// Byte offset of the word
		offset: usize,

		/// The word
		name: String,
	},
}

impl LexError {
	/// Span of the input the error is about.
	#[must_use]
	pub fn span(&self) -> Range<usize> {
		match self {
			Self::Unexpected { offset, found } => *offset..offset + found.len().max(1),
			Self::InvalidDice { offset, text, .. } => *offset..offset + text.len(),
			Self::UnknownField { offset, name } => *offset..offset + name.len(),
		}
	}
}

/// Roll count and face count used for dice that omit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[expect(clippy::exhaustive_structs, reason = "Unlikely to change")]
pub struct Defaults {
	/// Roll count for dice like `d6`
	pub roll: u32,

	/// Face count for dice like `2d`
	pub face: u32,
}

impl Default for Defaults {
	fn default() -> Self {
		Self { roll: 1, face: 100 }
	}
}

/// How a matching rule turns its text into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
	/// Whitespace and braces, which are skipped
	Skip,

	/// Lookup form whose value is its full text
	Lookup(TokenKind),

	/// Comparison following a token
	Condition,

	/// Modifier whose value is the count after its symbol
	Modifier(TokenKind),

	/// Dice literal
	Dice(TokenKind),

	/// Plain number
	Number,

	/// Bare word resolved through the field lookup
	Field,

	/// Sort modifier
	Sort,

	/// Arithmetic operator or parenthesis
	Math,
}

/// Builds a regex from a pattern known to be valid.
#[expect(clippy::expect_used, reason = "Patterns are constant and covered by tests")]
fn regex(pattern: &str) -> Regex {
	Regex::new(pattern).expect("lexer pattern should be valid")
}

/// Tokenizing rules, in priority order.
static RULES: Lazy<Vec<(Rule, Regex)>> = Lazy::new(|| {
	let lookup_prefix = r"(?:\d+[Dd]?)?";
	let lookup_suffix = r"(?:\|[+\-])?(?:\|[^+\-\s][^\s]*)?";
	vec![
		(Rule::Skip, regex(r"[ \t\r\n]+|[{}]+")),
		(
			Rule::Lookup(TokenKind::Table),
			regex(r"[^\[\]]*?\[\[[^\[\]\^]+\^[^\[\]]+\]\](?:\|(?:xy|[+\-]|\d+|[^\s]+))?"),
		),
		(Rule::Lookup(TokenKind::Line), regex(r"\[\[[^\[\]]+\]\]\|line")),
		(
			Rule::Lookup(TokenKind::Section),
			regex(&format!(r"{lookup_prefix}\[\[[^\[\]\^]+\]\](?:\|[^\s+\-*/^()]+)?")),
		),
		(
			Rule::Lookup(TokenKind::Tag),
			regex(&format!(r"{lookup_prefix}#[\p{{L}}\p{{Emoji_Presentation}}\w/\-]+{lookup_suffix}")),
		),
		(
			Rule::Lookup(TokenKind::Dataview),
			regex(&format!(
				r"{lookup_prefix}dv\([\p{{L}}\p{{Emoji_Presentation}}\w/\-#]+\){lookup_suffix}"
			)),
		),
		(
			Rule::Condition,
			regex(
				r"(?:=!|<=|=<|>=|=>|-=|=-|=|<|>)\d+(?:[Dd](?:%|F|-?\d+|\[[^\]]*\])?(?:kh\d*|kl\d*|k\d*|dh\d*|dl\d*|!!?(?:i|\d+)?|r(?:i|\d+)?|u|s[ad]?)*)?",
			),
		),
		(Rule::Modifier(TokenKind::KeepLow), regex(r"kl\d*")),
		(Rule::Modifier(TokenKind::KeepHigh), regex(r"kh\d*|k\d*")),
		(Rule::Modifier(TokenKind::DropHigh), regex(r"dh\d*")),
		(Rule::Modifier(TokenKind::DropLow), regex(r"dl\d*")),
		(Rule::Modifier(TokenKind::ExplodeCombine), regex(r"!!(?:i|\d+)?")),
		(Rule::Modifier(TokenKind::Explode), regex(r"!(?:i|\d+)?")),
		(Rule::Modifier(TokenKind::Reroll), regex(r"r(?:i|\d+)?")),
		(Rule::Modifier(TokenKind::Unique), regex(r"u")),
		(Rule::Dice(TokenKind::Stunt), regex(r"1[Dd]S")),
		(Rule::Dice(TokenKind::Percent), regex(r"(?:\d+|\b)[Dd]\d+%")),
		(Rule::Dice(TokenKind::Fudge), regex(r"(?:\d+|\b)[Dd]F")),
		(Rule::Dice(TokenKind::Dice), regex(r"(?:\d+|\b)[Dd](?:%|-?\d+|\[[^\]]*\]|\b)")),
		(Rule::Number, regex(r"\d+(?:\.\d+)?")),
		(Rule::Field, regex(r"\b[A-Za-z][A-Za-z0-9_]+\b")),
		(Rule::Sort, regex(r"s[ad]?")),
		(Rule::Math, regex(r"[()^+\-*/]")),
	]
});

/// Whole-input narrative dice pools, such as `2g1y3p` or `2a 1p 1c`.
static NARRATIVE: Lazy<Regex> = Lazy::new(|| {
	regex(r"^(?:\d*(?:pro|boo|blk|sb|diff|[GgYyBbRrPpSsKkAaDdCc]))(?: ?\d*(?:pro|boo|blk|sb|diff|[GgYyBbRrPpSsKkAaDdCc]))+$")
});

/// Dice literals with faces, which rule out an input being a narrative pool (e.g. `3d8sd`).
static DICE_WITH_FACES: Lazy<Regex> = Lazy::new(|| regex(r"\d*[Dd](?:\d|%|F|S|\[)"));

/// Leading non-digits of a modifier, stripped to get its count.
static NON_DIGITS: Lazy<Regex> = Lazy::new(|| regex(r"^\D+"));

/// Operator and comparer of a condition.
static CONDITION_PARTS: Lazy<Regex> = Lazy::new(|| regex(r"^(=!|<=|=<|>=|=>|-=|=-|=|<|>)(.+)$"));

/// Normalizes a modifier count: a trailing `i` means [`UNBOUNDED`](crate::dice::modifier::UNBOUNDED), and any
/// leading symbols are stripped.
fn clamp_infinite(text: &str) -> String {
	if text.ends_with('i') {
		crate::dice::modifier::UNBOUNDED.to_string()
	} else {
		NON_DIGITS.replace(text, "").into_owned()
	}
}

/// Tokenizes dice expressions.
///
/// The lexer holds the defaults for omitted roll and face counts, plus an optional lookup for bare-word fields.
/// It keeps no state between calls, so a single lexer can tokenize any number of expressions, including
/// recursively for conditions.
#[derive(Clone, Default)]
pub struct Lexer {
	/// Defaults for omitted roll and face counts
	defaults: Defaults,

	/// Lookup for bare-word fields
	fields: Option<Arc<dyn FieldLookup>>,
}

impl Lexer {
	/// Creates a lexer with the given defaults.
	#[must_use]
	pub fn new(defaults: Defaults) -> Self {
		Self { defaults, fields: None }
	}

	/// Creates a lexer with the defaults from settings.
	#[must_use]
	pub fn from_settings(settings: &Settings) -> Self {
		Self::new(Defaults {
			roll: settings.default_roll,
			face: settings.default_face,
		})
	}

	/// Sets the lookup used for bare-word fields.
	#[must_use]
	pub fn with_fields(mut self, fields: Arc<dyn FieldLookup>) -> Self {
		self.fields = Some(fields);
		self
	}

	/// Current defaults.
	#[must_use]
	pub const fn defaults(&self) -> Defaults {
		self.defaults
	}

	/// Replaces the defaults.
	pub fn set_defaults(&mut self, defaults: Defaults) {
		self.defaults = defaults;
	}

	/// Sets the roll count used for dice like `d6`.
	pub fn set_default_roll(&mut self, roll: u32) {
		self.defaults.roll = roll;
	}

	/// Sets the face count used for dice like `2d`.
	pub fn set_default_face(&mut self, face: u32) {
		self.defaults.face = face;
	}

	/// Tokenizes and reduces an expression into the postfix token stream an
	/// [`Expression`](crate::expr::Expression) is built from.
	///
	/// # Errors
	/// If the input can't be tokenized or has mismatched parentheses, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use astragal::Lexer;
	///
	/// let tokens = Lexer::default().parse("1 + 2 * 3")?;
	/// let values = tokens.iter().map(|token| token.value.as_str()).collect::<Vec<_>>();
	/// assert_eq!(values, ["1", "2", "3", "*", "+"]);
	/// # Ok::<(), astragal::Error>(())
	/// ```
	pub fn parse(&self, input: &str) -> Result<Vec<Token>, Error> {
		let result = self
			.tokenize(input)
			.map_err(Error::from)
			.and_then(|tokens| reduce(tokens).map_err(Error::from));

		match result {
			Ok(tokens) => {
				log::debug!(
					"Parsed {input:?} into {}",
					tokens.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
				);
				Ok(tokens)
			}
			Err(err) => {
				log::warn!("Invalid formula {input:?}: {err}");
				Err(err)
			}
		}
	}

	/// Tokenizes an expression, in source order.
	///
	/// Runs of `+`/`-` are folded into a single operator, conditions are attached to the token before them, and
	/// signs in unary position are merged into the number or dice after them.
	///
	/// # Errors
	/// If part of the input doesn't match any rule, a dice literal is malformed, or a bare word isn't a known
	/// field, an error variant is returned.
	///
	/// # Examples
	/// ```
	/// use astragal::{Lexer, TokenKind};
	///
	/// let tokens = Lexer::default().tokenize("1d6kh3")?;
	/// assert_eq!(tokens.len(), 2);
	/// assert_eq!(tokens[0].value, "1d6");
	/// assert_eq!((tokens[1].kind, tokens[1].value.as_str()), (TokenKind::KeepHigh, "3"));
	/// # Ok::<(), astragal::lex::LexError>(())
	/// ```
	pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
		if let Some(token) = Self::narrative(input) {
			return Ok(vec![token]);
		}

		let mut raw: Vec<(Token, Range<usize>)> = Vec::new();
		let mut pos = 0;
		while pos < input.len() {
			let (rule, matched) = RULES
				.iter()
				.find_map(|(rule, regex)| {
					regex
						.find_at(input, pos)
						.filter(|found| found.start() == pos && !found.is_empty())
						.map(|found| (*rule, found))
				})
				.ok_or_else(|| LexError::Unexpected {
					offset: pos,
					found: input[pos..].split_whitespace().next().unwrap_or_default().to_owned(),
				})?;

			let span = matched.range();
			let text = matched.as_str();
			pos = span.end;

			let after_paren = raw.last().is_some_and(|(token, _)| token.kind == TokenKind::RightParen);
			if let Some(token) = self.lex_rule(rule, text, span.start, after_paren)? {
				raw.push((token, span));
			}
		}

		Ok(Self::fold_unary(input, Self::fold_signs(raw)))
	}

	/// Turns the text matched by a rule into a token.
	fn lex_rule(&self, rule: Rule, text: &str, offset: usize, after_paren: bool) -> Result<Option<Token>, LexError> {
		Ok(Some(match rule {
			Rule::Skip => return Ok(None),
			Rule::Lookup(kind) => Token::new(kind, text, text),
			Rule::Condition => {
				let mut token = Token::new(TokenKind::Condition, text, text);
				token.conditions.push(self.condition(text));
				token
			}
			Rule::Modifier(kind) => {
				let symbol_len = match kind {
					TokenKind::KeepHigh if text.starts_with("kh") => 2,
					TokenKind::KeepHigh | TokenKind::Explode | TokenKind::Reroll | TokenKind::Unique => 1,
					_ => 2,
				};
				let count = text.get(symbol_len..).unwrap_or_default();
				let value = match kind {
					TokenKind::Unique => "u".to_owned(),
					_ => clamp_infinite(count),
				};
				Token::new(kind, value, text)
			}
			Rule::Dice(kind) => Token::dice(kind, self.dice_spec(text, offset, after_paren)?, text),
			Rule::Number => Token::new(TokenKind::Dice, text, text),
			Rule::Field => {
				let value = self
					.fields
					.as_ref()
					.and_then(|fields| fields.lookup(text))
					.ok_or_else(|| LexError::UnknownField {
						offset,
						name: text.to_owned(),
					})?;
				Token::new(TokenKind::Dice, value.to_string(), text)
			}
			Rule::Sort => Token::new(TokenKind::Sort, if text.ends_with('d') { "sd" } else { "sa" }, text),
			Rule::Math => match text {
				"(" => Token::new(TokenKind::LeftParen, text, text),
				")" => Token::new(TokenKind::RightParen, text, text),
				_ => match text.chars().next().and_then(MathOp::from_symbol) {
					Some(op) => Token::math(op),
					None => {
						return Err(LexError::Unexpected {
							offset,
							found: text.to_owned(),
						})
					}
				},
			},
		}))
	}

	/// Parses a dice literal and fills in omitted counts and faces with the defaults. Dice directly after a closing
	/// parenthesis keep an omitted count, since it comes from the group before them.
	fn dice_spec(&self, text: &str, offset: usize, after_paren: bool) -> Result<DiceSpec, LexError> {
		let mut spec = text.parse::<DiceSpec>().map_err(|err| LexError::InvalidDice {
			offset,
			text: text.to_owned(),
			details: err.details,
		})?;

		if spec.faces == FaceSpec::Omitted {
			spec.faces = FaceSpec::Sides(i64::from(self.defaults.face));
		}
		if !after_paren {
			spec = spec.with_default_count(i64::from(self.defaults.roll));
		}

		match &spec.faces {
			FaceSpec::List(faces) if faces.is_empty() => Err(LexError::InvalidDice {
				offset,
				text: text.to_owned(),
				details: "dice must have at least one face".to_owned(),
			}),
			FaceSpec::Sides(0) => Err(LexError::InvalidDice {
				offset,
				text: text.to_owned(),
				details: "dice must have at least one side".to_owned(),
			}),
			_ => Ok(spec),
		}
	}

	/// Splits a condition into its operator and comparer, tokenizing the comparer. Comparers that fail to tokenize
	/// are kept with no tokens, which makes them resolve to NaN.
	fn condition(&self, text: &str) -> Conditional {
		let (operator, comparer) = CONDITION_PARTS
			.captures(text)
			.and_then(|captures| {
				let operator = ComparisonOp::from_symbol(captures.get(1)?.as_str())?;
				Some((operator, captures.get(2)?.as_str()))
			})
			.unwrap_or((ComparisonOp::Eq, text));

		let tokens = self.parse(comparer).unwrap_or_default();
		Conditional::new(operator, comparer, tokens, text)
	}

	/// Recognizes a whole input that is a narrative dice pool.
	fn narrative(input: &str) -> Option<Token> {
		let trimmed = input.trim();
		if !NARRATIVE.is_match(trimmed) || DICE_WITH_FACES.is_match(trimmed) {
			return None;
		}

		let value = narrative::normalize(trimmed)?;
		Some(Token::new(TokenKind::Narrative, value, trimmed))
	}

	/// Folds runs of `+`/`-` into a single operator (an odd number of minuses being a minus), and attaches
	/// conditions to the token before them.
	fn fold_signs(raw: Vec<(Token, Range<usize>)>) -> Vec<(Token, Range<usize>)> {
		let mut folded: Vec<(Token, Range<usize>)> = Vec::with_capacity(raw.len());
		for (token, span) in raw {
			match folded.last_mut() {
				Some((previous, previous_span)) if token.kind == TokenKind::Condition => {
					previous.conditions.extend(token.conditions);
					previous_span.end = span.end;
				}
				Some((previous, previous_span)) if previous.is_sign() && token.is_sign() => {
					let negative = (previous.math_op() == Some(MathOp::Sub)) != (token.math_op() == Some(MathOp::Sub));
					*previous = Token::math(if negative { MathOp::Sub } else { MathOp::Add });
					previous_span.end = span.end;
				}
				_ => folded.push((token, span)),
			}
		}
		folded
	}

	/// Merges signs in unary position (at the start, or after an operator or opening parenthesis) into the number or
	/// dice after them. A unary minus before a parenthesised group becomes `-1 *`.
	fn fold_unary(input: &str, tokens: Vec<(Token, Range<usize>)>) -> Vec<Token> {
		let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
		let mut tokens = tokens.into_iter().peekable();
		while let Some((token, span)) = tokens.next() {
			let unary = token.is_sign()
				&& out
					.last()
					.is_none_or(|previous| previous.math_op().is_some() || previous.kind == TokenKind::LeftParen);
			if !unary {
				out.push(token);
				continue;
			}

			let negative = token.math_op() == Some(MathOp::Sub);
			match tokens.peek_mut() {
				Some((next, next_span)) if next.kind.is_dice() => {
					if negative {
						negate(next);
						next.text = input.get(span.start..next_span.end).unwrap_or(&next.text).to_owned();
						next_span.start = span.start;
					}
				}
				Some((next, _)) if next.kind == TokenKind::LeftParen => {
					if negative {
						out.push(Token::new(TokenKind::Dice, "-1", "-"));
						out.push(Token::math(MathOp::Mul));
					}
				}
				_ => out.push(token),
			}
		}
		out
	}
}

/// Negates a number or dice token.
fn negate(token: &mut Token) {
	match &mut token.dice {
		Some(spec) => {
			spec.count = Some(-spec.count.unwrap_or(1));
			token.value = spec.to_string();
		}
		None => {
			token.value = match token.value.strip_prefix('-') {
				Some(positive) => positive.to_owned(),
				None => format!("-{}", token.value),
			};
		}
	}
}

impl fmt::Debug for Lexer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Lexer")
			.field("defaults", &self.defaults)
			.field("fields", &self.fields.is_some())
			.finish()
	}
}
