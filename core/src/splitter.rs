//! The matching engine.
//!
//! A [`Splitter`] binds a [`Schema`] to a resolved converter plan and a token
//! expander. Each [`split`](Splitter::split) call makes one left-to-right pass
//! over the tokens of its level:
//!
//! 1. once a varargs slot has started, every later token belongs to it;
//! 2. the first `--` switches to positional-only mode and is discarded;
//! 3. `name=value` is split on the first `=` and matched by name;
//! 4. exact names match flags, single, repeatable, required and branch
//!    options;
//! 5. `-abc` expands to the flags `-a`, `-b`, `-c` when all are declared
//!    flags;
//! 6. everything else fills the next pending positional slot;
//! 7. a token starting with `-` that no slot takes is an unknown option,
//!    unless it is a number.
//!
//! Matching a branch hands the remaining tokens to a recursive pass over the
//! branch's schema; the outer pass never resumes.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::bag::ArgumentBag;
use crate::convert::{Converter, Resolver};
use crate::error::{ConfigError, SplitError};
use crate::expand::{ArgFileExpander, TokenExpander};
use crate::help::render_help;
use crate::option::{OptionKind, OptionSchema, ValueSpec};
use crate::schema::{Schema, SchemaCore};
use crate::value::Value;

/// Converters resolved for every option of a schema tree.
#[derive(Clone)]
enum Slot {
    Flag,
    Convert(Converter),
    Nested(Arc<Plan>),
}

struct Plan {
    core: Arc<SchemaCore>,
    slots: Vec<Slot>,
}

impl Plan {
    fn resolve(core: &Arc<SchemaCore>, resolver: &Resolver) -> Result<Arc<Self>, ConfigError> {
        let slots = core
            .options
            .iter()
            .map(|option| resolve_slot(option, resolver))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Arc::new(Self {
            core: Arc::clone(core),
            slots,
        }))
    }
}

fn resolve_slot(option: &OptionSchema, resolver: &Resolver) -> Result<Slot, ConfigError> {
    if let Some(schema) = option.kind().nested_schema() {
        return Ok(Slot::Nested(Plan::resolve(schema.core(), resolver)?));
    }
    match option.kind().shape() {
        Some(shape) => resolver
            .resolve(shape)
            .map(Slot::Convert)
            .ok_or_else(|| ConfigError::UnresolvedConverter {
                option: option.primary_name().to_string(),
                shape: shape.to_string(),
            }),
        None => Ok(Slot::Flag),
    }
}

/// Builder for a [`Splitter`] with a custom resolver or expander.
pub struct SplitterBuilder<T = ArgumentBag> {
    schema: Schema<T>,
    resolver: Resolver,
    expander: Arc<dyn TokenExpander>,
}

impl<T> SplitterBuilder<T> {
    /// Replaces the default `basic().or(enumerated())` resolver chain.
    pub fn resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replaces the default [`ArgFileExpander`].
    pub fn expander(mut self, expander: impl TokenExpander + 'static) -> Self {
        self.expander = Arc::new(expander);
        self
    }

    /// Resolves a converter for every option of the schema tree.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnresolvedConverter`] if any option's shape is
    /// unknown to the resolver chain.
    pub fn build(self) -> Result<Splitter<T>, ConfigError> {
        let plan = Plan::resolve(self.schema.core(), &self.resolver)?;
        Ok(Splitter {
            schema: self.schema,
            plan,
            expander: self.expander,
        })
    }
}

/// A schema bound to its resolved converters and a token expander.
///
/// Splitters hold no per-call state and can be shared across threads.
///
/// # Examples
///
/// ```
/// use argsplit_core::{OptionSchema, Schema, Shape, Splitter, Value};
///
/// let schema = Schema::new(vec![
///     OptionSchema::flag(["-v", "--verbose"]),
///     OptionSchema::repeatable("--list", Shape::String),
///     OptionSchema::varargs("params", Shape::String),
/// ])
/// .unwrap();
/// let splitter = Splitter::new(schema).unwrap();
///
/// let bag = splitter.split(["--list", "a", "--list=b,o", "-v", "x"]).unwrap();
/// assert!(bag.flag("--verbose"));
/// assert_eq!(bag.value::<Vec<String>>("--list").unwrap(), vec!["a", "b", "o"]);
/// assert_eq!(bag.value::<Vec<String>>("params").unwrap(), vec!["x"]);
/// ```
pub struct Splitter<T = ArgumentBag> {
    schema: Schema<T>,
    plan: Arc<Plan>,
    expander: Arc<dyn TokenExpander>,
}

impl<T> Splitter<T> {
    /// Builds a splitter with the default resolver and `@file` expansion.
    pub fn new(schema: Schema<T>) -> Result<Self, ConfigError> {
        Self::builder(schema).build()
    }

    pub fn builder(schema: Schema<T>) -> SplitterBuilder<T> {
        SplitterBuilder {
            schema,
            resolver: Resolver::default(),
            expander: Arc::new(ArgFileExpander::new()),
        }
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// Expands, matches and converts `tokens`, then runs the finalizer.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError`] on the first failure; no partial result is
    /// produced.
    pub fn split<I, S>(&self, tokens: I) -> Result<T, SplitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bag = self.split_bag(tokens)?;
        Ok(self.schema.finalize(bag)?)
    }

    /// Like [`split`](Self::split) but returns the bag without finalizing.
    pub fn split_bag<I, S>(&self, tokens: I) -> Result<ArgumentBag, SplitError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens.into_iter().map(Into::into).collect();
        let tokens = self.expander.expand(tokens)?;
        scan(&self.plan, &tokens)
    }

    /// Renders help for the bound schema.
    pub fn help(&self) -> String {
        render_help(&self.schema)
    }
}

impl<T> fmt::Debug for Splitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Splitter")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Raw per-option accumulator.
enum Raw {
    Flag(bool),
    Single(Option<Vec<String>>),
    Repeatable(Vec<Vec<String>>),
    Required(Option<String>),
    Varargs(Vec<String>),
    Branch(Option<ArgumentBag>),
}

impl Raw {
    fn empty(kind: &OptionKind) -> Self {
        match kind {
            OptionKind::Flag => Raw::Flag(false),
            OptionKind::Single(_) => Raw::Single(None),
            OptionKind::Repeatable(_) => Raw::Repeatable(Vec::new()),
            OptionKind::Required(_) => Raw::Required(None),
            OptionKind::Varargs(_) => Raw::Varargs(Vec::new()),
            OptionKind::Branch(_) => Raw::Branch(None),
        }
    }
}

/// State of one pass over one schema level.
struct Scan<'a> {
    plan: &'a Plan,
    tokens: &'a [String],
    cursor: usize,
    raw: Vec<Raw>,
    pending: VecDeque<usize>,
    escaped: bool,
    absorbing: Option<usize>,
    delegated: bool,
}

fn scan(plan: &Plan, tokens: &[String]) -> Result<ArgumentBag, SplitError> {
    let options = &plan.core.options;
    let mut state = Scan {
        plan,
        tokens,
        cursor: 0,
        raw: options.iter().map(|o| Raw::empty(o.kind())).collect(),
        pending: options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.kind().is_positional())
            .map(|(index, _)| index)
            .collect(),
        escaped: false,
        absorbing: None,
        delegated: false,
    };
    state.run()?;
    state.finish()
}

impl<'a> Scan<'a> {
    fn option(&self, index: usize) -> &'a OptionSchema {
        &self.plan.core.options[index]
    }

    fn run(&mut self) -> Result<(), SplitError> {
        let tokens = self.tokens;
        while self.cursor < tokens.len() {
            let token = &tokens[self.cursor];
            self.cursor += 1;

            if let Some(index) = self.absorbing {
                if let Raw::Varargs(values) = &mut self.raw[index] {
                    values.push(token.clone());
                }
                continue;
            }

            if !self.escaped {
                if token == "--" {
                    trace!("double dash, remaining tokens are positional");
                    self.escaped = true;
                    continue;
                }
                if self.match_named(token)? {
                    if self.delegated {
                        break;
                    }
                    continue;
                }
                if self.match_bundle(token) {
                    continue;
                }
            }

            match self.accept_positional(token) {
                Err(SplitError::UnexpectedArgument(_))
                    if !self.escaped && looks_like_option(token) =>
                {
                    return Err(SplitError::UnknownOption(token.clone()));
                }
                result => result?,
            }
        }
        Ok(())
    }

    /// Handles `name=value` and exact-name tokens. Returns `false` when the
    /// token names no matchable option.
    fn match_named(&mut self, token: &str) -> Result<bool, SplitError> {
        if let Some((name, value)) = token.split_once('=') {
            if let Some(index) = self.plan.core.registry.lookup(name) {
                match self.option(index).kind() {
                    OptionKind::Flag => {
                        return Err(SplitError::UnexpectedValue {
                            option: self.option(index).primary_name().to_string(),
                            value: value.to_string(),
                        });
                    }
                    OptionKind::Single(_)
                    | OptionKind::Repeatable(_)
                    | OptionKind::Required(_) => {
                        self.accept_named(index, Some(value))?;
                        return Ok(true);
                    }
                    OptionKind::Varargs(_) | OptionKind::Branch(_) => {}
                }
            }
        }

        let Some(index) = self.plan.core.registry.lookup(token) else {
            return Ok(false);
        };
        match self.option(index).kind() {
            OptionKind::Varargs(_) => Ok(false),
            OptionKind::Branch(_) => {
                self.delegate(index)?;
                Ok(true)
            }
            _ => {
                self.accept_named(index, None)?;
                Ok(true)
            }
        }
    }

    fn accept_named(&mut self, index: usize, inline: Option<&str>) -> Result<(), SplitError> {
        let option = self.option(index);
        match option.kind() {
            OptionKind::Flag => {
                self.raw[index] = Raw::Flag(true);
            }
            OptionKind::Single(_) => {
                let group = self.take_values(option, inline, option.cardinality())?;
                self.raw[index] = Raw::Single(Some(group));
            }
            OptionKind::Repeatable(_) => {
                let groups = match inline {
                    Some(value) if option.cardinality() == 1 => {
                        value.split(',').map(|piece| vec![piece.to_string()]).collect()
                    }
                    _ => vec![self.take_values(option, inline, option.cardinality())?],
                };
                if let Raw::Repeatable(existing) = &mut self.raw[index] {
                    existing.extend(groups);
                }
            }
            OptionKind::Required(_) => {
                let mut group = self.take_values(option, inline, 1)?;
                self.raw[index] = Raw::Required(group.pop());
                self.pending.retain(|&slot| slot != index);
            }
            OptionKind::Varargs(_) | OptionKind::Branch(_) => {
                unreachable!("{} options are not matched by name", option.kind())
            }
        }
        Ok(())
    }

    /// Collects `count` tokens, starting with the inline value if present.
    fn take_values(
        &mut self,
        option: &OptionSchema,
        inline: Option<&str>,
        count: usize,
    ) -> Result<Vec<String>, SplitError> {
        let mut values = Vec::with_capacity(count);
        if let Some(value) = inline {
            values.push(value.to_string());
        }
        while values.len() < count {
            let Some(token) = self.tokens.get(self.cursor) else {
                return Err(SplitError::MissingValue {
                    option: option.primary_name().to_string(),
                    expected: count,
                    found: values.len(),
                });
            };
            values.push(token.clone());
            self.cursor += 1;
        }
        Ok(values)
    }

    /// Expands `-abc` into flags `-a`, `-b`, `-c` if every one is a flag.
    fn match_bundle(&mut self, token: &str) -> bool {
        let Some(cluster) = token.strip_prefix('-') else {
            return false;
        };
        if cluster.starts_with('-') || cluster.chars().count() < 2 {
            return false;
        }

        let registry = &self.plan.core.registry;
        let mut indices = Vec::with_capacity(cluster.len());
        for c in cluster.chars() {
            match registry.lookup(&format!("-{c}")) {
                Some(index) if matches!(self.option(index).kind(), OptionKind::Flag) => {
                    indices.push(index)
                }
                _ => return false,
            }
        }
        for index in indices {
            self.raw[index] = Raw::Flag(true);
        }
        true
    }

    fn accept_positional(&mut self, token: &str) -> Result<(), SplitError> {
        let Some(&index) = self.pending.front() else {
            return Err(SplitError::UnexpectedArgument(token.to_string()));
        };
        match self.option(index).kind() {
            OptionKind::Required(_) => {
                self.raw[index] = Raw::Required(Some(token.to_string()));
                self.pending.pop_front();
            }
            OptionKind::Varargs(_) => {
                if let Raw::Varargs(values) = &mut self.raw[index] {
                    values.push(token.to_string());
                }
                self.absorbing = Some(index);
            }
            _ => return Err(SplitError::UnexpectedArgument(token.to_string())),
        }
        Ok(())
    }

    /// Hands every token after the branch name to the branch's schema.
    fn delegate(&mut self, index: usize) -> Result<(), SplitError> {
        let plan = self.plan;
        let Slot::Nested(nested) = &plan.slots[index] else {
            unreachable!("branch options always resolve to a nested plan");
        };
        let rest = &self.tokens[self.cursor..];
        debug!(
            branch = self.option(index).primary_name(),
            tokens = rest.len(),
            "delegating to branch"
        );
        let bag = scan(nested, rest)?;
        self.raw[index] = Raw::Branch(Some(bag));
        self.cursor = self.tokens.len();
        self.delegated = true;
        Ok(())
    }

    fn finish(self) -> Result<ArgumentBag, SplitError> {
        let plan = self.plan;
        if !self.delegated {
            for (option, raw) in plan.core.options.iter().zip(&self.raw) {
                if let Raw::Required(None) = raw {
                    return Err(SplitError::MissingArgument(
                        option.primary_name().to_string(),
                    ));
                }
            }
        }

        let values = self
            .raw
            .into_iter()
            .enumerate()
            .map(|(index, raw)| convert(plan, index, raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ArgumentBag::new(Arc::clone(&plan.core), values))
    }
}

fn convert(plan: &Plan, index: usize, raw: Raw) -> Result<Value, SplitError> {
    let option = &plan.core.options[index];
    let slot = &plan.slots[index];
    match raw {
        Raw::Flag(set) => Ok(Value::Bool(set)),
        Raw::Single(None) | Raw::Required(None) | Raw::Branch(None) => Ok(Value::Absent),
        Raw::Single(Some(group)) => convert_group(option, slot, group),
        Raw::Repeatable(groups) => groups
            .into_iter()
            .map(|group| convert_group(option, slot, group))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Raw::Required(Some(token)) => convert_token(option, slot, &token),
        Raw::Varargs(tokens) => tokens
            .iter()
            .map(|token| convert_token(option, slot, token))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Raw::Branch(Some(bag)) => Ok(Value::Group(Box::new(bag))),
    }
}

/// Converts one occurrence of a single or repeatable option.
fn convert_group(option: &OptionSchema, slot: &Slot, group: Vec<String>) -> Result<Value, SplitError> {
    match (option.kind(), slot) {
        (
            OptionKind::Single(ValueSpec::Group(_)) | OptionKind::Repeatable(ValueSpec::Group(_)),
            Slot::Nested(nested),
        ) => Ok(Value::Group(Box::new(scan(nested, &group)?))),
        _ if group.len() == 1 => convert_token(option, slot, &group[0]),
        _ => group
            .iter()
            .map(|token| convert_token(option, slot, token))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
    }
}

fn convert_token(option: &OptionSchema, slot: &Slot, token: &str) -> Result<Value, SplitError> {
    let Slot::Convert(converter) = slot else {
        unreachable!("value-bearing options always resolve to a converter");
    };
    converter(token).map_err(|source| SplitError::Conversion {
        option: option.primary_name().to_string(),
        input: token.to_string(),
        source,
    })
}

/// `true` for `-x`/`--xyz` style tokens; a lone `-` and negative numbers are
/// positional.
fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token.parse::<f64>().is_err()
}
