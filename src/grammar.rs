//! This module defines the in-memory model of a Tracery rule set: named
//! rules holding candidate expansion templates, the template segments the
//! compiler composes them from, and the rendering of templates into Tracery
//! text. The rule set is assembled once per compilation and is immutable
//! afterwards; only the serializer consumes it.

use crate::types::CompileError;
use std::collections::HashMap;

/// One piece of an expansion template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text, emitted verbatim.
    Text(String),
    /// A rule reference, rendered as `#name#`. Resolution prefers the top of
    /// the name's binding stack and falls back to the static rule.
    Expand(String),
    /// A deferred variable binding, rendered as `[name:template]`. The
    /// runtime stores the template text unexpanded; expansion happens when
    /// the binding is later referenced, not when it is made.
    Bind {
        name: String,
        value: Template,
    },
    /// Pops the top binding of a variable, rendered as `[name:POP]`.
    Pop(String),
}

/// An expansion template: an ordered run of segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Template(pub Vec<Segment>);

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends literal text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.0.push(Segment::Text(text.into()));
        self
    }

    /// Appends a rule reference.
    pub fn expand(mut self, name: impl Into<String>) -> Self {
        self.0.push(Segment::Expand(name.into()));
        self
    }

    /// Appends a deferred binding of `value` to `name`.
    pub fn bind(mut self, name: impl Into<String>, value: Template) -> Self {
        self.0.push(Segment::Bind {
            name: name.into(),
            value,
        });
        self
    }

    /// Appends a binding pop for `name`.
    pub fn pop(mut self, name: impl Into<String>) -> Self {
        self.0.push(Segment::Pop(name.into()));
        self
    }

    /// Renders the template into Tracery text.
    ///
    /// Identifier validation guarantees that no name or literal needs
    /// escaping, so rendering is plain concatenation.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Expand(name) => {
                    out.push('#');
                    out.push_str(name);
                    out.push('#');
                }
                Segment::Bind { name, value } => {
                    out.push('[');
                    out.push_str(name);
                    out.push(':');
                    out.push_str(&value.render());
                    out.push(']');
                }
                Segment::Pop(name) => {
                    out.push('[');
                    out.push_str(name);
                    out.push_str(":POP]");
                }
            }
        }
        out
    }

    /// Collects every rule reference in the template, including references
    /// inside deferred binding values.
    fn collect_references<'a>(&'a self, out: &mut Vec<&'a str>) {
        for segment in &self.0 {
            match segment {
                Segment::Expand(name) => out.push(name),
                Segment::Bind { value, .. } => value.collect_references(out),
                Segment::Text(_) | Segment::Pop(_) => {}
            }
        }
    }
}

/// A named rule's candidates. The source machine is deterministic, so every
/// rule carries exactly one candidate and the runtime's random choice
/// between candidates is never engaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarRule {
    pub candidates: Vec<Template>,
}

impl GrammarRule {
    /// A rule with a single candidate template.
    pub fn single(template: Template) -> Self {
        Self {
            candidates: vec![template],
        }
    }

    /// A rule whose only candidate is a bare literal.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::single(Template::new().text(text))
    }
}

/// The compiled rule set: rule names mapped to candidates, in insertion
/// order. Insertion order is part of the output format, so it is preserved
/// through serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    entry: String,
    rules: Vec<(String, GrammarRule)>,
    index: HashMap<String, usize>,
}

impl Grammar {
    /// Creates an empty rule set whose designated entry rule is `entry`.
    pub fn new(entry: impl Into<String>) -> Self {
        Self {
            entry: entry.into(),
            rules: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// The name of the rule the target runtime starts expanding.
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Adds a rule, rejecting name collisions.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        rule: GrammarRule,
    ) -> Result<(), CompileError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(CompileError::DuplicateRule(name));
        }

        self.index.insert(name.clone(), self.rules.len());
        self.rules.push((name, rule));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&GrammarRule> {
        self.index.get(name).map(|&i| &self.rules[i].1)
    }

    /// Iterates over `(name, rule)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GrammarRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Every `(rule, referenced name)` pair in the set, deferred binding
    /// values included.
    pub fn references(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        for (name, rule) in &self.rules {
            let mut targets = Vec::new();
            for candidate in &rule.candidates {
                candidate.collect_references(&mut targets);
            }
            out.extend(targets.into_iter().map(|t| (name.as_str(), t)));
        }
        out
    }

    /// Verifies the closure invariant: every reference resolves to a rule
    /// present in the set.
    pub fn check_references(&self) -> Result<(), CompileError> {
        for (rule, target) in self.references() {
            if !self.contains(target) {
                return Err(CompileError::UnresolvedReference {
                    rule: rule.to_string(),
                    target: target.to_string(),
                });
            }
        }

        Ok(())
    }
}
