//! Tag expressions for selecting releases
//!
//! A tag expression is a comma-separated list of terms. Every term must hold
//! for the expression to match:
//!
//! - `name` matches if the tag set contains `name`
//! - `!name` matches if the tag set does not contain `name`
//! - `*` always matches
//!
//! ```
//! use std::collections::BTreeSet;
//! use helmdeck_core::TagExpression;
//!
//! let expr = TagExpression::parse("backend, !experimental").unwrap();
//! let tags: BTreeSet<String> = ["backend".to_string()].into();
//! assert!(expr.matches(&tags));
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// A single comma-separated term
#[derive(Debug, Clone, PartialEq, Eq)]
enum Term {
    Any,
    Present(String),
    Absent(String),
}

impl Term {
    fn matches(&self, tags: &BTreeSet<String>) -> bool {
        match self {
            Term::Any => true,
            Term::Present(tag) => tags.contains(tag),
            Term::Absent(tag) => !tags.contains(tag),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Any => write!(f, "*"),
            Term::Present(tag) => write!(f, "{}", tag),
            Term::Absent(tag) => write!(f, "!{}", tag),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Always,
    Terms(Vec<Term>),
    And(Box<Node>, Box<Node>),
}

impl Node {
    fn matches(&self, tags: &BTreeSet<String>) -> bool {
        match self {
            Node::Always => true,
            Node::Terms(terms) => terms.iter().all(|t| t.matches(tags)),
            Node::And(left, right) => left.matches(tags) && right.matches(tags),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Always => write!(f, "*"),
            Node::Terms(terms) => {
                let rendered: Vec<String> = terms.iter().map(ToString::to_string).collect();
                write!(f, "{}", rendered.join(","))
            }
            Node::And(left, right) => write!(f, "({}) & ({})", left, right),
        }
    }
}

/// Boolean predicate over a release's tag set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagExpression(Node);

impl TagExpression {
    /// Parse an expression such as `"web,!legacy"`
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidExpression {
            expression: input.to_string(),
            reason: reason.to_string(),
        };

        if input.trim().is_empty() {
            return Err(invalid("expression is empty"));
        }

        let mut terms = Vec::new();
        for raw in input.split(',') {
            let term = raw.trim();
            if term.is_empty() {
                return Err(invalid("empty term in comma-separated list"));
            }

            if term == "*" {
                terms.push(Term::Any);
            } else if let Some(negated) = term.strip_prefix('!') {
                let negated = negated.trim();
                if negated.is_empty() {
                    return Err(invalid("'!' must be followed by a tag"));
                }
                terms.push(Term::Absent(negated.to_string()));
            } else {
                terms.push(Term::Present(term.to_string()));
            }
        }

        Ok(TagExpression(Node::Terms(terms)))
    }

    /// Expression that matches everything
    pub fn always_match() -> Self {
        TagExpression(Node::Always)
    }

    /// Check the expression against a tag set
    pub fn matches(&self, tags: &BTreeSet<String>) -> bool {
        self.0.matches(tags)
    }

    /// Logical AND of two expressions
    ///
    /// The match-all expression is the neutral element and is folded away.
    pub fn and(self, other: TagExpression) -> TagExpression {
        match (self.0, other.0) {
            (Node::Always, other) => TagExpression(other),
            (this, Node::Always) => TagExpression(this),
            (this, other) => TagExpression(Node::And(Box::new(this), Box::new(other))),
        }
    }

    /// True for the match-all expression
    pub fn is_always(&self) -> bool {
        matches!(self.0, Node::Always)
    }
}

impl Default for TagExpression {
    fn default() -> Self {
        TagExpression::always_match()
    }
}

impl FromStr for TagExpression {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        TagExpression::parse(s)
    }
}

impl fmt::Display for TagExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
