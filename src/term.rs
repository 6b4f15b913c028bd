//! Logical term primitives: atoms, variables, compound statements, and
//! variable binding sets.
//!
//! Terms are plain values with structural equality. The knowledge base never
//! looks inside a term except through [`crate::unify`], so nesting is
//! supported even though most knowledge bases only use flat statements like
//! `(isa Fido Dog)`.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

/// A logical term: constant, variable, or compound statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A constant symbol, e.g. `Fido` or `isa`.
    Atom(String),
    /// A variable, written `?x` in the text notation (stored without the `?`).
    Variable(String),
    /// A compound statement: a predicate applied to arguments, e.g.
    /// `(isa Fido Dog)`. Arguments may themselves be compound.
    Compound(Vec<Term>),
}

impl Term {
    /// Build an atom term.
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    /// Build a variable term. The name is stored without the `?` sigil.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Build a compound statement from its parts.
    pub fn compound(items: Vec<Term>) -> Self {
        Self::Compound(items)
    }

    /// Returns `true` if this term is a variable.
    pub fn is_variable(&self) -> bool {
        matches!(self, Self::Variable(_))
    }

    /// Returns `true` if this term is a compound statement.
    ///
    /// Only statements are queryable and assertable; a bare atom or variable
    /// is not a fact form.
    pub fn is_statement(&self) -> bool {
        matches!(self, Self::Compound(_))
    }

    /// Returns `true` if no variable occurs anywhere in this term.
    pub fn is_ground(&self) -> bool {
        match self {
            Self::Atom(_) => true,
            Self::Variable(_) => false,
            Self::Compound(items) => items.iter().all(Term::is_ground),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(name) => write!(f, "{name}"),
            Self::Variable(name) => write!(f, "?{name}"),
            Self::Compound(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// An ordered set of variable-to-term bindings produced by unification.
///
/// Bindings preserve the order in which variables were bound, so answers
/// print deterministically. A ground match produces an empty binding set,
/// which still counts as a successful match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bindings {
    pairs: Vec<(String, Term)>,
}

impl Bindings {
    /// Create an empty binding set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the term bound to a variable name, if any.
    pub fn bound(&self, name: &str) -> Option<&Term> {
        self.pairs
            .iter()
            .find(|(var, _)| var == name)
            .map(|(_, term)| term)
    }

    /// Bind a variable to a term. The caller is responsible for checking an
    /// existing binding first; rebinding appends a shadowed entry.
    pub fn bind(&mut self, name: impl Into<String>, term: Term) {
        self.pairs.push((name.into(), term));
    }

    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if nothing is bound (a ground match).
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterate over `(variable, term)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Term)> {
        self.pairs.iter().map(|(var, term)| (var.as_str(), term))
    }
}

impl fmt::Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (var, term)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "?{var} -> {term}")?;
        }
        write!(f, "}}")
    }
}
