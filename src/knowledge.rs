//! Knowledge entities: facts, rules, and their support bookkeeping.
//!
//! A [`Fact`] or [`Rule`] couples immutable logical content with mutable
//! justification state. `supported_by` lists the `[premise fact, rule]`
//! pairs that derived the entity; `supports_facts` / `supports_rules` are
//! non-owning back-references to the entities it helped derive, used only to
//! locate dependents during retraction. All links are [`EntityId`] handles
//! into the store's arena, never direct references, so the support graph may
//! contain cycles without lifetime trouble.

use std::fmt;
use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

use crate::term::Term;

// ---------------------------------------------------------------------------
// Entity handles
// ---------------------------------------------------------------------------

/// Stable, niche-optimized handle to an entity in the store's arena.
///
/// Uses `NonZeroU64` so that `Option<EntityId>` is the same size as
/// `EntityId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct EntityId(NonZeroU64);

impl EntityId {
    /// Create an `EntityId` from a raw `u64`. Returns `None` if `raw` is zero.
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(EntityId)
    }

    /// Get the underlying `u64` value.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ent:{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Justification
// ---------------------------------------------------------------------------

/// One justification for a derived entity: the premise fact and the rule
/// whose combination produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Justification {
    /// The premise fact that matched the rule's first antecedent.
    pub fact: EntityId,
    /// The rule the premise was matched against.
    pub rule: EntityId,
}

impl Justification {
    /// Returns `true` if either member of the pair is `id`.
    pub fn mentions(self, id: EntityId) -> bool {
        self.fact == id || self.rule == id
    }

    /// The other member of the pair, given one of its members.
    pub fn partner_of(self, id: EntityId) -> EntityId {
        if self.fact == id { self.rule } else { self.fact }
    }
}

// ---------------------------------------------------------------------------
// Fact
// ---------------------------------------------------------------------------

/// A logical statement held by the store.
///
/// Structural identity is the `statement` alone; the remaining fields are
/// bookkeeping and never participate in store lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fact {
    /// The statement this fact asserts.
    pub statement: Term,
    /// `true` when a caller directly asserted this fact, independent of any
    /// derivation.
    pub asserted: bool,
    /// Justification pairs. Empty means the fact exists only because it was
    /// asserted (or is about to be deleted).
    pub supported_by: Vec<Justification>,
    /// Facts this fact helped derive.
    pub supports_facts: Vec<EntityId>,
    /// Rules this fact helped derive.
    pub supports_rules: Vec<EntityId>,
}

impl Fact {
    /// A directly asserted fact with no derivation support.
    pub fn asserted(statement: Term) -> Self {
        Self {
            statement,
            asserted: true,
            supported_by: Vec::new(),
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
        }
    }

    /// A fact derived by inference, carrying its first justification.
    pub fn derived(statement: Term, justification: Justification) -> Self {
        Self {
            statement,
            asserted: false,
            supported_by: vec![justification],
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
        }
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statement)
    }
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// An implication: an ordered list of antecedent patterns and one consequent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Antecedent patterns. Only the first is ever matched directly against a
    /// fact; the rest survive into specialized rules.
    pub lhs: Vec<Term>,
    /// The consequent produced when all antecedents are satisfied.
    pub rhs: Term,
    /// `true` when a caller directly asserted this rule.
    pub asserted: bool,
    /// Justification pairs, as for [`Fact`].
    pub supported_by: Vec<Justification>,
    /// Facts this rule helped derive.
    pub supports_facts: Vec<EntityId>,
    /// Rules this rule helped derive.
    pub supports_rules: Vec<EntityId>,
}

impl Rule {
    /// A directly asserted rule.
    pub fn asserted(lhs: Vec<Term>, rhs: Term) -> Self {
        Self {
            lhs,
            rhs,
            asserted: true,
            supported_by: Vec::new(),
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
        }
    }

    /// A specialized rule produced by inference.
    pub fn derived(lhs: Vec<Term>, rhs: Term, justification: Justification) -> Self {
        Self {
            lhs,
            rhs,
            asserted: false,
            supported_by: vec![justification],
            supports_facts: Vec::new(),
            supports_rules: Vec::new(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, antecedent) in self.lhs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{antecedent}")?;
        }
        write!(f, ") -> {}", self.rhs)
    }
}

// ---------------------------------------------------------------------------
// Knowledge
// ---------------------------------------------------------------------------

/// The two kinds of knowledge entity, with shared bookkeeping accessors.
///
/// Exhaustive matching on this union replaces the runtime type inspection a
/// dynamically typed implementation would use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Knowledge {
    Fact(Fact),
    Rule(Rule),
}

impl Knowledge {
    /// Whether a caller directly asserted this entity.
    pub fn is_asserted(&self) -> bool {
        match self {
            Self::Fact(fact) => fact.asserted,
            Self::Rule(rule) => rule.asserted,
        }
    }

    /// Mark this entity as directly asserted.
    pub fn set_asserted(&mut self) {
        match self {
            Self::Fact(fact) => fact.asserted = true,
            Self::Rule(rule) => rule.asserted = true,
        }
    }

    /// The justification pairs supporting this entity.
    pub fn supported_by(&self) -> &[Justification] {
        match self {
            Self::Fact(fact) => &fact.supported_by,
            Self::Rule(rule) => &rule.supported_by,
        }
    }

    /// Mutable access to the justification pairs.
    pub fn supported_by_mut(&mut self) -> &mut Vec<Justification> {
        match self {
            Self::Fact(fact) => &mut fact.supported_by,
            Self::Rule(rule) => &mut rule.supported_by,
        }
    }

    /// Facts this entity helped derive.
    pub fn supports_facts(&self) -> &[EntityId] {
        match self {
            Self::Fact(fact) => &fact.supports_facts,
            Self::Rule(rule) => &rule.supports_facts,
        }
    }

    /// Mutable access to the dependent-fact list.
    pub fn supports_facts_mut(&mut self) -> &mut Vec<EntityId> {
        match self {
            Self::Fact(fact) => &mut fact.supports_facts,
            Self::Rule(rule) => &mut rule.supports_facts,
        }
    }

    /// Rules this entity helped derive.
    pub fn supports_rules(&self) -> &[EntityId] {
        match self {
            Self::Fact(fact) => &fact.supports_rules,
            Self::Rule(rule) => &rule.supports_rules,
        }
    }

    /// Mutable access to the dependent-rule list.
    pub fn supports_rules_mut(&mut self) -> &mut Vec<EntityId> {
        match self {
            Self::Fact(fact) => &mut fact.supports_rules,
            Self::Rule(rule) => &mut rule.supports_rules,
        }
    }

    /// Downcast to a fact.
    pub fn as_fact(&self) -> Option<&Fact> {
        match self {
            Self::Fact(fact) => Some(fact),
            Self::Rule(_) => None,
        }
    }

    /// Downcast to a rule.
    pub fn as_rule(&self) -> Option<&Rule> {
        match self {
            Self::Fact(_) => None,
            Self::Rule(rule) => Some(rule),
        }
    }
}

impl fmt::Display for Knowledge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fact(fact) => write!(f, "{fact}"),
            Self::Rule(rule) => write!(f, "{rule}"),
        }
    }
}

impl From<Fact> for Knowledge {
    fn from(fact: Fact) -> Self {
        Self::Fact(fact)
    }
}

impl From<Rule> for Knowledge {
    fn from(rule: Rule) -> Self {
        Self::Rule(rule)
    }
}
