//! Knowledge base facade: assertion, retraction, and queries.
//!
//! [`KnowledgeBase`] owns the store and exposes the caller-facing surface.
//! Assertion marks entities as directly asserted before handing them to the
//! store's merge-or-insert path; retraction resolves content to a handle and
//! delegates to the cascade; `ask` matches a query statement against every
//! stored fact in insertion order.

use serde::{Deserialize, Serialize};

use crate::knowledge::{EntityId, Fact, Knowledge, Rule};
use crate::retract;
use crate::store::KnowledgeStore;
use crate::term::{Bindings, Term};
use crate::unify::match_terms;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for a knowledge base.
#[derive(Debug, Clone, Default)]
pub struct KbConfig {
    /// Emit a `tracing` debug event for every derivation and every cascade
    /// removal (default: off).
    pub trace_derivations: bool,
}

// ---------------------------------------------------------------------------
// Query answers
// ---------------------------------------------------------------------------

/// One answer to a query: the bindings that make the query match, plus the
/// handle of the fact that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// Variable bindings; empty for a ground match.
    pub bindings: Bindings,
    /// The stored fact the query matched.
    pub fact: EntityId,
}

// ---------------------------------------------------------------------------
// Snapshot records (JSON export)
// ---------------------------------------------------------------------------

/// Exportable view of one fact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactRecord {
    pub statement: Term,
    pub asserted: bool,
    /// Number of justification pairs currently supporting the fact.
    pub justifications: usize,
}

/// Exportable view of one rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRecord {
    pub lhs: Vec<Term>,
    pub rhs: Term,
    pub asserted: bool,
    pub justifications: usize,
}

/// A serializable snapshot of the knowledge base contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbSnapshot {
    pub facts: Vec<FactRecord>,
    pub rules: Vec<RuleRecord>,
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

/// A forward-chaining knowledge base with justification-based truth
/// maintenance.
#[derive(Debug)]
pub struct KnowledgeBase {
    store: KnowledgeStore,
}

impl KnowledgeBase {
    /// Create an empty knowledge base.
    pub fn new(config: KbConfig) -> Self {
        Self {
            store: KnowledgeStore::new(config),
        }
    }

    /// Assert a fact or rule, discarding any bookkeeping the caller cooked
    /// up: only the logical content is taken, marked as directly asserted.
    pub fn assert(&mut self, knowledge: Knowledge) -> EntityId {
        match knowledge {
            Knowledge::Fact(fact) => self.assert_fact(fact.statement),
            Knowledge::Rule(rule) => self.assert_rule(rule.lhs, rule.rhs),
        }
    }

    /// Assert a fact. Chaining runs to a fixpoint before this returns.
    pub fn assert_fact(&mut self, statement: Term) -> EntityId {
        tracing::debug!(%statement, "asserting fact");
        self.store.add(Knowledge::Fact(Fact::asserted(statement)))
    }

    /// Assert a rule. Chaining runs to a fixpoint before this returns.
    pub fn assert_rule(&mut self, lhs: Vec<Term>, rhs: Term) -> EntityId {
        let rule = Rule::asserted(lhs, rhs);
        tracing::debug!(%rule, "asserting rule");
        self.store.add(Knowledge::Rule(rule))
    }

    /// Retract a fact or rule by content. Unknown content is a no-op, as are
    /// the refusal cases of the retraction procedure.
    pub fn retract(&mut self, knowledge: &Knowledge) {
        if let Some(id) = self.store.lookup(knowledge) {
            retract::retract(&mut self.store, id);
        }
    }

    /// Retract the fact with the given statement, cascading through derived
    /// knowledge that loses its last justification.
    pub fn retract_fact(&mut self, statement: &Term) {
        tracing::debug!(%statement, "retracting fact");
        if let Some(id) = self.store.lookup_fact(statement) {
            retract::retract(&mut self.store, id);
        }
    }

    /// Retract the rule with the given antecedents and consequent.
    pub fn retract_rule(&mut self, lhs: &[Term], rhs: &Term) {
        if let Some(id) = self.store.lookup_rule(lhs, rhs) {
            retract::retract(&mut self.store, id);
        }
    }

    /// Query the knowledge base.
    ///
    /// Returns one [`Answer`] per stored fact the query unifies with, in
    /// insertion order. A query that is not a statement form is reported as
    /// invalid and yields no answers; this is not an error.
    pub fn ask(&self, query: &Term) -> Vec<Answer> {
        if !query.is_statement() {
            tracing::warn!(%query, "invalid query: not a statement");
            return Vec::new();
        }
        self.store
            .fact_ids()
            .filter_map(|id| {
                let fact = self.store.get(id)?.as_fact()?;
                match_terms(query, &fact.statement).map(|bindings| Answer { bindings, fact: id })
            })
            .collect()
    }

    /// Whether a fact with this exact statement is currently stored.
    pub fn contains_fact(&self, statement: &Term) -> bool {
        self.store.lookup_fact(statement).is_some()
    }

    /// Facts in insertion order.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.store
            .fact_ids()
            .filter_map(|id| self.store.get(id).and_then(Knowledge::as_fact))
    }

    /// Rules in insertion order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.store
            .rule_ids()
            .filter_map(|id| self.store.get(id).and_then(Knowledge::as_rule))
    }

    /// Number of facts currently stored.
    pub fn fact_count(&self) -> usize {
        self.store.fact_count()
    }

    /// Number of rules currently stored.
    pub fn rule_count(&self) -> usize {
        self.store.rule_count()
    }

    /// The underlying store, for introspection.
    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    /// Capture a serializable snapshot of the current contents.
    pub fn snapshot(&self) -> KbSnapshot {
        KbSnapshot {
            facts: self
                .facts()
                .map(|fact| FactRecord {
                    statement: fact.statement.clone(),
                    asserted: fact.asserted,
                    justifications: fact.supported_by.len(),
                })
                .collect(),
            rules: self
                .rules()
                .map(|rule| RuleRecord {
                    lhs: rule.lhs.clone(),
                    rhs: rule.rhs.clone(),
                    asserted: rule.asserted,
                    justifications: rule.supported_by.len(),
                })
                .collect(),
        }
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(KbConfig::default())
    }
}
