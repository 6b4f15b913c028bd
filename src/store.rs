//! Arena-backed container for facts and rules.
//!
//! Dual-indexed: insertion-order handle lists give deterministic iteration
//! (counterpart sweeps and queries run in insertion order), while content
//! indices give O(1) structural-equality lookup. All mutation goes through
//! handles resolved first; the store never compares or mutates transient
//! copies of an entity that is already present.

use std::collections::HashMap;

use crate::infer;
use crate::kb::KbConfig;
use crate::knowledge::{EntityId, Fact, Justification, Knowledge, Rule};
use crate::term::Term;

/// The container of all current facts and rules.
///
/// `add` implements the merge-or-insert policy and triggers the forward
/// chaining sweep for newly inserted entities; `remove` is a low-level delete
/// that leaves support-graph bookkeeping to the retraction procedure.
#[derive(Debug)]
pub struct KnowledgeStore {
    config: KbConfig,
    entities: HashMap<EntityId, Knowledge>,
    /// Fact handles in insertion order.
    fact_order: Vec<EntityId>,
    /// Rule handles in insertion order.
    rule_order: Vec<EntityId>,
    /// Structural lookup: statement -> fact handle.
    fact_index: HashMap<Term, EntityId>,
    /// Structural lookup: (lhs, rhs) -> rule handle.
    rule_index: HashMap<(Vec<Term>, Term), EntityId>,
    next_id: u64,
}

impl KnowledgeStore {
    /// Create an empty store.
    pub fn new(config: KbConfig) -> Self {
        Self {
            config,
            entities: HashMap::new(),
            fact_order: Vec::new(),
            rule_order: Vec::new(),
            fact_index: HashMap::new(),
            rule_index: HashMap::new(),
            next_id: 1,
        }
    }

    /// The configuration this store was built with.
    pub fn config(&self) -> &KbConfig {
        &self.config
    }

    fn alloc_id(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id).expect("entity id overflow");
        self.next_id += 1;
        id
    }

    // -----------------------------------------------------------------------
    // Merge-or-insert
    // -----------------------------------------------------------------------

    /// Add an entity: merge into a structurally equal existing entity, or
    /// insert and sweep the counterparts for derivations.
    ///
    /// Merge policy: an incoming entity carrying justification pairs appends
    /// them to the existing entity (independent justifications accumulate);
    /// an incoming entity without pairs is a direct assertion and marks the
    /// existing entity asserted. Inference is not re-run on merge — the
    /// existing entity already swept its counterparts when first inserted.
    ///
    /// Returns the handle of the stored entity (new or existing).
    pub fn add(&mut self, knowledge: Knowledge) -> EntityId {
        match knowledge {
            Knowledge::Fact(fact) => self.add_fact(fact),
            Knowledge::Rule(rule) => self.add_rule(rule),
        }
    }

    fn add_fact(&mut self, fact: Fact) -> EntityId {
        if let Some(id) = self.fact_index.get(&fact.statement).copied() {
            self.merge(id, fact.supported_by);
            return id;
        }

        let id = self.alloc_id();
        self.fact_index.insert(fact.statement.clone(), id);
        self.fact_order.push(id);
        self.entities.insert(id, Knowledge::Fact(fact));

        // Sweep every rule present at insertion time. Rules derived during
        // the sweep run their own sweep over the facts present then, so the
        // fixpoint set does not depend on this snapshot.
        let rules = self.rule_order.clone();
        for rule_id in rules {
            infer::infer(self, id, rule_id);
        }
        id
    }

    fn add_rule(&mut self, rule: Rule) -> EntityId {
        let key = (rule.lhs.clone(), rule.rhs.clone());
        if let Some(id) = self.rule_index.get(&key).copied() {
            self.merge(id, rule.supported_by);
            return id;
        }

        let id = self.alloc_id();
        self.rule_index.insert(key, id);
        self.rule_order.push(id);
        self.entities.insert(id, Knowledge::Rule(rule));

        let facts = self.fact_order.clone();
        for fact_id in facts {
            infer::infer(self, fact_id, id);
        }
        id
    }

    fn merge(&mut self, id: EntityId, incoming: Vec<Justification>) {
        let existing = self.entity_mut(id);
        if incoming.is_empty() {
            existing.set_asserted();
        } else {
            existing.supported_by_mut().extend(incoming);
        }
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Resolve an entity to its stored handle by structural equality on
    /// logical content; bookkeeping fields are ignored.
    pub fn lookup(&self, knowledge: &Knowledge) -> Option<EntityId> {
        match knowledge {
            Knowledge::Fact(fact) => self.lookup_fact(&fact.statement),
            Knowledge::Rule(rule) => self.lookup_rule(&rule.lhs, &rule.rhs),
        }
    }

    /// Look up a fact handle by statement.
    pub fn lookup_fact(&self, statement: &Term) -> Option<EntityId> {
        self.fact_index.get(statement).copied()
    }

    /// Look up a rule handle by antecedents and consequent.
    pub fn lookup_rule(&self, lhs: &[Term], rhs: &Term) -> Option<EntityId> {
        self.rule_index.get(&(lhs.to_vec(), rhs.clone())).copied()
    }

    /// Get an entity by handle.
    pub fn get(&self, id: EntityId) -> Option<&Knowledge> {
        self.entities.get(&id)
    }

    /// Get a mutable entity by handle.
    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Knowledge> {
        self.entities.get_mut(&id)
    }

    /// Get an entity known to be present. A missing handle is a broken
    /// support-graph invariant, not a runtime condition.
    pub(crate) fn entity(&self, id: EntityId) -> &Knowledge {
        self.entities.get(&id).expect("dangling entity handle")
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> &mut Knowledge {
        self.entities.get_mut(&id).expect("dangling entity handle")
    }

    /// Fact handles in insertion order.
    pub fn fact_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.fact_order.iter().copied()
    }

    /// Rule handles in insertion order.
    pub fn rule_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.rule_order.iter().copied()
    }

    /// Number of facts currently stored.
    pub fn fact_count(&self) -> usize {
        self.fact_order.len()
    }

    /// Number of rules currently stored.
    pub fn rule_count(&self) -> usize {
        self.rule_order.len()
    }

    // -----------------------------------------------------------------------
    // Support bookkeeping
    // -----------------------------------------------------------------------

    /// Record `dependent` in the dependent lists of both members of its
    /// justification pair, keeping the bidirectional link invariant.
    pub(crate) fn register_support(&mut self, justification: Justification, dependent: EntityId) {
        let dependent_is_fact = matches!(self.entity(dependent), Knowledge::Fact(_));
        for owner in [justification.fact, justification.rule] {
            let entity = self.entity_mut(owner);
            let list = if dependent_is_fact {
                entity.supports_facts_mut()
            } else {
                entity.supports_rules_mut()
            };
            if !list.contains(&dependent) {
                list.push(dependent);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Delete an entity from the collection and its indices.
    ///
    /// Support-graph bookkeeping is the retraction procedure's job; callers
    /// outside it must not use this directly or the bidirectional link
    /// invariant breaks.
    pub(crate) fn remove(&mut self, id: EntityId) {
        let Some(entity) = self.entities.remove(&id) else {
            return;
        };
        match entity {
            Knowledge::Fact(fact) => {
                self.fact_index.remove(&fact.statement);
                self.fact_order.retain(|&fid| fid != id);
            }
            Knowledge::Rule(rule) => {
                self.rule_index.remove(&(rule.lhs, rule.rhs));
                self.rule_order.retain(|&rid| rid != id);
            }
        }
    }
}
