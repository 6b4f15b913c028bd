//! Single-step forward chaining.
//!
//! One step unifies a fact's statement against a rule's *first* antecedent
//! only. A single-antecedent rule yields a derived fact; a longer rule yields
//! a specialized rule whose remaining antecedents are instantiated with the
//! same bindings. Full rule satisfaction emerges as specialized rules later
//! match further facts. The derived entity is inserted through
//! [`KnowledgeStore::add`], whose own counterpart sweep closes the derivation
//! transitively.

use crate::knowledge::{EntityId, Fact, Justification, Knowledge, Rule};
use crate::store::KnowledgeStore;
use crate::unify::{instantiate, match_terms};

/// Attempt one forward-chaining derivation from `fact_id` and `rule_id`.
///
/// A failed unification is a normal negative result and leaves the store
/// untouched. On success the derived entity is added to the store (merging
/// with a structurally equal entity if one exists) and registered as a
/// dependent of both the premise fact and the rule.
pub fn infer(store: &mut KnowledgeStore, fact_id: EntityId, rule_id: EntityId) {
    let (statement, lhs, rhs) = {
        let Some(Knowledge::Fact(fact)) = store.get(fact_id) else {
            return;
        };
        let Some(Knowledge::Rule(rule)) = store.get(rule_id) else {
            return;
        };
        (fact.statement.clone(), rule.lhs.clone(), rule.rhs.clone())
    };

    let Some(first) = lhs.first() else {
        return;
    };
    let Some(bindings) = match_terms(&statement, first) else {
        return;
    };

    let consequent = instantiate(&rhs, &bindings);
    let justification = Justification {
        fact: fact_id,
        rule: rule_id,
    };

    let dependent = if lhs.len() == 1 {
        if store.config().trace_derivations {
            tracing::debug!(premise = %statement, derived = %consequent, "derived fact");
        }
        store.add(Knowledge::Fact(Fact::derived(consequent, justification)))
    } else {
        let remaining: Vec<_> = lhs[1..]
            .iter()
            .map(|antecedent| instantiate(antecedent, &bindings))
            .collect();
        if store.config().trace_derivations {
            tracing::debug!(premise = %statement, consequent = %consequent, "specialized rule");
        }
        store.add(Knowledge::Rule(Rule::derived(remaining, consequent, justification)))
    };

    store.register_support(justification, dependent);
}
