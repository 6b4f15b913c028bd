//! Justification-driven retraction.
//!
//! Removing an entity walks the support graph outward and deletes every
//! dependent whose last justification traced through it, while leaving
//! anything independently justified or directly asserted in place. The
//! cascade runs on an explicit worklist so a deep derivation chain cannot
//! exhaust the call stack.
//!
//! Refusal rules at the entry point (all silent, none are errors):
//!
//! - a handle that no longer resolves to a stored entity: no-op;
//! - an asserted fact that still carries derivation support: untouched
//!   (retracting the specific justification is out of scope here);
//! - an asserted rule: untouched, regardless of support;
//! - a derived entity whose own support list is non-empty: untouched. This
//!   entry point never strips the target's own justifications, so such an
//!   entity cannot be removed through it. A known limitation, kept
//!   deliberately.

use std::collections::{HashSet, VecDeque};

use crate::knowledge::{EntityId, Justification, Knowledge};
use crate::store::KnowledgeStore;

/// Retract an entity, cascading through everything it solely supported.
pub fn retract(store: &mut KnowledgeStore, target: EntityId) {
    let Some(entity) = store.get(target) else {
        return;
    };
    match entity {
        Knowledge::Fact(fact) => {
            // Covers both refusals: asserted with live support, and derived
            // with live support.
            if !fact.supported_by.is_empty() {
                return;
            }
        }
        Knowledge::Rule(rule) => {
            if rule.asserted || !rule.supported_by.is_empty() {
                return;
            }
        }
    }
    cascade(store, target);
}

/// Worklist cascade. Every queued entity has an empty support list and is
/// cleared for deletion; processing it strips the justification pairs it
/// participates in from each dependent, detaches the pair partner's
/// back-reference, and queues dependents that drained to empty — unless they
/// are directly asserted, which protects them from cascade removal.
fn cascade(store: &mut KnowledgeStore, root: EntityId) {
    let mut queue: VecDeque<EntityId> = VecDeque::new();
    let mut visited: HashSet<EntityId> = HashSet::new();
    queue.push_back(root);
    visited.insert(root);

    while let Some(current) = queue.pop_front() {
        let dependents: Vec<EntityId> = match store.get(current) {
            Some(entity) => entity
                .supports_facts()
                .iter()
                .chain(entity.supports_rules().iter())
                .copied()
                .collect(),
            None => Vec::new(),
        };

        for dependent in dependents {
            let Some(entity) = store.get(dependent) else {
                continue;
            };
            let stripped: Vec<Justification> = entity
                .supported_by()
                .iter()
                .copied()
                .filter(|justification| justification.mentions(current))
                .collect();
            if stripped.is_empty() {
                continue;
            }
            let dependent_is_fact = matches!(entity, Knowledge::Fact(_));

            let remaining: Vec<Justification> = {
                let list = store.entity_mut(dependent).supported_by_mut();
                list.retain(|justification| !justification.mentions(current));
                list.clone()
            };

            // The pair dissolves on both sides: the partner that co-justified
            // this dependent forgets it too, unless another surviving pair
            // still ties them together.
            for justification in &stripped {
                let partner = justification.partner_of(current);
                if remaining.iter().any(|j| j.mentions(partner)) {
                    continue;
                }
                if let Some(partner_entity) = store.get_mut(partner) {
                    let list = if dependent_is_fact {
                        partner_entity.supports_facts_mut()
                    } else {
                        partner_entity.supports_rules_mut()
                    };
                    list.retain(|&id| id != dependent);
                }
            }

            let entity = store.entity(dependent);
            if entity.supported_by().is_empty()
                && !entity.is_asserted()
                && visited.insert(dependent)
            {
                queue.push_back(dependent);
            }
        }

        if store.config().trace_derivations {
            if let Some(entity) = store.get(current) {
                tracing::debug!(entity = %entity, "retracting");
            }
        }
        store.remove(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kb::KbConfig;
    use crate::knowledge::{Fact, Rule};
    use crate::term::Term;

    fn store() -> KnowledgeStore {
        KnowledgeStore::new(KbConfig::default())
    }

    fn stmt(parts: &[&str]) -> Term {
        Term::compound(
            parts
                .iter()
                .map(|p| match p.strip_prefix('?') {
                    Some(name) => Term::variable(name),
                    None => Term::atom(*p),
                })
                .collect(),
        )
    }

    fn dog_rule() -> Rule {
        Rule::asserted(vec![stmt(&["isa", "?x", "Dog"])], stmt(&["isa", "?x", "Animal"]))
    }

    #[test]
    fn retracting_unsupported_asserted_fact_removes_it() {
        let mut store = store();
        let id = store.add(Fact::asserted(stmt(&["isa", "Fido", "Dog"])).into());
        retract(&mut store, id);
        assert!(store.get(id).is_none());
        assert_eq!(store.fact_count(), 0);
    }

    #[test]
    fn cascade_removes_solely_supported_dependents() {
        let mut store = store();
        store.add(dog_rule().into());
        let premise = store.add(Fact::asserted(stmt(&["isa", "Fido", "Dog"])).into());
        assert!(store.lookup_fact(&stmt(&["isa", "Fido", "Animal"])).is_some());

        retract(&mut store, premise);
        assert!(store.lookup_fact(&stmt(&["isa", "Fido", "Dog"])).is_none());
        assert!(store.lookup_fact(&stmt(&["isa", "Fido", "Animal"])).is_none());
    }

    #[test]
    fn deep_chain_cascades_to_the_end() {
        let mut store = store();
        for hop in 0..8u32 {
            store.add(
                Rule::asserted(
                    vec![stmt(&[&format!("p{hop}"), "?x"])],
                    stmt(&[&format!("p{}", hop + 1), "?x"]),
                )
                .into(),
            );
        }
        let seed = store.add(Fact::asserted(stmt(&["p0", "a"])).into());
        assert_eq!(store.fact_count(), 9);

        retract(&mut store, seed);
        assert_eq!(store.fact_count(), 0);
        assert_eq!(store.rule_count(), 8);
    }

    #[test]
    fn alternative_justification_survives() {
        let mut store = store();
        store.add(dog_rule().into());
        store.add(
            Rule::asserted(vec![stmt(&["isa", "?x", "Puppy"])], stmt(&["isa", "?x", "Animal"]))
                .into(),
        );
        let dog = store.add(Fact::asserted(stmt(&["isa", "Fido", "Dog"])).into());
        store.add(Fact::asserted(stmt(&["isa", "Fido", "Puppy"])).into());

        let derived = store.lookup_fact(&stmt(&["isa", "Fido", "Animal"])).unwrap();
        assert_eq!(store.entity(derived).supported_by().len(), 2);

        retract(&mut store, dog);
        let entity = store.entity(derived);
        assert_eq!(entity.supported_by().len(), 1);
        assert!(store.lookup_fact(&stmt(&["isa", "Fido", "Animal"])).is_some());
    }

    #[test]
    fn asserted_dependent_survives_cascade() {
        let mut store = store();
        let rule = store.add(dog_rule().into());
        let premise = store.add(Fact::asserted(stmt(&["isa", "Fido", "Dog"])).into());
        // The derived conclusion is also asserted directly.
        store.add(Fact::asserted(stmt(&["isa", "Fido", "Animal"])).into());

        let derived = store.lookup_fact(&stmt(&["isa", "Fido", "Animal"])).unwrap();
        assert!(store.entity(derived).is_asserted());
        assert_eq!(store.entity(derived).supported_by().len(), 1);

        retract(&mut store, premise);
        let entity = store.entity(derived);
        assert!(entity.is_asserted());
        assert!(entity.supported_by().is_empty());
        // The rule's dependent list no longer mentions the survivor.
        assert!(!store.entity(rule).supports_facts().contains(&derived));
    }

    #[test]
    fn shared_rule_keeps_surviving_pair_symmetric() {
        let mut store = store();
        // Two premises derive the same conclusion through the same rule, so
        // the rule co-justifies it via two pairs.
        let rule = store.add(
            Rule::asserted(vec![stmt(&["likes", "?x", "Fido"])], stmt(&["popular", "Fido"]))
                .into(),
        );
        let ann = store.add(Fact::asserted(stmt(&["likes", "Ann", "Fido"])).into());
        store.add(Fact::asserted(stmt(&["likes", "Bob", "Fido"])).into());

        let popular = store.lookup_fact(&stmt(&["popular", "Fido"])).unwrap();
        assert_eq!(store.entity(popular).supported_by().len(), 2);

        retract(&mut store, ann);
        // One pair survives, and the rule still lists its dependent.
        assert_eq!(store.entity(popular).supported_by().len(), 1);
        assert!(store.entity(rule).supports_facts().contains(&popular));

        let bob = store.lookup_fact(&stmt(&["likes", "Bob", "Fido"])).unwrap();
        retract(&mut store, bob);
        assert!(store.get(popular).is_none());
        assert!(!store.entity(rule).supports_facts().contains(&popular));
    }

    #[test]
    fn asserted_fact_with_support_is_refused() {
        let mut store = store();
        store.add(dog_rule().into());
        store.add(Fact::asserted(stmt(&["isa", "Fido", "Dog"])).into());
        store.add(Fact::asserted(stmt(&["isa", "Fido", "Animal"])).into());

        let target = store.lookup_fact(&stmt(&["isa", "Fido", "Animal"])).unwrap();
        retract(&mut store, target);
        assert!(store.get(target).is_some());
    }

    #[test]
    fn asserted_rule_is_refused() {
        let mut store = store();
        let rule = store.add(dog_rule().into());
        store.add(Fact::asserted(stmt(&["isa", "Fido", "Dog"])).into());

        retract(&mut store, rule);
        assert!(store.get(rule).is_some());
        assert!(store.lookup_fact(&stmt(&["isa", "Fido", "Animal"])).is_some());
    }

    #[test]
    fn supported_derived_entity_is_untouched() {
        let mut store = store();
        store.add(dog_rule().into());
        store.add(Fact::asserted(stmt(&["isa", "Fido", "Dog"])).into());

        let derived = store.lookup_fact(&stmt(&["isa", "Fido", "Animal"])).unwrap();
        retract(&mut store, derived);
        // Still justified by the premise, so the call does nothing.
        assert!(store.get(derived).is_some());
    }

    #[test]
    fn retracting_missing_handle_is_a_no_op() {
        let mut store = store();
        let id = store.add(Fact::asserted(stmt(&["p", "a"])).into());
        store.remove(id);
        retract(&mut store, id);
        assert_eq!(store.fact_count(), 0);
    }

    #[test]
    fn specialized_rules_fall_with_their_premise() {
        let mut store = store();
        store.add(
            Rule::asserted(
                vec![stmt(&["parent", "?x", "?y"]), stmt(&["parent", "?y", "?z"])],
                stmt(&["grandparent", "?x", "?z"]),
            )
            .into(),
        );
        let ann_bob = store.add(Fact::asserted(stmt(&["parent", "Ann", "Bob"])).into());
        store.add(Fact::asserted(stmt(&["parent", "Bob", "Cid"])).into());

        assert!(store.lookup_fact(&stmt(&["grandparent", "Ann", "Cid"])).is_some());

        retract(&mut store, ann_bob);
        // The specialized rule and the conclusion both depended on Ann->Bob.
        assert!(
            store
                .lookup_rule(&[stmt(&["parent", "Bob", "?z"])], &stmt(&["grandparent", "Ann", "?z"]))
                .is_none()
        );
        assert!(store.lookup_fact(&stmt(&["grandparent", "Ann", "Cid"])).is_none());
        // The other parent fact was asserted and survives.
        assert!(store.lookup_fact(&stmt(&["parent", "Bob", "Cid"])).is_some());
    }
}
