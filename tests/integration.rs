//! End-to-end tests for the seshat knowledge base.
//!
//! These exercise the full pipeline: parsing the text notation, asserting
//! through the facade, forward chaining to a fixpoint, querying, and
//! retraction cascades over the support graph.

use seshat::infer;
use seshat::kb::{KbConfig, KnowledgeBase};
use seshat::knowledge::Knowledge;
use seshat::parse::{parse_kb, parse_line, parse_rule, parse_term};
use seshat::term::Term;

fn kb_from(lines: &[&str]) -> KnowledgeBase {
    let mut kb = KnowledgeBase::new(KbConfig::default());
    for line in lines {
        let entry = parse_line(line).expect("bad test line").expect("blank test line");
        kb.assert(entry);
    }
    kb
}

fn term(text: &str) -> Term {
    parse_term(text).expect("bad test term")
}

#[test]
fn fido_scenario() {
    let mut kb = kb_from(&[
        "fact: (isa Fido Dog)",
        "rule: ((isa ?x Dog)) -> (isa ?x Animal)",
    ]);

    // The derived conclusion answers a ground query with empty bindings.
    let answers = kb.ask(&term("(isa Fido Animal)"));
    assert_eq!(answers.len(), 1);
    assert!(answers[0].bindings.is_empty());

    // Retracting the premise cascades to the conclusion.
    kb.retract_fact(&term("(isa Fido Dog)"));
    assert!(kb.ask(&term("(isa Fido Animal)")).is_empty());
    assert_eq!(kb.fact_count(), 0);
}

#[test]
fn shared_support_survives_one_retraction() {
    let mut kb = kb_from(&[
        "rule: ((isa ?x Dog)) -> (isa ?x Pet)",
        "rule: ((isa ?x Cat)) -> (isa ?x Pet)",
        "fact: (isa Pip Dog)",
        "fact: (isa Pip Cat)",
    ]);

    let pet = term("(isa Pip Pet)");
    assert_eq!(kb.ask(&pet).len(), 1);

    kb.retract_fact(&term("(isa Pip Dog)"));
    // One justification remains, so the conclusion stays.
    assert_eq!(kb.ask(&pet).len(), 1);

    kb.retract_fact(&term("(isa Pip Cat)"));
    assert!(kb.ask(&pet).is_empty());
}

#[test]
fn grandparent_chain_and_cascade() {
    let mut kb = kb_from(&[
        "rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)",
        "fact: (parent Ann Bob)",
        "fact: (parent Bob Cid)",
        "fact: (parent Cid Dee)",
    ]);

    let answers = kb.ask(&term("(grandparent ?a ?b)"));
    let pairs: Vec<String> = answers.iter().map(|a| a.bindings.to_string()).collect();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.contains(&"{?a -> Ann, ?b -> Cid}".to_string()));
    assert!(pairs.contains(&"{?a -> Bob, ?b -> Dee}".to_string()));

    // Retracting the middle parent removes both grandparent conclusions that
    // trace through it, and the specialized rules with them.
    kb.retract_fact(&term("(parent Bob Cid)"));
    let after: Vec<_> = kb.ask(&term("(grandparent ?a ?b)"));
    assert!(after.is_empty());

    // The untouched parent facts survive.
    assert_eq!(kb.ask(&term("(parent ?x ?y)")).len(), 2);
}

#[test]
fn idempotent_assertion_keeps_graph_intact() {
    let mut kb = kb_from(&[
        "fact: (isa Fido Dog)",
        "rule: ((isa ?x Dog)) -> (isa ?x Animal)",
    ]);
    let facts_before = kb.fact_count();
    let rules_before = kb.rule_count();

    kb.assert(parse_line("fact: (isa Fido Dog)").unwrap().unwrap());
    kb.assert(parse_line("rule: ((isa ?x Dog)) -> (isa ?x Animal)").unwrap().unwrap());

    assert_eq!(kb.fact_count(), facts_before);
    assert_eq!(kb.rule_count(), rules_before);

    // A single retraction still removes the premise and its conclusion.
    kb.retract_fact(&term("(isa Fido Dog)"));
    assert!(kb.ask(&term("(isa Fido Animal)")).is_empty());
}

#[test]
fn asserted_conclusion_survives_premise_retraction() {
    let mut kb = kb_from(&[
        "rule: ((isa ?x Dog)) -> (isa ?x Animal)",
        "fact: (isa Fido Dog)",
        "fact: (isa Fido Animal)",
    ]);

    kb.retract_fact(&term("(isa Fido Dog)"));

    // Still present because it was directly asserted, now with no support.
    let animal = kb
        .facts()
        .find(|f| f.statement == term("(isa Fido Animal)"))
        .expect("asserted conclusion vanished");
    assert!(animal.asserted);
    assert!(animal.supported_by.is_empty());
}

#[test]
fn closure_soundness_at_fixpoint() {
    use seshat::store::KnowledgeStore;

    let mut store = KnowledgeStore::new(KbConfig::default());
    for line in [
        "rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)",
        "rule: ((grandparent ?x ?z)) -> (ancestor ?x ?z)",
        "fact: (parent Ann Bob)",
        "fact: (parent Bob Cid)",
    ] {
        store.add(parse_line(line).unwrap().unwrap());
    }

    let facts_before = store.fact_count();
    let rules_before = store.rule_count();

    // Re-running the inference step over every fact/rule pair in the store
    // must not produce a derivation that is not already present.
    let fact_ids: Vec<_> = store.fact_ids().collect();
    let rule_ids: Vec<_> = store.rule_ids().collect();
    for &fact_id in &fact_ids {
        for &rule_id in &rule_ids {
            infer::infer(&mut store, fact_id, rule_id);
        }
    }

    assert_eq!(store.fact_count(), facts_before);
    assert_eq!(store.rule_count(), rules_before);
}

#[test]
fn support_symmetry_holds_after_add_and_retract() {
    let mut kb = kb_from(&[
        "rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)",
        "fact: (parent Ann Bob)",
        "fact: (parent Bob Cid)",
    ]);
    assert_support_symmetry(&kb);

    kb.retract_fact(&term("(parent Ann Bob)"));
    assert_support_symmetry(&kb);
}

fn assert_support_symmetry(kb: &KnowledgeBase) {
    let store = kb.store();
    let all: Vec<_> = store.fact_ids().chain(store.rule_ids()).collect();
    for &id in &all {
        let entity = store.get(id).expect("listed entity missing");
        for justification in entity.supported_by() {
            for owner in [justification.fact, justification.rule] {
                let owner_entity = store.get(owner).expect("justification names a missing entity");
                let listed = match entity {
                    Knowledge::Fact(_) => owner_entity.supports_facts().contains(&id),
                    Knowledge::Rule(_) => owner_entity.supports_rules().contains(&id),
                };
                assert!(listed, "{owner} does not list its dependent {id}");
            }
        }
    }
}

#[test]
fn kb_file_roundtrip_through_tempfile() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("pets.kb");
    std::fs::write(
        &path,
        "# pets\n\
         fact: (isa Fido Dog)\n\
         fact: (isa Tom Cat)\n\
         rule: ((isa ?x Dog)) -> (chases ?x Tom)\n",
    )
    .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let entries = parse_kb(&text).unwrap();
    assert_eq!(entries.len(), 3);

    let mut kb = KnowledgeBase::new(KbConfig::default());
    for entry in entries {
        kb.assert(entry);
    }
    assert_eq!(kb.ask(&term("(chases Fido Tom)")).len(), 1);
}

#[test]
fn snapshot_serializes_to_json() {
    let kb = kb_from(&[
        "fact: (isa Fido Dog)",
        "rule: ((isa ?x Dog)) -> (isa ?x Animal)",
    ]);
    let json = serde_json::to_string(&kb.snapshot()).unwrap();
    assert!(json.contains("Fido"));
    assert!(json.contains("Animal"));
}

#[test]
fn rule_retraction_refusals() {
    let mut kb = kb_from(&[
        "rule: ((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)",
        "fact: (parent Ann Bob)",
        "fact: (parent Bob Cid)",
    ]);
    assert_eq!(kb.ask(&term("(grandparent Ann Cid)")).len(), 1);

    // The specialized rule is derived and still justified by its premise
    // pair, so retracting it directly is refused.
    let specialized = parse_rule("((parent Bob ?z)) -> (grandparent Ann ?z)").unwrap();
    kb.retract_rule(&specialized.lhs, &specialized.rhs);
    assert_eq!(kb.ask(&term("(grandparent Ann Cid)")).len(), 1);

    // Retracting the asserted base rule is refused outright.
    let base = parse_rule("((parent ?x ?y) (parent ?y ?z)) -> (grandparent ?x ?z)").unwrap();
    kb.retract(&Knowledge::Rule(base));
    assert_eq!(kb.rule_count(), 3); // base + two specializations
}
