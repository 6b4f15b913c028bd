//! # seshat
//!
//! A forward-chaining knowledge base with justification-based truth
//! maintenance. Every derived fact or rule records the `[premise fact, rule]`
//! pair that produced it; retracting a premise cascades through the support
//! graph and removes exactly the knowledge that lost its last justification,
//! leaving independently supported and directly asserted entities in place.
//!
//! ## Architecture
//!
//! - **Terms** (`term`, `unify`): s-expression statements, variables, and
//!   binding sets, with pure unification and instantiation
//! - **Knowledge entities** (`knowledge`): facts and rules with support
//!   bookkeeping, addressed by arena handles
//! - **Store** (`store`): dual-indexed container with the merge-or-insert
//!   policy and the counterpart sweep
//! - **Inference** (`infer`): single-step forward chaining against a rule's
//!   first antecedent
//! - **Retraction** (`retract`): worklist cascade over the support graph
//! - **Facade** (`kb`): assert / retract / ask, configuration, JSON snapshots
//! - **Notation** (`parse`): the `fact:` / `rule:` file format
//!
//! ## Library usage
//!
//! ```
//! use seshat::kb::{KbConfig, KnowledgeBase};
//! use seshat::parse;
//!
//! let mut kb = KnowledgeBase::new(KbConfig::default());
//! for line in [
//!     "fact: (isa Fido Dog)",
//!     "rule: ((isa ?x Dog)) -> (isa ?x Animal)",
//! ] {
//!     kb.assert(parse::parse_line(line).unwrap().unwrap());
//! }
//!
//! let query = parse::parse_term("(isa Fido Animal)").unwrap();
//! assert_eq!(kb.ask(&query).len(), 1);
//!
//! let premise = parse::parse_term("(isa Fido Dog)").unwrap();
//! kb.retract_fact(&premise);
//! assert!(kb.ask(&query).is_empty());
//! ```

pub mod error;
pub mod infer;
pub mod kb;
pub mod knowledge;
pub mod parse;
pub mod retract;
pub mod store;
pub mod term;
pub mod unify;
