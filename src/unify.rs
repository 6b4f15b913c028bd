//! Unification and instantiation over [`Term`]s.
//!
//! Both operations are pure: no store access, no side effects, deterministic
//! for identical inputs. The knowledge store and inference procedure treat
//! them as black boxes.

use crate::term::{Bindings, Term};

/// Unify two terms, returning the variable bindings that make them equal.
///
/// Variables may occur on either side; a variable already bound must resolve
/// to a structurally equal term for the match to succeed. A ground match
/// returns an empty binding set. `None` is a normal negative outcome, not an
/// error.
pub fn match_terms(pattern: &Term, term: &Term) -> Option<Bindings> {
    let mut bindings = Bindings::new();
    if unify_into(pattern, term, &mut bindings) {
        Some(bindings)
    } else {
        None
    }
}

fn unify_into(left: &Term, right: &Term, bindings: &mut Bindings) -> bool {
    match (left, right) {
        (Term::Atom(a), Term::Atom(b)) => a == b,
        (Term::Variable(name), other) | (other, Term::Variable(name)) => {
            bind_or_check(name, other, bindings)
        }
        (Term::Compound(xs), Term::Compound(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|(x, y)| unify_into(x, y, bindings))
        }
        _ => false,
    }
}

fn bind_or_check(name: &str, term: &Term, bindings: &mut Bindings) -> bool {
    match bindings.bound(name) {
        Some(existing) => existing == term,
        None => {
            bindings.bind(name, term.clone());
            true
        }
    }
}

/// Substitute bound variables into a template term.
///
/// Unbound variables are left in place, so instantiating a rule's remaining
/// antecedents yields a partially specialized pattern rather than an error.
pub fn instantiate(template: &Term, bindings: &Bindings) -> Term {
    match template {
        Term::Atom(_) => template.clone(),
        Term::Variable(name) => bindings
            .bound(name)
            .cloned()
            .unwrap_or_else(|| template.clone()),
        Term::Compound(items) => Term::Compound(
            items
                .iter()
                .map(|item| instantiate(item, bindings))
                .collect(),
        ),
    }
}
