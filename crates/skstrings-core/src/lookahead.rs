//! The lookahead walker: resolving "does state `p` accept sequence `s`"
//! when a state may have several arcs on the same symbol (non-deterministic
//! / lookahead automata).
//!
//! Mirrors `misc.c`'s `matchlen`/`lfindtrans`/`acceptable`.

use crate::pfsa::{Pfsa, StateId};
use crate::symbol::SymbolId;

/// The longest prefix of `s` consumable from `state`, trying every arc on
/// `s[0]`'s symbol and recursing (ties broken by whichever arc is examined
/// first).
fn matchlen(pfsa: &Pfsa, state: StateId, s: &[SymbolId]) -> u32 {
    let Some((first_sym, rest)) = s.split_first() else {
        return 0;
    };
    let Some(node) = pfsa.node(state) else {
        return 0;
    };
    let mut candidates = node.forward.iter().filter(|a| a.symbol == *first_sym);
    let Some(first) = candidates.next() else {
        return 0;
    };
    if pfsa.symbols.is_delimiter(*first_sym) {
        return 1;
    }
    let mut best = 1 + matchlen(pfsa, first.target, rest);
    for arc in candidates {
        let len = 1 + matchlen(pfsa, arc.target, rest);
        if len > best {
            best = len;
        }
    }
    best
}

/// Among all arcs from `state` on `sym`, picks the one whose target
/// maximises how much of `rest` can subsequently be consumed. Returns
/// `None` if `state` has no arc on `sym` at all.
fn lfindtrans(pfsa: &Pfsa, state: StateId, sym: SymbolId, rest: &[SymbolId]) -> Option<StateId> {
    let node = pfsa.node(state)?;
    let mut candidates = node.forward.iter().filter(|a| a.symbol == sym);
    let first = candidates.next()?;
    if pfsa.symbols.is_delimiter(sym) {
        return Some(first.target);
    }
    let mut best_target = first.target;
    let mut best_len = matchlen(pfsa, first.target, rest);
    for arc in candidates {
        let len = matchlen(pfsa, arc.target, rest);
        if len > best_len {
            best_len = len;
            best_target = arc.target;
        }
    }
    Some(best_target)
}

/// Is `seq` acceptable at `state`: walking via lookahead-resolved
/// transitions, does every symbol consume an arc?
pub fn acceptable(pfsa: &Pfsa, state: StateId, seq: &[SymbolId]) -> bool {
    let mut cur = state;
    for (i, &sym) in seq.iter().enumerate() {
        let rest = &seq[i + 1..];
        match lfindtrans(pfsa, cur, sym, rest) {
            Some(target) => cur = target,
            None => return false,
        }
    }
    true
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::pfsa::Pfsa;

    #[test]
    fn accepts_along_a_deterministic_path() {
        let mut p = Pfsa::new("\n", 256, 4096);
        let a = p.symbols.intern("a").expect("intern a");
        let delim = p.delimiter;
        p.add_arc(0, 1, a, 1).expect("add a");
        p.add_arc(1, 2, delim, 1).expect("add delim");
        assert!(acceptable(&p, 0, &[a, delim]));
        assert!(!acceptable(&p, 0, &[delim]));
    }

    #[test]
    fn lookahead_prefers_the_longer_continuation() {
        // 0 -a-> 1 -delim-> sink (dead end after 1 symbol)
        // 0 -a-> 2 -b-> 3 -delim-> sink (continues for 2 more symbols)
        let mut p = Pfsa::new("\n", 256, 4096);
        let a = p.symbols.intern("a").expect("intern a");
        let b = p.symbols.intern("b").expect("intern b");
        let delim = p.delimiter;
        p.add_arc(0, 1, a, 1).expect("add a to 1");
        p.add_arc(0, 2, a, 1).expect("add a to 2");
        p.add_arc(1, 4, delim, 1).expect("dead end delim");
        p.add_arc(2, 3, b, 1).expect("add b");
        p.add_arc(3, 5, delim, 1).expect("longer delim");
        assert!(acceptable(&p, 0, &[a, b, delim]));
    }
}
