//! The k-string enumerator and the driver-owned cache over it.
//!
//! Mirrors `skstr.c`'s `get_kstrList`/`addstring`/`get_sorted_kstrList`, with
//! the integer probability space (ten-thousandths of a percent, scale
//! `100 * PREC`) preserved exactly per SPEC_FULL §9, and growable `Vec`s in
//! place of the original's fixed `MAXSTR`-sized array (the cap itself is
//! still enforced and still fatal on overflow).

use std::collections::HashMap;

use crate::error::CoreError;
use crate::pfsa::{Pfsa, StateId};
use crate::symbol::SymbolId;

/// Fixed-point probability unit: ten-thousandths of a percent. The full
/// probability space is `100 * PREC`.
pub const PREC: u64 = 1000;

/// The probability mass of a fully-certain event, in [`PREC`] units.
pub const FULL_PROB: u64 = 100 * PREC;

/// A single delimited symbol sequence with its accumulated probability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KString {
    pub symbols: Vec<SymbolId>,
    pub prob: u64,
}

/// Which secondary/primary sort the caller needs: probability-ordered
/// heuristics (`and`, `or`) sort by probability descending with sequence as
/// the tiebreak; aligned-pair heuristics (`lax`, `strict`, `xentropic`,
/// `vardist`) sort by sequence lexicographically with probability as the
/// tiebreak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    ProbDesc,
    SeqLex,
}

fn sort_kstrings(list: &mut [KString], order: SortOrder) {
    match order {
        SortOrder::ProbDesc => {
            list.sort_by(|a, b| b.prob.cmp(&a.prob).then_with(|| a.symbols.cmp(&b.symbols)));
        }
        SortOrder::SeqLex => {
            list.sort_by(|a, b| a.symbols.cmp(&b.symbols).then_with(|| b.prob.cmp(&a.prob)));
        }
    }
}

/// Appends `(seq, prob)`, coalescing into the previous entry if it carries
/// the identical symbol sequence (adjacency coalescing per §4.2). Errors
/// when appending a genuinely new entry would exceed `cap`.
fn add_string(out: &mut Vec<KString>, seq: Vec<SymbolId>, prob: u64, cap: usize) -> Result<(), CoreError> {
    if let Some(last) = out.last_mut() {
        if last.symbols == seq {
            last.prob += prob;
            return Ok(());
        }
    }
    if out.len() >= cap {
        return Err(CoreError::EnumeratorOverflow { state: 0, cap });
    }
    out.push(KString { symbols: seq, prob });
    Ok(())
}

fn enumerate(
    pfsa: &Pfsa,
    state: StateId,
    seq: &mut Vec<SymbolId>,
    acc_prob: u64,
    budget: u32,
    minprob: u64,
    cap: usize,
    out: &mut Vec<KString>,
) -> Result<(), CoreError> {
    if budget == 0 {
        return Ok(());
    }
    let Some(node) = pfsa.node(state) else {
        return Ok(());
    };
    if node.ntrans == 0 {
        return Ok(());
    }
    for arc in &node.forward {
        let newprob = (u128::from(acc_prob) * u128::from(arc.freq) / u128::from(node.ntrans)) as u64;
        if newprob < minprob {
            // Forward list is symbol-sorted but not probability-sorted in
            // general; the original's early `return` here is a deliberate
            // O(branches) pruning heuristic, not a correctness guarantee
            // that every later arc is also below the floor. We preserve the
            // exact behaviour: abandon the rest of this node's arc list.
            break;
        }
        seq.push(arc.symbol);
        if pfsa.symbols.is_delimiter(arc.symbol) {
            add_string(out, seq.clone(), newprob, cap)?;
        } else {
            enumerate(pfsa, arc.target, seq, newprob, budget - 1, minprob, cap, out)?;
        }
        seq.pop();
    }
    Ok(())
}

/// Computes the unsorted k-string multiset reachable from `state` within
/// `k` symbol transitions, pruning any branch whose running probability
/// drops below `minprob`, and capping at `cap` entries (a fatal
/// [`CoreError::EnumeratorOverflow`] past that).
pub fn get_k_strings(
    pfsa: &Pfsa,
    state: StateId,
    k: u32,
    minprob: u64,
    cap: usize,
) -> Result<Vec<KString>, CoreError> {
    let mut out = Vec::new();
    let mut seq = Vec::new();
    enumerate(pfsa, state, &mut seq, FULL_PROB, k, minprob, cap, &mut out)
        .map_err(|e| match e {
            CoreError::EnumeratorOverflow { cap, .. } => {
                CoreError::EnumeratorOverflow { state, cap }
            }
            other => other,
        })?;
    Ok(out)
}

/// Computes and sorts the k-string list for `state` according to `order`.
pub fn get_sorted_k_strings(
    pfsa: &Pfsa,
    state: StateId,
    k: u32,
    minprob: u64,
    cap: usize,
    order: SortOrder,
) -> Result<Vec<KString>, CoreError> {
    let mut list = get_k_strings(pfsa, state, k, minprob, cap)?;
    sort_kstrings(&mut list, order);
    Ok(list)
}

/// Driver-owned cache of per-state sorted k-string lists. All entries share
/// the same `k`, `minprob`, `cap`, and sort order, fixed at construction
/// (they come from one `DriverConfig` for the lifetime of a run).
#[derive(Debug, Clone)]
pub struct KStringCache {
    k: u32,
    minprob: u64,
    cap: usize,
    order: SortOrder,
    entries: HashMap<StateId, Vec<KString>>,
}

impl KStringCache {
    pub fn new(k: u32, minprob: u64, cap: usize, order: SortOrder) -> Self {
        KStringCache { k, minprob, cap, order, entries: HashMap::new() }
    }

    /// Returns the cached list for `state`, computing and storing it first
    /// if absent.
    pub fn get(&mut self, pfsa: &Pfsa, state: StateId) -> Result<&[KString], CoreError> {
        if !self.entries.contains_key(&state) {
            let list = get_sorted_k_strings(pfsa, state, self.k, self.minprob, self.cap, self.order)?;
            self.entries.insert(state, list);
        }
        Ok(self
            .entries
            .get(&state)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Discards just `state`'s entry (used when a merge's absorbed state is
    /// indistinguishable from its partner, per §4.3 — upstream entries are
    /// provably unaffected).
    pub fn discard(&mut self, state: StateId) {
        self.entries.remove(&state);
    }

    /// Discards every cached entry (used after any merge that is not
    /// indistinguishable).
    pub fn flush(&mut self) {
        self.entries.clear();
    }
}

/// Two states are indistinguishable iff their full k-string lists (same
/// `k`/`minprob`/order) are identical in length, sequence, and probability.
/// When this holds, merging one into the other cannot change any string
/// distribution anywhere in the graph, so upstream cache entries stay valid.
pub fn indistinguishable(
    pfsa: &Pfsa,
    p1: StateId,
    p2: StateId,
    k: u32,
    minprob: u64,
    cap: usize,
) -> Result<bool, CoreError> {
    let a = get_sorted_k_strings(pfsa, p1, k, minprob, cap, SortOrder::SeqLex)?;
    let b = get_sorted_k_strings(pfsa, p2, k, minprob, cap, SortOrder::SeqLex)?;
    Ok(a == b)
}
