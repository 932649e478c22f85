//! The merge operator and its structural test, `mealy_merge_test`.

use super::{Arc, Node, Pfsa, ReverseArc, StateId};
use crate::symbol::SymbolId;

/// Destructively merges `p2` into `p1`. After this call `p2` no longer
/// exists; every arc that referenced it now references `p1`. A no-op when
/// `p1 == p2`.
///
/// Mirrors `misc.c`'s `merge()`: rewrite every arc pointing at `p2` across
/// the whole graph, splice `p2`'s own forward/reverse/merge-history lists
/// into `p1`, then coalesce any `(symbol, target)` duplicates the rewrite
/// introduced anywhere in the graph.
pub fn merge(pfsa: &mut Pfsa, p1: StateId, p2: StateId) {
    if p1 == p2 {
        return;
    }

    for slot in pfsa.nodes.iter_mut().flatten() {
        for arc in &mut slot.forward {
            if arc.target == p2 {
                arc.target = p1;
            }
        }
        for arc in &mut slot.reverse {
            if arc.source == p2 {
                arc.source = p1;
            }
        }
    }

    let Some(removed) = pfsa.nodes.get_mut(p2 as usize).and_then(Option::take) else {
        return;
    };
    pfsa.state_count -= 1;
    if pfsa.max_state == Some(p2) {
        pfsa.max_state = pfsa.nodes.iter().flatten().map(|n| n.state).max();
    }

    {
        let Some(target) = pfsa.nodes.get_mut(p1 as usize).and_then(Option::as_mut) else {
            return;
        };
        splice_history(target, p2, &removed.merge_history);
        target.forward.extend(removed.forward);
        target.reverse.extend(removed.reverse);
        target.ntrans += removed.ntrans;
        target.nvisits += removed.nvisits;
    }

    let mut removed_non_delim: u64 = 0;
    for slot in pfsa.nodes.iter_mut().flatten() {
        removed_non_delim += coalesce_forward(slot, pfsa.delimiter);
        coalesce_reverse(slot);
        slot.nsymbols = count_distinct_symbols(&slot.forward);
    }
    pfsa.non_delim_arcs = pfsa.non_delim_arcs.saturating_sub(removed_non_delim);
}

/// Merges `p2`'s `{p2} ∪ p2.merge_history` into `p1`'s merge-history, kept
/// sorted with no duplicates and never containing `p1.state` itself.
fn splice_history(p1: &mut Node, p2_state: StateId, p2_history: &[StateId]) {
    let mut incoming: Vec<StateId> = Vec::with_capacity(p2_history.len() + 1);
    incoming.push(p2_state);
    incoming.extend_from_slice(p2_history);

    let mut merged = std::mem::take(&mut p1.merge_history);
    merged.extend(incoming);
    merged.retain(|&s| s != p1.state);
    merged.sort_unstable();
    merged.dedup();
    p1.merge_history = merged;
}

/// Sorts `node.forward` by `(symbol, target)` and coalesces adjacent
/// duplicates by summing frequency. Returns the number of non-delimiter
/// duplicates removed (for the header's non-delim-arc count).
fn coalesce_forward(node: &mut Node, delimiter: SymbolId) -> u64 {
    node.forward.sort_by_key(|a| (a.symbol, a.target));
    let mut removed = 0u64;
    let mut write = 0usize;
    for read in 0..node.forward.len() {
        let arc = node.forward[read];
        if write > 0 {
            let prev: &mut Arc = &mut node.forward[write - 1];
            if prev.symbol == arc.symbol && prev.target == arc.target {
                prev.freq += arc.freq;
                if arc.symbol != delimiter {
                    removed += 1;
                }
                continue;
            }
        }
        node.forward[write] = arc;
        write += 1;
    }
    node.forward.truncate(write);
    removed
}

/// Sorts `node.reverse` by `(symbol, source)` and coalesces adjacent
/// duplicates by summing frequency.
fn coalesce_reverse(node: &mut Node) {
    node.reverse.sort_by_key(|a| (a.symbol, a.source));
    let mut write = 0usize;
    for read in 0..node.reverse.len() {
        let arc = node.reverse[read];
        if write > 0 {
            let prev: &mut ReverseArc = &mut node.reverse[write - 1];
            if prev.symbol == arc.symbol && prev.source == arc.source {
                prev.freq += arc.freq;
                continue;
            }
        }
        node.reverse[write] = arc;
        write += 1;
    }
    node.reverse.truncate(write);
}

fn count_distinct_symbols(forward: &[Arc]) -> u32 {
    let mut count = 0u32;
    let mut last: Option<SymbolId> = None;
    for arc in forward {
        if last != Some(arc.symbol) {
            count += 1;
            last = Some(arc.symbol);
        }
    }
    count
}

/// Clones `p`, merges the clones of `q` and `r` in the copy, and returns it,
/// leaving the original untouched. Mirrors `misc.c`'s `mergecopy()`.
pub fn merge_copy(p: &Pfsa, q: StateId, r: StateId) -> Pfsa {
    let mut clone = super::structural::copy(p);
    merge(&mut clone, q, r);
    clone
}

/// Returns `true` iff merging `p1` and `p2` yields a deterministic (Mealy)
/// automaton: walking both forward lists in sorted-symbol lockstep, any
/// shared symbol must agree on target, or target the `{p1, p2}` pair
/// (which collapses to a self-loop post-merge).
pub fn mealy_merge_test(pfsa: &Pfsa, p1: StateId, p2: StateId) -> bool {
    if p1 == p2 {
        return true;
    }
    let (Some(n1), Some(n2)) = (pfsa.node(p1), pfsa.node(p2)) else {
        return true;
    };
    let (mut i, mut j) = (0usize, 0usize);
    while i < n1.forward.len() && j < n2.forward.len() {
        let a = n1.forward[i];
        let b = n2.forward[j];
        match a.symbol.cmp(&b.symbol) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                let reflexive = (a.target == p1 && b.target == p2) || (a.target == p2 && b.target == p1);
                if a.target != b.target && !reflexive {
                    return false;
                }
                i += 1;
                j += 1;
            }
        }
    }
    true
}
