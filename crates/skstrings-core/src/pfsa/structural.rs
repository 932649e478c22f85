//! `copy`, `trim`, `renumber`, `bf_renumber`, and the two structural
//! equivalence predicates.

use std::collections::VecDeque;

use super::{Node, Pfsa, StateId};

/// Two-pass deep clone: since this crate addresses nodes by [`StateId`]
/// rather than pointer, the "id -> new-node table" of the original's
/// two-pass `copypfsa()` collapses to cloning the arena directly — every
/// arc and merge-history entry already refers to nodes by the same id space
/// the clone will use, so nothing needs rewiring.
pub fn copy(pfsa: &Pfsa) -> Pfsa {
    pfsa.clone()
}

/// Removes every arc with frequency zero, and every node left with no
/// outgoing arcs as a result. Decrements the header's non-delimiter-arc
/// count for each zero-frequency non-delimiter arc removed.
pub fn trim(pfsa: &mut Pfsa) {
    let delimiter = pfsa.delimiter;
    let mut removed_non_delim = 0u64;
    let mut to_delete = Vec::new();

    for slot in pfsa.nodes.iter_mut().flatten() {
        slot.forward.retain(|a| {
            let keep = a.freq != 0;
            if !keep && a.symbol != delimiter {
                removed_non_delim += 1;
            }
            keep
        });
        if slot.forward.is_empty() {
            to_delete.push(slot.state);
        }
    }
    pfsa.non_delim_arcs = pfsa.non_delim_arcs.saturating_sub(removed_non_delim);

    for state in to_delete {
        pfsa.release_node(state);
    }

    // A node whose only inbound arcs came from a trimmed neighbour keeps a
    // stale reverse entry; rebuild reverse lists for consistency since trim
    // does not otherwise touch reverse list contents.
    rebuild_reverse_lists(pfsa);
}

fn rebuild_reverse_lists(pfsa: &mut Pfsa) {
    let forward: Vec<(StateId, super::Arc)> = pfsa
        .nodes
        .iter()
        .flatten()
        .flat_map(|n| n.forward.iter().map(move |a| (n.state, *a)))
        .collect();
    for slot in pfsa.nodes.iter_mut().flatten() {
        slot.reverse.clear();
    }
    for (source, arc) in forward {
        if let Some(target) = pfsa.nodes.get_mut(arc.target as usize).and_then(Option::as_mut) {
            target.reverse.push(super::ReverseArc { symbol: arc.symbol, source, freq: arc.freq });
        }
    }
    for slot in pfsa.nodes.iter_mut().flatten() {
        slot.reverse.sort_by_key(|a| (a.symbol, a.source));
    }
}

/// Assigns sequential ids `0, 1, 2, ...` to nodes in their current list
/// order (ascending state id), rewriting every arc target/source and
/// merge-history entry to match, and updates the header's max.
pub fn renumber(pfsa: &mut Pfsa) {
    let old_states = pfsa.states();
    let max_old = old_states.iter().copied().max().map_or(0, |m| m as usize + 1);
    let mut remap = vec![0u32; max_old];
    for (new_id, &old_id) in old_states.iter().enumerate() {
        remap[old_id as usize] = new_id as u32;
    }
    apply_remap(pfsa, &old_states, &remap);
}

/// Breadth-first renumbering from state 0 along forward arcs. Unreachable
/// states are appended afterwards in their prior relative order, since the
/// spec does not define behaviour for a disconnected PFSA but every state
/// must still end up with a valid id.
pub fn bf_renumber(pfsa: &mut Pfsa) {
    let old_states = pfsa.states();
    if old_states.is_empty() {
        return;
    }
    for slot in pfsa.nodes.iter_mut().flatten() {
        slot.mark = false;
    }

    let mut order = Vec::with_capacity(old_states.len());
    let mut queue = VecDeque::new();
    let start = old_states[0];
    if let Some(n) = pfsa.nodes.get_mut(start as usize).and_then(Option::as_mut) {
        n.mark = true;
    }
    queue.push_back(start);

    while let Some(state) = queue.pop_front() {
        order.push(state);
        let targets: Vec<StateId> = pfsa
            .node(state)
            .map(|n| n.forward.iter().map(|a| a.target).collect())
            .unwrap_or_default();
        for t in targets {
            if let Some(n) = pfsa.nodes.get_mut(t as usize).and_then(Option::as_mut) {
                if !n.mark {
                    n.mark = true;
                    queue.push_back(t);
                }
            }
        }
    }
    for &state in &old_states {
        if !order.contains(&state) {
            order.push(state);
        }
    }

    let mut remap = vec![0u32; old_states.iter().copied().max().map_or(0, |m| m as usize + 1)];
    for (new_id, &old_id) in order.iter().enumerate() {
        remap[old_id as usize] = new_id as u32;
    }
    apply_remap(pfsa, &old_states, &remap);
}

/// Rewrites every node's id, every arc's target/source, and every
/// merge-history entry through `remap`, then reinserts nodes into the
/// arena in ascending new-id order.
fn apply_remap(pfsa: &mut Pfsa, old_states: &[StateId], remap: &[u32]) {
    let mut nodes: Vec<Node> = old_states
        .iter()
        .filter_map(|&s| pfsa.release_node(s))
        .collect();

    for node in &mut nodes {
        node.state = remap[node.state as usize];
        for arc in &mut node.forward {
            arc.target = remap[arc.target as usize];
        }
        for arc in &mut node.reverse {
            arc.source = remap[arc.source as usize];
        }
        for entry in &mut node.merge_history {
            *entry = remap[*entry as usize];
        }
        node.merge_history.sort_unstable();
        node.forward.sort_by_key(|a| (a.symbol, a.target));
        node.reverse.sort_by_key(|a| (a.symbol, a.source));
    }
    nodes.sort_by_key(|n| n.state);

    let new_len = nodes.last().map_or(0, |n| n.state as usize + 1);
    pfsa.nodes = Vec::with_capacity(new_len);
    pfsa.nodes.resize_with(new_len, || None);
    pfsa.max_state = nodes.last().map(|n| n.state);
    for node in nodes {
        let idx = node.state as usize;
        pfsa.nodes[idx] = Some(node);
    }
}

/// Linear structural equality: equal state counts, identical id sequences
/// in list order, and for each same-id pair, matching forward arcs compared
/// as `(symbol, target, freq)` (set membership within a symbol run, so
/// order among same-symbol arcs doesn't matter).
pub fn is_equivalent(a: &Pfsa, b: &Pfsa) -> bool {
    if a.state_count() != b.state_count() {
        return false;
    }
    let (sa, sb) = (a.states(), b.states());
    if sa != sb {
        return false;
    }
    for state in sa {
        let (na, nb) = (a.node(state), b.node(state));
        match (na, nb) {
            (Some(na), Some(nb)) => {
                if na.forward.len() != nb.forward.len() {
                    return false;
                }
                for arc in &na.forward {
                    if !nb.forward.iter().any(|o| {
                        o.symbol == arc.symbol && o.target == arc.target && o.freq == arc.freq
                    }) {
                        return false;
                    }
                }
            }
            _ => return false,
        }
    }
    true
}

/// Determines, without performing either merge, whether merging `p1` with
/// `p2` in `proot` and `q1` with `q2` in `qroot` would yield structurally
/// identical PFSAs. Walks both node lists in parallel; at each position,
/// synthesises the "as-if-merged" full history (the node's own history plus,
/// if it is one of the two merge targets, the other target's history) and
/// compares those synthesised sets instead of materialising the merge.
///
/// The original C `isequiv_unrealised` interleaves two linked merge-history
/// lists node-by-node with hand-rolled three-way merges; since this crate's
/// merge-history is a plain sorted `Vec<StateId>`, the same synthesis is a
/// union of two small sorted vectors (see [`Node::full_history`]).
pub fn is_equivalent_unrealised(
    proot: &Pfsa,
    p1: StateId,
    p2: StateId,
    qroot: &Pfsa,
    q1: StateId,
    q2: StateId,
) -> bool {
    let (p1, p2) = if p1 <= p2 { (p1, p2) } else { (p2, p1) };
    let (q1, q2) = if q1 <= q2 { (q1, q2) } else { (q2, q1) };

    if proot.state_count() != qroot.state_count() {
        return false;
    }
    let same_root = std::ptr::eq(proot, qroot);
    if same_root && (p1 != q1 || p2 != q2) {
        return false;
    }

    let p_states = proot.states();
    let q_states = qroot.states();
    if p_states.len() != q_states.len() {
        return false;
    }

    for (&ps, &qs) in p_states.iter().zip(q_states.iter()) {
        if ps != qs {
            return false;
        }
        // Skip the position belonging to the merged-away node on each side:
        // the merge survivor (p1/q1) already carries its partner's history
        // into its synthesised set below.
        if ps == p2 || qs == q2 {
            continue;
        }
        let Some(pnode) = proot.node(ps) else { return false };
        let Some(qnode) = qroot.node(qs) else { return false };

        let p_synth = synthesised_history(proot, pnode, p1, p2);
        let q_synth = synthesised_history(qroot, qnode, q1, q2);
        if p_synth != q_synth {
            return false;
        }
    }
    true
}

/// The full merge-history set for `node`, as-if `p1` and `p2` had already
/// been merged: if `node` is the surviving state `p1`, its history is
/// unioned with `p2`'s; otherwise it is just `node`'s own full history.
fn synthesised_history(pfsa: &Pfsa, node: &Node, p1: StateId, p2: StateId) -> Vec<StateId> {
    let mut hist = node.full_history();
    if node.state == p1 {
        if let Some(partner) = pfsa.node(p2) {
            hist.extend(partner.full_history());
        }
        hist.sort_unstable();
        hist.dedup();
    }
    hist
}
