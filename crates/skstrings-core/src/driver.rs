//! The outer sk-strings fixed-point merge loop.
//!
//! Mirrors `skstr.c`'s `do_skstrings`: scan every unordered pair of live
//! states, merge the first mergeable pair found, and either restart the scan
//! from scratch (cache flushed) or carry on from the same position (cache
//! patched), depending on whether the merged pair was indistinguishable
//! (§4.3). Finishes with a [`crate::pfsa::renumber`].

use crate::enumerator::{indistinguishable, KStringCache};
use crate::error::CoreError;
use crate::heuristics::{mergeable, Heuristic, HeuristicParams};
use crate::pfsa::{merge, renumber, Pfsa, StateId};

/// Configuration for one `run_skstrings` pass: which heuristic decides
/// mergeability and the parameters it is evaluated under.
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    pub heuristic: Heuristic,
    pub params: HeuristicParams,
}

/// Runs the sk-strings merge loop to a fixed point, then renumbers the
/// result. Returns the number of merges performed.
pub fn run_skstrings(pfsa: &mut Pfsa, config: &DriverConfig) -> Result<u32, CoreError> {
    let mut cache = KStringCache::new(
        config.params.k,
        config.params.minprob,
        config.params.cap,
        config.heuristic.sort_order(),
    );
    let mut merges = 0u32;

    loop {
        let states = pfsa.states();
        let mut restarted = false;

        'scan: for (i, &p1) in states.iter().enumerate() {
            if pfsa.node(p1).is_none() {
                continue;
            }
            for &p2 in &states[i + 1..] {
                if pfsa.node(p1).is_none() || pfsa.node(p2).is_none() {
                    continue;
                }
                if !mergeable(pfsa, p1, p2, config.heuristic, &config.params)? {
                    continue;
                }
                let stays_invisible = indistinguishable(
                    pfsa,
                    p1,
                    p2,
                    config.params.k,
                    config.params.minprob,
                    config.params.cap,
                )?;
                if stays_invisible {
                    cache.discard(p2);
                    merge(pfsa, p1, p2);
                    merges += 1;
                } else {
                    merge(pfsa, p1, p2);
                    merges += 1;
                    cache.flush();
                    restarted = true;
                    break 'scan;
                }
            }
        }

        if !restarted {
            break;
        }
    }

    renumber(pfsa);
    Ok(merges)
}

/// Evaluates the configured heuristic for a single pair, without merging —
/// used by callers (the CLI's verbose mode) that want to report a decision
/// before acting on it.
pub fn would_merge(
    pfsa: &Pfsa,
    p1: StateId,
    p2: StateId,
    config: &DriverConfig,
) -> Result<bool, CoreError> {
    mergeable(pfsa, p1, p2, config.heuristic, &config.params)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use crate::enumerator::PREC;

    fn two_branch_pfsa() -> Pfsa {
        // 0 -a-> 1 -delim-> sink, 0 -a-> 2 -delim-> sink: 1 and 2 are
        // identical dead ends and should merge under any heuristic.
        let mut p = Pfsa::new("\n", 256, 4096);
        let a = p.symbols.intern("a").expect("intern a");
        let delim = p.delimiter;
        p.add_arc(0, 1, a, 1).expect("0->1");
        p.add_arc(0, 2, a, 1).expect("0->2");
        p.add_arc(1, 3, delim, 1).expect("1->3");
        p.add_arc(2, 4, delim, 1).expect("2->4");
        p
    }

    #[test]
    fn merges_equivalent_dead_end_states() {
        let mut p = two_branch_pfsa();
        let before = p.state_count();
        let config = DriverConfig {
            heuristic: Heuristic::And,
            params: HeuristicParams { k: 2, minprob: 0, cap: 1000, agreepct_prec: 50 * PREC, min_entropy: 0.5 },
        };
        let merges = run_skstrings(&mut p, &config).expect("run");
        assert!(merges >= 1);
        assert!(p.state_count() < before);
    }

    /// The canonical machine for `{ab, ab, ac}`: the two distinct training
    /// strings each keep their own path from the shared start state (the
    /// duplicate "ab" occurrences share one path, frequency 2), giving two
    /// separate "after-a" states before any merging.
    fn after_a_scenario_pfsa() -> (Pfsa, StateId, StateId) {
        let mut p = Pfsa::new("\n", 256, 4096);
        let a = p.symbols.intern("a").expect("intern a");
        let b = p.symbols.intern("b").expect("intern b");
        let c = p.symbols.intern("c").expect("intern c");
        let delim = p.delimiter;
        p.add_arc(0, 1, a, 2).expect("0->1 a (ab x2)");
        p.add_arc(0, 2, a, 1).expect("0->2 a (ac)");
        p.add_arc(1, 3, b, 2).expect("1->3 b");
        p.add_arc(2, 4, c, 1).expect("2->4 c");
        p.add_arc(3, 5, delim, 2).expect("3->5 delim");
        p.add_arc(4, 6, delim, 1).expect("4->6 delim");
        (p, 1, 2)
    }

    #[test]
    fn scenario_one_and_t1_merges_the_after_a_states() {
        // spec.md §8 scenario 1: `{ab, ab, ac}` under `-H and -t 1 -p 50`
        // merges the two "after-a" states into one with outgoing {b:2, c:1}.
        // At tailsize 1, neither after-a state has a direct delimiter arc
        // (both need one more hop: b-or-c, then delim), so each enumerates
        // an empty k-string list; `and`'s acceptlist check is vacuously true
        // against an empty list on both sides, so the pair is mergeable.
        let (pfsa, after_a_ab, after_a_ac) = after_a_scenario_pfsa();
        let params = HeuristicParams { k: 1, minprob: 0, cap: 1000, agreepct_prec: 50 * PREC, min_entropy: 0.0 };
        assert!(
            mergeable(&pfsa, after_a_ab, after_a_ac, Heuristic::And, &params).expect("mergeable"),
            "the two after-a states should be judged mergeable under `and` at tailsize 1"
        );

        let mut pfsa = pfsa;
        merge(&mut pfsa, after_a_ab, after_a_ac);
        let merged = pfsa.node(after_a_ab).expect("merged after-a state");
        assert_eq!(merged.forward.len(), 2, "expected exactly the b and c arcs: {:?}", merged.forward);
        let mut freqs: Vec<u64> = merged.forward.iter().map(|arc| arc.freq).collect();
        freqs.sort_unstable();
        assert_eq!(freqs, vec![1, 2], "expected outgoing arcs totalling {{b: 2, c: 1}}");
    }

    /// The canonical machine for `{aa, aaa, aaaa}`: three distinct training
    /// strings, each kept as its own path from the shared start state (no
    /// two are identical, so nothing is pre-aggregated beyond the start).
    fn a_run_scenario_pfsa() -> Pfsa {
        let mut p = Pfsa::new("\n", 256, 4096);
        let a = p.symbols.intern("a").expect("intern a");
        let delim = p.delimiter;
        // "aa": 0 -a-> 11 -a-> 12 -delim-> 19
        p.add_arc(0, 11, a, 1).expect("0->11");
        p.add_arc(11, 12, a, 1).expect("11->12");
        p.add_arc(12, 19, delim, 1).expect("12->19");
        // "aaa": 0 -a-> 21 -a-> 22 -a-> 23 -delim-> 29
        p.add_arc(0, 21, a, 1).expect("0->21");
        p.add_arc(21, 22, a, 1).expect("21->22");
        p.add_arc(22, 23, a, 1).expect("22->23");
        p.add_arc(23, 29, delim, 1).expect("23->29");
        // "aaaa": 0 -a-> 31 -a-> 32 -a-> 33 -a-> 34 -delim-> 39
        p.add_arc(0, 31, a, 1).expect("0->31");
        p.add_arc(31, 32, a, 1).expect("31->32");
        p.add_arc(32, 33, a, 1).expect("32->33");
        p.add_arc(33, 34, a, 1).expect("33->34");
        p.add_arc(34, 39, delim, 1).expect("34->39");
        p
    }

    #[test]
    fn scenario_two_strict_t2_merges_equivalent_a_run_positions() {
        // spec.md §8 scenario 2: `{aa, aaa, aaaa}` under `-H strict -t 2 -p
        // 100` converges toward a 2-state cycle on `a` plus one terminal
        // arc. At tailsize 2, the state two hops before each string's final
        // delimiter (11, 22, 33 — one per string) all enumerate the
        // identical single k-string `(a, delim)` at full probability, and
        // the states one hop before that (12, 23, 34) all enumerate the
        // identical single k-string `(delim)` at full probability — each
        // such pair is exactly equal under `strict`, so they merge into the
        // cycle's two states.
        let pfsa = a_run_scenario_pfsa();
        let params = HeuristicParams { k: 2, minprob: 0, cap: 1000, agreepct_prec: 100 * PREC, min_entropy: 0.0 };

        assert!(mergeable(&pfsa, 11, 22, Heuristic::Strict, &params).expect("11~22"));
        assert!(mergeable(&pfsa, 11, 33, Heuristic::Strict, &params).expect("11~33"));
        assert!(mergeable(&pfsa, 12, 23, Heuristic::Strict, &params).expect("12~23"));
        assert!(mergeable(&pfsa, 12, 34, Heuristic::Strict, &params).expect("12~34"));

        let mut pfsa = pfsa;
        merge(&mut pfsa, 11, 22);
        merge(&mut pfsa, 11, 33);
        merge(&mut pfsa, 12, 23);
        merge(&mut pfsa, 12, 34);
        let cycle_head = pfsa.node(11).expect("merged a-run state");
        assert_eq!(cycle_head.forward.len(), 1, "expected a single `a` arc into the other cycle state");
        assert_eq!(cycle_head.forward[0].target, 12, "expected the `a` arc to reach the other cycle state");
        assert_eq!(cycle_head.forward[0].freq, 3, "expected the `a` arc's frequency to total all three strings");
        let terminal = pfsa.node(12).expect("merged terminal state");
        let terminal_freq: u64 = terminal.forward.iter().map(|arc| arc.freq).sum();
        assert_eq!(terminal_freq, 3, "expected the terminal transition's frequency to total all three strings");
    }

    #[test]
    fn no_mergeable_pairs_leaves_state_count_unchanged() {
        let mut p = Pfsa::new("\n", 256, 4096);
        let a = p.symbols.intern("a").expect("intern a");
        let b = p.symbols.intern("b").expect("intern b");
        let delim = p.delimiter;
        p.add_arc(0, 1, a, 1).expect("0->1 a");
        p.add_arc(1, 3, delim, 1).expect("1->3");
        p.add_arc(0, 2, b, 1).expect("0->2 b");
        let before = p.state_count();
        let config = DriverConfig {
            heuristic: Heuristic::Strict,
            params: HeuristicParams { k: 2, minprob: 0, cap: 1000, agreepct_prec: 100 * PREC, min_entropy: 0.0 },
        };
        run_skstrings(&mut p, &config).expect("run");
        assert_eq!(p.state_count(), before);
    }
}
