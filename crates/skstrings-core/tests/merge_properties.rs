//! Property-based tests for the merge operator's structural invariants.
#![allow(clippy::expect_used)]

use proptest::collection::vec;
use proptest::prelude::*;
use skstrings_core::pfsa::{merge, Pfsa};

#[derive(Debug, Clone)]
struct ArcSpec {
    source: u32,
    target: u32,
    symbol: char,
    freq: u64,
}

fn arc_spec() -> impl Strategy<Value = ArcSpec> {
    (0u32..5, 0u32..5, prop_oneof![Just('a'), Just('b'), Just('c')], 1u64..5)
        .prop_map(|(source, target, symbol, freq)| ArcSpec { source, target, symbol, freq })
}

fn build(arcs: &[ArcSpec]) -> Pfsa {
    let mut pfsa = Pfsa::new("\n", 256, 4096);
    for spec in arcs {
        let label = spec.symbol.to_string();
        let symbol = pfsa.symbols.intern(&label).expect("symbol table has room");
        pfsa.add_arc(spec.source, spec.target, symbol, spec.freq).expect("node budget has room");
    }
    pfsa
}

proptest! {
    #[test]
    fn merging_two_live_states_drops_state_count_by_one(arcs in vec(arc_spec(), 1..12)) {
        let mut pfsa = build(&arcs);
        let states = pfsa.states();
        prop_assume!(states.len() >= 2);
        let p1 = states[0];
        let p2 = states[1];
        let before = pfsa.state_count();
        merge(&mut pfsa, p1, p2);
        prop_assert_eq!(pfsa.state_count(), before - 1);
        prop_assert!(pfsa.node(p2).is_none());
        prop_assert!(pfsa.node(p1).is_some());
    }

    #[test]
    fn merging_never_increases_non_delim_arc_count(arcs in vec(arc_spec(), 1..12)) {
        let mut pfsa = build(&arcs);
        let states = pfsa.states();
        prop_assume!(states.len() >= 2);
        let p1 = states[0];
        let p2 = states[1];
        let before = pfsa.non_delim_arcs();
        merge(&mut pfsa, p1, p2);
        prop_assert!(pfsa.non_delim_arcs() <= before);
    }
}
