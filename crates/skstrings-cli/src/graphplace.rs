//! Diagram-mode (`-g`) output: PostScript-like drawing directives for the
//! external `graphplace` helper.
//!
//! Grounded in `misc.c`'s `getanno`/`writepfsa`: when several non-delimiter
//! arcs from the same state target the same neighbour, they would otherwise
//! overprint a single edge label; this collapses them into one annotation
//! listing every symbol on that edge (with a `^freq` superscript when a
//! symbol's frequency is more than 1). Delimiter arcs never get an edge of
//! their own — their combined frequency becomes an accept-count annotation
//! on the node itself.

use skstrings_core::pfsa::Pfsa;

pub fn render(pfsa: &Pfsa) -> String {
    let mut out = String::new();
    for node in pfsa.iter() {
        let mut ndelims: u64 = 0;
        let mut seen_targets: Vec<u32> = Vec::new();

        for arc in &node.forward {
            if pfsa.symbols.is_delimiter(arc.symbol) {
                ndelims += arc.freq;
                continue;
            }
            if seen_targets.contains(&arc.target) {
                continue;
            }
            seen_targets.push(arc.target);

            let group: Vec<_> = node
                .forward
                .iter()
                .filter(|a| a.target == arc.target && !pfsa.symbols.is_delimiter(a.symbol))
                .collect();
            let anno = render_annotation(pfsa, &group);
            out.push_str(&format!("{anno} {} {} edge\n", node.state, arc.target));
        }

        if ndelims > 0 {
            out.push_str(&format!("(!^{ndelims}) ({}) () {} node\n", node.state, node.state));
        } else {
            out.push_str(&format!("({}) () {} node\n", node.state, node.state));
        }
    }
    out
}

fn render_annotation(pfsa: &Pfsa, group: &[&skstrings_core::pfsa::Arc]) -> String {
    if let [only] = group {
        let label = pfsa.symbols.label(only.symbol).unwrap_or("");
        return if only.freq == 1 { format!("() ({label})") } else { format!("({}) ({label})", only.freq) };
    }
    let parts: Vec<String> = group
        .iter()
        .map(|arc| {
            let label = pfsa.symbols.label(arc.symbol).unwrap_or("");
            if arc.freq > 1 { format!("{label}^{}", arc.freq) } else { label.to_string() }
        })
        .collect();
    format!("() ({})", parts.join(","))
}
