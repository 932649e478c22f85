//! The PFSA text format: `source target symbol frequency` lines, `#`
//! comments, and a configurable one-character delimiter. A pure data
//! transform with no process/CLI concerns (per SPEC_FULL §10.1); the CLI
//! owns *where* the bytes come from and go to, this module owns their shape.

use crate::error::CoreError;
use crate::pfsa::Pfsa;

/// Parses `text` into a fresh [`Pfsa`], interning symbols as they are seen.
/// Lines beginning with `#` (after leading whitespace) and blank lines are
/// skipped. Each remaining line must have exactly four whitespace-separated
/// fields: `source target symbol frequency`.
pub fn parse(text: &str, delimiter_label: &str, max_syms: usize, max_nodes: usize) -> Result<Pfsa, CoreError> {
    let mut pfsa = Pfsa::new(delimiter_label, max_syms, max_nodes);
    for (lineno, raw_line) in text.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(source), Some(target), Some(symbol), Some(freq)) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(CoreError::FormatError {
                line: lineno + 1,
                detail: "expected 4 fields: source target symbol frequency".to_string(),
            });
        };
        if fields.next().is_some() {
            return Err(CoreError::FormatError { line: lineno + 1, detail: "too many fields".to_string() });
        }
        let source: u32 = source.parse().map_err(|_| CoreError::FormatError {
            line: lineno + 1,
            detail: format!("invalid source state {source:?}"),
        })?;
        let target: u32 = target.parse().map_err(|_| CoreError::FormatError {
            line: lineno + 1,
            detail: format!("invalid target state {target:?}"),
        })?;
        let freq: u64 = freq.parse().map_err(|_| CoreError::FormatError {
            line: lineno + 1,
            detail: format!("invalid frequency {freq:?}"),
        })?;
        let symbol_id = pfsa.symbols.intern(symbol)?;
        pfsa.add_arc(source, target, symbol_id, freq)?;
    }
    Ok(pfsa)
}

/// Renders `pfsa` back into the line format: one `source target symbol
/// frequency` line per forward arc, states visited in ascending id order and
/// arcs within a state in their stored `(symbol, target)` order.
pub fn write(pfsa: &Pfsa) -> String {
    let mut out = String::new();
    for node in pfsa.iter() {
        for arc in &node.forward {
            let label = pfsa.symbols.label(arc.symbol).unwrap_or("");
            out.push_str(&format!("{} {} {} {}\n", node.state, arc.target, label, arc.freq));
        }
    }
    out
}
