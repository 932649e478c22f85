//! The six sk-strings mergeability heuristics.
//!
//! Mirrors `skstr.c`'s `skstr_and`/`skstr_or`/`skstr_lax`/`skstr_strict`/
//! `skstr_xentropic`/`skstr_vardist`, plus `acceptlist`. Probabilities stay
//! in the fixed-point [`crate::enumerator::PREC`] scale everywhere except
//! the two information-theoretic heuristics, which promote to `f64` only at
//! their entropy/variation-distance boundary (per SPEC_FULL §9).

use crate::enumerator::{get_sorted_k_strings, KString, SortOrder, FULL_PROB};
use crate::error::CoreError;
use crate::lookahead::acceptable;
use crate::pfsa::{Pfsa, StateId};

/// Which of the six sk-strings criteria decides mergeability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heuristic {
    And,
    Or,
    Lax,
    Strict,
    Xentropic,
    VarDist,
}

impl Heuristic {
    /// Parses a heuristic name (as accepted by the `-H` flag). Returns
    /// `None` on an unrecognised name; the caller decides how fatal that is.
    pub fn parse(name: &str) -> Option<Heuristic> {
        match name {
            "and" => Some(Heuristic::And),
            "or" => Some(Heuristic::Or),
            "lax" => Some(Heuristic::Lax),
            "strict" => Some(Heuristic::Strict),
            "xentropic" => Some(Heuristic::Xentropic),
            "vardist" => Some(Heuristic::VarDist),
            _ => None,
        }
    }

    /// Is this one of the two probability-ordered heuristics (`and`/`or`),
    /// which need [`SortOrder::ProbDesc`] lists, as opposed to the aligned-pair
    /// heuristics which need [`SortOrder::SeqLex`]?
    pub fn sort_order(self) -> SortOrder {
        match self {
            Heuristic::And | Heuristic::Or => SortOrder::ProbDesc,
            Heuristic::Lax | Heuristic::Strict | Heuristic::Xentropic | Heuristic::VarDist => {
                SortOrder::SeqLex
            }
        }
    }
}

/// Parameters shared by every heuristic evaluation: the enumerator horizon,
/// pruning floor and overflow cap, the acceptance cutoff (`Agreepct · PREC`),
/// and the entropy/variation-distance threshold.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicParams {
    pub k: u32,
    pub minprob: u64,
    pub cap: usize,
    pub agreepct_prec: u64,
    pub min_entropy: f64,
}

/// Is the top `Agreepct%` probability mass of `list` acceptable — via the
/// lookahead walker — at `state`?
pub fn acceptlist(pfsa: &Pfsa, state: StateId, list: &[KString], agreepct_prec: u64) -> bool {
    let mut cutoff = 0u64;
    for ks in list {
        cutoff += ks.prob;
        if !acceptable(pfsa, state, &ks.symbols) {
            return false;
        }
        if cutoff > agreepct_prec {
            break;
        }
    }
    true
}

/// Evaluates `heuristic` for the pair `(p, q)`.
pub fn mergeable(
    pfsa: &Pfsa,
    p: StateId,
    q: StateId,
    heuristic: Heuristic,
    params: &HeuristicParams,
) -> Result<bool, CoreError> {
    match heuristic {
        Heuristic::And => and(pfsa, p, q, params),
        Heuristic::Or => or(pfsa, p, q, params),
        Heuristic::Lax => lax(pfsa, p, q, params),
        Heuristic::Strict => strict(pfsa, p, q, params),
        Heuristic::Xentropic => xentropic(pfsa, p, q, params),
        Heuristic::VarDist => vardist(pfsa, p, q, params),
    }
}

/// p's strings must be acceptable at q AND q's strings must be acceptable at p.
fn and(pfsa: &Pfsa, p: StateId, q: StateId, params: &HeuristicParams) -> Result<bool, CoreError> {
    let list_p = get_sorted_k_strings(pfsa, p, params.k, params.minprob, params.cap, SortOrder::ProbDesc)?;
    if !acceptlist(pfsa, q, &list_p, params.agreepct_prec) {
        return Ok(false);
    }
    let list_q = get_sorted_k_strings(pfsa, q, params.k, params.minprob, params.cap, SortOrder::ProbDesc)?;
    Ok(acceptlist(pfsa, p, &list_q, params.agreepct_prec))
}

/// p's strings must be acceptable at q OR q's strings must be acceptable at p.
fn or(pfsa: &Pfsa, p: StateId, q: StateId, params: &HeuristicParams) -> Result<bool, CoreError> {
    let list_p = get_sorted_k_strings(pfsa, p, params.k, params.minprob, params.cap, SortOrder::ProbDesc)?;
    if acceptlist(pfsa, q, &list_p, params.agreepct_prec) {
        return Ok(true);
    }
    let list_q = get_sorted_k_strings(pfsa, q, params.k, params.minprob, params.cap, SortOrder::ProbDesc)?;
    Ok(acceptlist(pfsa, p, &list_q, params.agreepct_prec))
}

/// The two states must agree on the first `Agreepct%` of their strings by
/// sequence, independent of matching probabilities.
fn lax(pfsa: &Pfsa, p: StateId, q: StateId, params: &HeuristicParams) -> Result<bool, CoreError> {
    let list_p = get_sorted_k_strings(pfsa, p, params.k, params.minprob, params.cap, SortOrder::SeqLex)?;
    let list_q = get_sorted_k_strings(pfsa, q, params.k, params.minprob, params.cap, SortOrder::SeqLex)?;
    let mut cutoff_p = 0u64;
    let mut cutoff_q = 0u64;
    for (a, b) in list_p.iter().zip(list_q.iter()) {
        if a.symbols != b.symbols {
            return Ok(false);
        }
        cutoff_p += a.prob;
        cutoff_q += b.prob;
        if cutoff_p >= params.agreepct_prec && cutoff_q >= params.agreepct_prec {
            return Ok(true);
        }
    }
    Ok(false)
}

/// As `lax`, but the probabilities must match exactly at each position too.
fn strict(pfsa: &Pfsa, p: StateId, q: StateId, params: &HeuristicParams) -> Result<bool, CoreError> {
    let list_p = get_sorted_k_strings(pfsa, p, params.k, params.minprob, params.cap, SortOrder::SeqLex)?;
    let list_q = get_sorted_k_strings(pfsa, q, params.k, params.minprob, params.cap, SortOrder::SeqLex)?;
    let mut cutoff_p = 0u64;
    let mut cutoff_q = 0u64;
    for (a, b) in list_p.iter().zip(list_q.iter()) {
        if a.prob != b.prob || a.symbols != b.symbols {
            return Ok(false);
        }
        cutoff_p += a.prob;
        cutoff_q += b.prob;
        if cutoff_p >= params.agreepct_prec && cutoff_q >= params.agreepct_prec {
            return Ok(true);
        }
    }
    Ok(false)
}

fn to_fraction(prob: u64) -> f64 {
    prob as f64 / FULL_PROB as f64
}

/// Merge-joins two sequence-sorted lists, calling `term` with each aligned
/// `(pi, qi)` pair on the merged domain (missing entries substituted by
/// `missing`).
fn merge_join(list_p: &[KString], list_q: &[KString], missing: f64, mut term: impl FnMut(f64, f64)) {
    let (mut i, mut j) = (0, 0);
    while i < list_p.len() && j < list_q.len() {
        match list_p[i].symbols.cmp(&list_q[j].symbols) {
            std::cmp::Ordering::Equal => {
                term(to_fraction(list_p[i].prob), to_fraction(list_q[j].prob));
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => {
                term(to_fraction(list_p[i].prob), missing);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                term(missing, to_fraction(list_q[j].prob));
                j += 1;
            }
        }
    }
    while i < list_p.len() {
        term(to_fraction(list_p[i].prob), missing);
        i += 1;
    }
    while j < list_q.len() {
        term(missing, to_fraction(list_q[j].prob));
        j += 1;
    }
}

/// The symmetric Kullback divergence between the two states' string
/// distributions, normalised into `[0, 1]`, must be at most `MinEntropy`.
fn xentropic(pfsa: &Pfsa, p: StateId, q: StateId, params: &HeuristicParams) -> Result<bool, CoreError> {
    let list_p = get_sorted_k_strings(pfsa, p, params.k, params.minprob, params.cap, SortOrder::SeqLex)?;
    let list_q = get_sorted_k_strings(pfsa, q, params.k, params.minprob, params.cap, SortOrder::SeqLex)?;
    let epsilon = params.minprob as f64 / FULL_PROB as f64;

    let mut xentropy = 0.0f64;
    merge_join(&list_p, &list_q, epsilon, |pi, qi| {
        xentropy += (pi - qi) * (pi / qi).ln();
    });
    xentropy /= -2.0 * (1.0 - epsilon) * epsilon.ln();

    Ok(xentropy <= params.min_entropy)
}

/// Half the total variation distance between the two states' string
/// distributions must be at most `MinEntropy` (reused here as the
/// variation-distance threshold, per §6).
fn vardist(pfsa: &Pfsa, p: StateId, q: StateId, params: &HeuristicParams) -> Result<bool, CoreError> {
    let list_p = get_sorted_k_strings(pfsa, p, params.k, params.minprob, params.cap, SortOrder::SeqLex)?;
    let list_q = get_sorted_k_strings(pfsa, q, params.k, params.minprob, params.cap, SortOrder::SeqLex)?;

    let mut total = 0.0f64;
    merge_join(&list_p, &list_q, 0.0, |pi, qi| {
        total += (pi - qi).abs();
    });
    total /= 2.0;

    Ok(total <= params.min_entropy)
}
