//! Clap CLI definition and flag-to-runtime-config resolution.

use std::path::PathBuf;

use clap::Parser;
use skstrings_core::enumerator::PREC;
use skstrings_core::heuristics::{Heuristic, HeuristicParams};

use crate::error::CliError;

/// A CLI argument that is either a filesystem path or the stdin sentinel `"-"`.
#[derive(Clone, Debug)]
pub enum PathOrStdin {
    Stdin,
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdin {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdin::Stdin)
        } else {
            Ok(PathOrStdin::Path(PathBuf::from(s)))
        }
    }
}

/// A CLI argument that is either a filesystem path or the stdout sentinel `"-"`.
#[derive(Clone, Debug)]
pub enum PathOrStdout {
    Stdout,
    Path(PathBuf),
}

impl std::str::FromStr for PathOrStdout {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            Ok(PathOrStdout::Stdout)
        } else {
            Ok(PathOrStdout::Path(PathBuf::from(s)))
        }
    }
}

/// `skstr`: induces a reduced PFSA from an input PFSA via sk-strings state merging.
#[derive(Parser, Debug)]
#[command(name = "skstr", version, about)]
pub struct Cli {
    /// Input PFSA file, or `-` for stdin.
    #[arg(value_name = "FILE", default_value = "-")]
    pub input: PathOrStdin,

    /// Heuristic: one of and, or, lax, strict, xentropic, vardist.
    #[arg(short = 'H', long = "heuristic")]
    pub heuristic: String,

    /// Delimiter label as it appears in the PFSA text format (default
    /// newline, written `\n` since a literal newline cannot appear inside a
    /// line's fields).
    #[arg(short = 'D', long = "delimiter", default_value = "\\n")]
    pub delimiter: String,

    /// Tail size k (non-negative).
    #[arg(short = 't', long = "tailsize", default_value_t = 1)]
    pub tailsize: i64,

    /// Agreepct, 0-100.
    #[arg(short = 'p', long = "agreepct", default_value_t = 50)]
    pub agreepct: i64,

    /// Minprob percent, (0, 100].
    #[arg(short = 'm', long = "minprob", default_value_t = 1.0)]
    pub minprob: f64,

    /// MinEntropy / MinVarDist, [0, 1].
    #[arg(short = 'e', long = "minentropy", default_value_t = 0.5)]
    pub min_entropy: f64,

    /// Output file, `-` for stdout (default).
    #[arg(short = 'o', long = "output", default_value = "-")]
    pub output: PathOrStdout,

    /// Emit diagram-mode (graphplace) output instead of the plain format.
    #[arg(short = 'g', long = "graphplace")]
    pub diagram: bool,

    /// Print verbose statistics to stderr.
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Print a debug trace of merge decisions to stderr.
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Maximum input file size in bytes.
    #[arg(long, env = "SKSTR_MAX_FILE_SIZE", default_value_t = 268_435_456)]
    pub max_file_size: u64,
}

/// Fixed limits (§6), configurable only at build time in the original.
pub const MAXNODES: usize = 4096;
pub const MAXSYMS: usize = 256;
pub const MAXSTR: usize = 1000;

/// `Cli`, validated and lowered into the types the engine actually runs on.
/// Out-of-range `-m`/`-e`/`-t`/`-p` are silently reset to their default with
/// a warning (collected here, printed by the caller); an unrecognised `-H`
/// is fatal.
pub struct ResolvedConfig {
    pub heuristic: Heuristic,
    pub params: HeuristicParams,
    pub tailsize: u32,
    pub warnings: Vec<String>,
}

pub fn resolve(cli: &Cli) -> Result<ResolvedConfig, CliError> {
    let Some(heuristic) = Heuristic::parse(&cli.heuristic) else {
        return Err(CliError::UnknownHeuristic { name: cli.heuristic.clone() });
    };

    let mut warnings = Vec::new();

    let tailsize: u32 = if cli.tailsize < 0 {
        warnings.push(format!("-t {} is negative; resetting to default (1)", cli.tailsize));
        1
    } else {
        cli.tailsize as u32
    };

    let mut agreepct = cli.agreepct;
    if !(0..=100).contains(&agreepct) {
        warnings.push(format!("-p {agreepct} is outside [0, 100]; resetting to default (50)"));
        agreepct = 50;
    }

    let mut minprob_pct = cli.minprob;
    if !(minprob_pct > 0.0 && minprob_pct <= 100.0) {
        warnings.push(format!("-m {minprob_pct} is outside (0, 100]; resetting to default (1.0)"));
        minprob_pct = 1.0;
    }

    let mut min_entropy = cli.min_entropy;
    if !(0.0..=1.0).contains(&min_entropy) {
        warnings.push(format!("-e {min_entropy} is outside [0, 1]; resetting to default (0.5)"));
        min_entropy = 0.5;
    }

    // xentropic/vardist don't use Agreepct for their own comparison, but the
    // enumerator's top-A-prefix logic (used by verbose summaries) still
    // needs a value, so it is forced to 100 for these two heuristics. Their
    // MinEntropy already defaults to 0.5 via clap's `default_value_t` when
    // the caller never passes `-e`.
    if matches!(heuristic, Heuristic::Xentropic | Heuristic::VarDist) {
        agreepct = 100;
    }

    let minprob_units = (minprob_pct * PREC as f64).round() as u64;

    let params = HeuristicParams {
        k: tailsize,
        minprob: minprob_units,
        cap: MAXSTR,
        agreepct_prec: agreepct as u64 * PREC,
        min_entropy,
    };

    Ok(ResolvedConfig { heuristic, params, tailsize, warnings })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    fn base_cli() -> Cli {
        Cli {
            input: PathOrStdin::Stdin,
            heuristic: "and".to_string(),
            delimiter: "\\n".to_string(),
            tailsize: 1,
            agreepct: 50,
            minprob: 1.0,
            min_entropy: 0.5,
            output: PathOrStdout::Stdout,
            diagram: false,
            verbose: false,
            debug: false,
            max_file_size: 268_435_456,
        }
    }

    #[test]
    fn unknown_heuristic_is_fatal() {
        let mut cli = base_cli();
        cli.heuristic = "bogus".to_string();
        let err = resolve(&cli).expect_err("should be fatal");
        assert!(matches!(err, CliError::UnknownHeuristic { .. }));
    }

    #[test]
    fn negative_tailsize_resets_with_warning() {
        let mut cli = base_cli();
        cli.tailsize = -3;
        let resolved = resolve(&cli).expect("resolve");
        assert_eq!(resolved.tailsize, 1);
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn out_of_range_agreepct_resets_with_warning() {
        let mut cli = base_cli();
        cli.agreepct = 150;
        let resolved = resolve(&cli).expect("resolve");
        assert_eq!(resolved.params.agreepct_prec, 50 * PREC);
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn xentropic_forces_agreepct_to_100() {
        let mut cli = base_cli();
        cli.heuristic = "xentropic".to_string();
        cli.agreepct = 50;
        let resolved = resolve(&cli).expect("resolve");
        assert_eq!(resolved.params.agreepct_prec, 100 * PREC);
    }

    #[test]
    fn valid_flags_produce_no_warnings() {
        let cli = base_cli();
        let resolved = resolve(&cli).expect("resolve");
        assert!(resolved.warnings.is_empty());
    }
}
