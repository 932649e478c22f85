pub mod cli;
pub mod error;
pub mod graphplace;
pub mod io;

pub use cli::Cli;

use clap::Parser;
use skstrings_core::driver::{run_skstrings, DriverConfig};
use skstrings_core::format;

fn main() {
    #[cfg(unix)]
    install_sigpipe_default();

    let cli = Cli::parse();

    let result = run(&cli);

    if let Err(e) = result {
        eprintln!("{}", e.message());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), error::CliError> {
    let resolved = cli::resolve(cli)?;
    for warning in &resolved.warnings {
        eprintln!("warning: {warning}");
    }

    let input = io::read_input(&cli.input, cli.max_file_size)?;
    let mut pfsa = format::parse(&input, &cli.delimiter, cli::MAXSYMS, cli::MAXNODES)?;

    let config = DriverConfig { heuristic: resolved.heuristic, params: resolved.params };
    let merges = run_skstrings(&mut pfsa, &config)?;

    if cli.debug {
        eprintln!(
            "# debug: heuristic={:?} tailsize={} merges={}",
            resolved.heuristic, resolved.tailsize, merges
        );
    }

    let body = if cli.diagram { graphplace::render(&pfsa) } else { format::write(&pfsa) };

    // Per §6/§10.4: verbose output is a `# <call-string>` comment followed by
    // statistical comment lines, embedded in the output stream itself (the
    // same place the original writes them), not a separate stderr banner.
    // Graphplace mode has its own PostScript-comment conventions that are
    // outside the core contract, so the embedding only applies to plain output.
    let rendered = if cli.verbose && !cli.diagram {
        let mut out = String::new();
        out.push_str(&format!("# {}\n", reconstruct_call_string(cli)));
        out.push_str(&body);
        out.push_str(&format!(
            "# nstates = {}, narcs = {}, maxstate = {}\n",
            pfsa.state_count(),
            pfsa.non_delim_arcs(),
            pfsa.max_state().map_or(0, |m| m)
        ));
        out.push_str("# MML = n/a\n");
        out
    } else {
        body
    };

    io::write_output(&cli.output, &rendered)
}

/// Reconstructs a verbatim-looking invocation string for the `-v` banner
/// comment, so a run can be repeated from its own output.
fn reconstruct_call_string(cli: &Cli) -> String {
    let mut parts = vec!["skstr".to_string()];
    parts.push(format!("-H {}", cli.heuristic));
    parts.push(format!("-D {:?}", cli.delimiter));
    parts.push(format!("-t {}", cli.tailsize));
    parts.push(format!("-p {}", cli.agreepct));
    parts.push(format!("-m {}", cli.minprob));
    parts.push(format!("-e {}", cli.min_entropy));
    if cli.diagram {
        parts.push("-g".to_string());
    }
    parts.join(" ")
}

/// Resets `SIGPIPE` to its default disposition (`SIG_DFL`) so that writing to
/// a closed downstream pipe (`skstr ... | head`) terminates the process
/// instead of surfacing as a `BrokenPipe` write error.
#[cfg(unix)]
fn install_sigpipe_default() {
    // SAFETY: called once, synchronously, before any other thread exists;
    // SIG_DFL is always a valid disposition for SIGPIPE.
    #[allow(unsafe_code)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
}
