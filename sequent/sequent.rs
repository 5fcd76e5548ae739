//! Decide validity of propositional sequents with a semantic tableau

use clap::{Arg, ArgMatches};
use sequent_common::{
    claims::{Claim, Claims},
    comment, config, die, log,
    memory::{format_memory_usage, HeapSpace, Vector},
    output::{install_signal_handler, print_key_value, print_verdict, Timer},
    parser::{open_file_for_writing, parse_sequent, parse_sequents, read_compressed_file_or_stdin},
    sequent::Sequent,
    tableau::{Limits, Statistics, Tableau},
    vector, warn,
};
use std::{
    io::{self, Write},
    mem::size_of,
};

/// Run `sequent`.
fn main() {
    std::process::exit(run_frontend());
}

/// Run `sequent`, returning its exit code.
///
/// This is a separate function because `std::process::exit` does not
/// call destructors.
fn run_frontend() -> i32 {
    install_signal_handler();
    let mut app = clap::App::new("sequent")
    .version(env!("CARGO_PKG_VERSION"))
    .about(env!("CARGO_PKG_DESCRIPTION"))
    .after_help(
        "Sequents are written like \"P, P -> Q |= Q\", one per line.
Connectives, from tightest to loosest: ~ & | -> <- <->. Atoms are A to Z and P0, P1, ...
Input files may be compressed - supported file extensions are: zst, gz, bz2, xz and lz4.
Use \"-\" for an input file to read standard input, or for an output file to write to standard output."
        )
    .arg(Arg::with_name("INPUT").required_unless("EXPRESSION")
         .help("file with one sequent per line"))
    .arg(Arg::with_name("EXPRESSION").takes_value(true).short("e").long("expression")
         .conflicts_with("INPUT")
         .help("Check this sequent instead of reading a file."))

    .arg(Arg::with_name("MAX_NODES").takes_value(true).long("max-nodes")
         .help("Leave sequents with more formula nodes than this undetermined."))
    .arg(Arg::with_name("MAX_BRANCHES").takes_value(true).long("max-branches")
         .help("Give up on sequents whose tableau needs more branches than this."))
    .arg(Arg::with_name("CLAIMS_FILE").takes_value(true).short("c").long("claims")
         .help("Write the verdicts as claims document to this file."))
    .arg(Arg::with_name("MEMORY_USAGE_BREAKDOWN").short("m").long("memory-breakdown")
         .help("Output detailed memory usage metrics.").hidden(true))
    ;

    if config::ENABLE_LOGGING {
        app = app.arg(
            Arg::with_name("v").short("v").multiple(true).help(
                "Verbose output. Print a line for each split and branch, with -vv for each formula.",
            ),
        );
    }

    let flags = Flags::new(app.get_matches());
    let timer = Timer::name("total time");
    let sequents = read_sequents(&flags);
    let mut tableau = Tableau::with_limits(flags.limits);
    tableau.verbosity = flags.verbosity;
    let mut statistics = Statistics::default();
    let mut claims = Claims::new();
    let mut invalid = 0;
    let mut undetermined = 0;
    for (line, sequent) in &sequents {
        log!(tableau, 1, "c {}: {}", flags.location(*line), sequent);
        let verdict = match tableau.decide(sequent) {
            Ok(valid) => Some(valid),
            Err(err) => {
                warn!("{}: {}", flags.location(*line), err);
                None
            }
        };
        statistics.accumulate(&tableau.statistics);
        print_verdict(verdict);
        match verdict {
            Some(valid) => {
                if !valid {
                    invalid += 1;
                }
                claims.push(sequent, valid);
            }
            None => undetermined += 1,
        }
    }
    print_key_value("sequents", sequents.len());
    print_key_value("invalid sequents", invalid);
    print_key_value("undetermined sequents", undetermined);
    print_key_value("branches", statistics.branches);
    print_key_value("closed branches", statistics.closed_branches);
    print_key_value("splits", statistics.splits);
    print_key_value("decomposition steps", statistics.steps);
    print_key_value("max pending branches", statistics.max_pending);
    drop(timer);
    print_memory_usage(&flags, &sequents, &claims);
    write_claims(&flags, &claims).unwrap_or_else(|err| die!("Failed to write claims: {}", err));
    if undetermined != 0 {
        2
    } else if invalid != 0 {
        1
    } else {
        0
    }
}

/// Parsed arguments. See `sequent --help`.
#[derive(Debug)]
pub struct Flags {
    /// Number of `-v` flags given
    pub verbosity: u64,
    pub memory_usage_breakdown: bool,
    pub limits: Limits,
    /// Input file, unless a sequent was given with `-e`
    pub input_filename: Option<String>,
    /// A sequent given on the command line
    pub expression: Option<String>,
    /// Present when we want to write a claims document
    pub claims_filename: Option<String>,
}

impl Flags {
    /// Create a flags instance from commandline arguments.
    pub fn new(matches: ArgMatches) -> Flags {
        Flags {
            verbosity: matches.occurrences_of("v"),
            memory_usage_breakdown: matches.is_present("MEMORY_USAGE_BREAKDOWN"),
            limits: Limits {
                max_formula_nodes: parse_limit(&matches, "MAX_NODES", "--max-nodes"),
                max_branches: parse_limit(&matches, "MAX_BRANCHES", "--max-branches"),
            },
            input_filename: matches.value_of("INPUT").map(String::from),
            expression: matches.value_of("EXPRESSION").map(String::from),
            claims_filename: matches.value_of("CLAIMS_FILE").map(String::from),
        }
    }
    /// Describe where the sequent on the given line came from.
    fn location(&self, line: usize) -> String {
        match &self.input_filename {
            Some(filename) => format!("{}:{}", filename, line),
            None => "expression".to_string(),
        }
    }
}

/// Parse the numeric value of an option.
fn parse_limit(matches: &ArgMatches, name: &str, option: &str) -> Option<usize> {
    matches.value_of(name).map(|value| {
        value
            .parse()
            .unwrap_or_else(|_| die!("invalid value for {}: {}", option, value))
    })
}

/// Read the sequents given by the flags, with their line numbers.
fn read_sequents(flags: &Flags) -> Vector<(usize, Sequent)> {
    if let Some(text) = &flags.expression {
        let sequent = parse_sequent(text).unwrap_or_else(|err| die!("{}", err));
        return vector!((1, sequent));
    }
    let filename = match &flags.input_filename {
        Some(filename) => filename,
        None => die!("no input given"),
    };
    let stdin = io::stdin();
    let mut input =
        read_compressed_file_or_stdin(filename, stdin.lock()).unwrap_or_else(|err| die!("{}", err));
    let sequents = parse_sequents(&mut input).unwrap_or_else(|err| die!("{}: {}", filename, err));
    if sequents.is_empty() {
        comment!("{} contains no sequents", filename);
    }
    sequents
}

/// Write the decided sequents as claims document, if requested.
fn write_claims(flags: &Flags, claims: &Claims) -> io::Result<()> {
    let stdout = io::stdout();
    let mut file = match &flags.claims_filename {
        Some(filename) => open_file_for_writing(filename, &stdout)?,
        None => return Ok(()),
    };
    let text = claims
        .to_toml()
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
    writeln!(file, "# Verdicts of the tableau, check with sequent-check")?;
    write!(file, "{}", text)?;
    file.flush()
}

/// Print the memory used for the sequents and the claims.
fn print_memory_usage(flags: &Flags, sequents: &Vector<(usize, Sequent)>, claims: &Claims) {
    let usages = vec![
        (
            "sequents",
            sequents.capacity() * size_of::<(usize, Sequent)>()
                + sequents
                    .iter()
                    .map(|(_line, sequent)| sequent.heap_space())
                    .sum::<usize>(),
        ),
        (
            "claims",
            claims.claim.capacity() * size_of::<Claim>()
                + claims
                    .claim
                    .iter()
                    .map(|claim| claim.sequent.capacity())
                    .sum::<usize>(),
        ),
    ];
    let total = usages.iter().fold(0, |sum, pair| sum + pair.1);
    print_key_value("memory (KB)", format_memory_usage(total));
    if !flags.memory_usage_breakdown {
        return;
    }
    for pair in usages {
        print_key_value(
            &format!("memory-{}", pair.0.replace("_", "-")),
            format_memory_usage(pair.1),
        );
    }
}
