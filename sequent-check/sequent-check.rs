//! Verify claims documents listing sequents and their expected verdicts

use clap::Arg;
use std::io::{self, Read};

use sequent_common::{
    claims::{check_claims, Claims},
    config, die,
    output::{install_signal_handler, print_key_value, print_solution, Timer},
    parser::open_file,
    tableau::Tableau,
};

/// Run `sequent-check`.
fn main() {
    std::process::exit(run_frontend());
}

/// Run `sequent-check`, returning its exit code.
fn run_frontend() -> i32 {
    install_signal_handler();
    let mut app = clap::App::new("sequent-check")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Verify claims documents listing sequents and their expected verdicts")
        .arg(
            Arg::with_name("CLAIMS")
                .required(true)
                .help("claims file in TOML format, \"-\" for standard input"),
        );
    if config::ENABLE_LOGGING {
        app = app.arg(
            Arg::with_name("v")
                .short("v")
                .help("Verbose output. Print a line for each claim that holds."),
        );
    }
    let matches = app.get_matches();
    let claims_filename = matches.value_of("CLAIMS").unwrap();

    let timer = Timer::name("total time");
    let toml_str =
        read_claims_file(claims_filename).unwrap_or_else(|err| die!("Failed to read claims file: {}", err));
    let claims: Claims =
        toml::from_str(&toml_str).unwrap_or_else(|err| die!("Failed to parse claims file: {}", err));
    let mut tableau = Tableau::new();
    tableau.verbosity = matches.occurrences_of("v");
    let verified = check_claims(&claims, &mut tableau);
    print_key_value("claims", claims.claim.len());
    drop(timer);
    print_solution(if verified { "VERIFIED" } else { "NOT VERIFIED" });
    if verified {
        0
    } else {
        1
    }
}

/// Read the whole claims document into memory.
fn read_claims_file(filename: &str) -> io::Result<String> {
    let mut toml_str = String::new();
    if filename == "-" {
        io::stdin().read_to_string(&mut toml_str)?;
    } else {
        open_file(filename)?.read_to_string(&mut toml_str)?;
    }
    Ok(toml_str)
}
