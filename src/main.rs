use clap::Parser;
use samformula::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
