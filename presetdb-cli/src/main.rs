//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = presetdb_cli::run() {
        eprintln!("presetdb: {err}");
        std::process::exit(1);
    }
}
