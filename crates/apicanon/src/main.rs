//! The `apicanon` executable.

fn main() {
    apicanon_cli::init_tracing();
    std::process::exit(apicanon_cli::run_cli(std::env::args().collect()));
}
