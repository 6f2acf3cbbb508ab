#![forbid(unsafe_code)]

fn main() {
    if let Err(error) = statebind_demo::run_from_env() {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}
