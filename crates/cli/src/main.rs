fn main() {
    if let Err(e) = modroute_cli::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
