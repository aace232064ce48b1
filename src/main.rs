fn main() {
    if let Err(err) = qllama::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
