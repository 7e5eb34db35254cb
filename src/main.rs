fn main() {
    if let Err(e) = intensity_tracing_lib::run() {
        eprintln!("Error: {}", e.message());
        std::process::exit(1);
    }
}
