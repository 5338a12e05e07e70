fn main() {
    if let Err(err) = rankboard::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
