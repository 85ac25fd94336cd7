fn main() {
    if let Err(err) = opsboard::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
