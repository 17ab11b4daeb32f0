fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = cpwgen::cli::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
