use vitrine::ViewerConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::new().title("Vitrine: Relics");
    if let Err(e) = vitrine::run(config) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
