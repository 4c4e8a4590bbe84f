use chordear::config::TrainerConfig;
use chordear::runtime::native;
use log::error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Optional first argument: path to a JSON trainer config
    let config = match std::env::args().nth(1) {
        Some(path) => match TrainerConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Could not load config {}: {}", path, e);
                std::process::exit(2);
            }
        },
        None => TrainerConfig::default(),
    };

    if let Err(e) = native::start(config) {
        error!("{}", e);
        std::process::exit(1);
    }
}
