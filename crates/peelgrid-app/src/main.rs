//! Main application entry point.

fn main() {
    env_logger::init();
    log::info!("Starting peelgrid");

    let options = peelgrid_app::AppOptions::from_args(std::env::args());
    if let Err(e) = pollster::block_on(peelgrid_app::App::run(options)) {
        log::error!("{}", e);
        eprintln!("peelgrid: {}", e);
        std::process::exit(1);
    }
}
