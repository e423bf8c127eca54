mod anim;
mod app;
mod debug;
mod render;
mod robot;
mod scene;

fn main() {
    env_logger::init();
    log::info!("walkbot starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
