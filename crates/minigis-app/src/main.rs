//! Main application entry point (native).

#[cfg(feature = "native")]
fn main() {
    env_logger::init();
    log::info!("Starting miniGIS");

    let result = minigis_app::Args::parse(std::env::args().skip(1)).and_then(|args| minigis_app::run(&args));
    match result {
        Ok(summary) => {
            log::info!("{}", summary.status_line);
            println!("{:#}", summary.to_json());
        }
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("minigis is built without the `native` feature");
}
