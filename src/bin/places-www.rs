// slog_scope's macros expand to slog's ones
#[macro_use]
extern crate slog;

use slog_scope::{error, info};
use structopt::StructOpt;

fn main() {
    let args = www::Args::from_args();
    let _guard = match places_www::logger::logger_init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    info!("starting places-www {}", env!("CARGO_PKG_VERSION"));
    if let Err(e) = www::runserver(&args) {
        error!("places-www stopped: {}", e);
        // flush the async logger before leaving
        drop(_guard);
        std::process::exit(1);
    }
}
