use std::io;
use std::process::exit;

use certpeek::cli::Args;
use certpeek::config::InspectConfig;
use certpeek::{logging, InspectError};

fn main() {
    let args = Args::parse_normalized();

    if let Err(e) = logging::init_logger(args.log_level.into()) {
        eprintln!("failed to initialise logging: {}", e);
    }

    let config = match InspectConfig::from_args(&args) {
        Ok(config) => config,
        Err(err) => fatal(err),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = certpeek::inspect(&config, &mut out) {
        fatal(err);
    }

    exit(0);
}

fn fatal(err: InspectError) -> ! {
    eprintln!("error: {}", err);
    exit(1);
}
