use std::{env, process};

use proctor_ics::{cli, config::Config, logging};

fn main() {
    let args = cli::parse(env::args().skip(1).collect());

    if let Err(err) = logging::init() {
        eprintln!("{err}");
        process::exit(1);
    }

    let config = Config::resolve(args.data_dir.clone());

    if let Err(err) = proctor_ics::run(&args, &config) {
        tracing::error!("{err}");
        process::exit(1);
    }
}
