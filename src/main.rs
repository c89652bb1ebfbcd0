mod args;
mod dash;

use clap::Parser;
use log::{debug, error};

use crate::args::Args;

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
    debug!("args: {:?}", args);

    if let Err(e) = dash::run_command(&args) {
        error!("{}", e);
        let js = dash::error_to_json(&e);
        println!("{}", serde_json::to_string_pretty(&js).unwrap_or_else(|_| js.to_string()));
        std::process::exit(1);
    }
}
