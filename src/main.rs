use aeagle::config::CliArgs;
use aeagle::runner;
use log::{error, warn};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    let args = CliArgs::parse_args();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(args.get_log_level()))
        .format_target(false)
        .init();

    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        warn!("Interrupt received, stopping after the current step");
        flag.store(true, Ordering::SeqCst);
    }) {
        warn!("Unable to install interrupt handler: {e}");
    }

    let code = match runner::execute(&args, stop) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:#}");
            1
        }
    };
    process::exit(code);
}
