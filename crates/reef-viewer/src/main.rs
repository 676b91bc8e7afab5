use std::process::ExitCode;

use reef_engine::ReefConfig;

fn main() -> ExitCode {
    match reef_engine::run(ReefConfig::default()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("fatal: {err}");
            eprintln!("{}", err.report());
            ExitCode::FAILURE
        }
    }
}
