use std::process::ExitCode;

use smart_rename::{cli, output as out, SmartRenameError};

mod app;
mod logging;

fn main() -> ExitCode {
    let args = cli::parse();
    match app::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            let code = e
                .downcast_ref::<SmartRenameError>()
                .map(SmartRenameError::code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}
