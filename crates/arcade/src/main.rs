use std::process::ExitCode;

mod app;

fn main() -> ExitCode {
    let wiring = match app::build_app() {
        Ok(wiring) => wiring,
        Err(code) => return code,
    };
    app::run(wiring)
}
