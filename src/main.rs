use std::process::ExitCode;

fn main() -> ExitCode {
    splice::cli::run()
}
