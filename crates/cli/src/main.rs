use std::process::ExitCode;

fn main() -> ExitCode {
    smartshelf_cli::run()
}
