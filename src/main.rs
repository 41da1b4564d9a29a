use std::process::ExitCode;

fn main() -> ExitCode {
    match youtube_fetcher_lib::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
