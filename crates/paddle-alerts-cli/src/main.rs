use paddle_alerts_cli::run_cli;
use tracing::error;

fn main() {
    // Run CLI and handle errors
    if let Err(e) = run_cli() {
        error!(exit_code = e.exit_code(), "CLI error: {}", e);
        eprintln!("Error: {}", e);

        std::process::exit(e.exit_code());
    }
}
