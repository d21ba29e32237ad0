use clap::Parser;

use shelltest::cli::{build_config, init_logging, Cli};
use shelltest::driver::Driver;

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = match build_config(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("shelltest: Error: {err}");
            std::process::exit(2);
        }
    };

    if let Err(err) = Driver::new(config).run() {
        // Test failures are already reported by the Reporter's summary
        // line; only fatal (exit-2) errors get the "Error:" stderr banner.
        if !matches!(err, shelltest::error::TestError::TestsFailed { .. }) {
            eprintln!("shelltest: Error: {err}");
        }
        std::process::exit(err.exit_code());
    }
}
