use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use imapshell::cli::{self, Cli};
use imapshell::connect::ImapConnector;
use imapshell::prompt::TerminalPrompter;
use imapshell::session::Resolver;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let connector = ImapConnector::new()
        .timeout(cli.timeout())
        .debug(cli.debug);
    let mut resolver = Resolver::new(connector, TerminalPrompter);

    match cli::run(&cli.command, &mut resolver) {
        Ok(outcome) => {
            if let Some(notice) = outcome.notice {
                eprintln!("{}", notice);
            }
            let mut stdout = io::stdout().lock();
            if let Err(e) = stdout.write_all(&outcome.stdout).and_then(|_| stdout.flush()) {
                eprintln!("imapshell: could not write output: {}", e);
                return ExitCode::FAILURE;
            }
            ExitCode::from(outcome.exit_code)
        }
        Err(e) => {
            eprintln!("imapshell: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}
