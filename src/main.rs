use std::io::Write;
use std::process::ExitCode;

use textile_inventory::config::LedgerConfig;
use textile_inventory::errors::Error;
use textile_inventory::io;
use textile_inventory::types::{CsvLedger, LedgerStore, TransactionKind};

const USAGE: &str = "Usage: textile_inventory {receive|sell} <name> <quantity>
       textile_inventory {records|summary}";

enum Command<'a> {
    Record {
        kind: TransactionKind,
        name: &'a str,
        quantity: &'a str,
    },
    Records,
    Summary,
}

impl<'a> Command<'a> {
    fn parse(args: &'a [String]) -> Option<Self> {
        match args {
            [command, name, quantity] => {
                let kind = match command.as_str() {
                    "receive" => TransactionKind::Received,
                    "sell" => TransactionKind::Sold,
                    _ => return None,
                };
                Some(Command::Record {
                    kind,
                    name,
                    quantity,
                })
            }
            [command] if command == "records" => Some(Command::Records),
            [command] if command == "summary" => Some(Command::Summary),
            _ => None,
        }
    }
}

fn run(ledger: &mut CsvLedger, command: Command<'_>) -> Result<(), Error> {
    ledger.initialize()?;
    let mut stdout = std::io::stdout().lock();
    match command {
        Command::Record {
            kind,
            name,
            quantity,
        } => {
            let quantity = io::parse_quantity(quantity)?;
            ledger.append(name, kind, quantity)?;
            writeln!(stdout, "{kind} product added.")?;
        }
        Command::Records => io::write_transactions_to_csv(&mut stdout, &ledger.read_all()?)?,
        Command::Summary => io::write_summary_report(&mut stdout, &ledger.summarize()?)?,
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = Command::parse(&args) else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let mut ledger = CsvLedger::from_config(&LedgerConfig::default());
    match run(&mut ledger, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
