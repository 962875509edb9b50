use std::{env, io::{self, BufRead, Write}, process};

use tplan_lib::command;
use tplan_lib::error::TPlanError;
use tplan_lib::indexed_pq::{Direction, IndexedPriorityQueue};

/// Largest key space the driver is willing to allocate a queue for
const MAX_CAPACITY: usize = 1 << 24;

/// Settings for the interactive queue driver
#[derive(Debug)]
struct DriverSettings {
    direction: Direction,
    capacity: usize,
}

/// Parse the driver settings from the command line arguments
fn parse_settings(args: &[String]) -> Result<DriverSettings, TPlanError> {
    let mut settings = DriverSettings {
        direction: Direction::Max,
        capacity: 100,
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1)
            .ok_or_else(|| TPlanError::BadInput { message: format!("Missing value for {}", &args[i]) })?;
        match args[i].as_str() {
            "--dir" => {
                settings.direction = value.parse()
                    .map_err(|_| TPlanError::BadInput {
                        message: format!("Invalid direction '{}', expected one of {:?}",
                                         value, Direction::available_directions())
                    })?;
            }
            "--capacity" => {
                settings.capacity = value.parse::<usize>()
                    .ok()
                    .filter(|&capacity| capacity <= MAX_CAPACITY)
                    .ok_or_else(|| TPlanError::BadInput {
                        message: format!("Invalid capacity '{}', expected at most {}", value, MAX_CAPACITY)
                    })?;
            }
            _ => {
                return Err(TPlanError::BadInput { message: format!("Unknown argument: {}", &args[i]) });
            }
        }
        i += 2;
    }

    Ok(settings)
}

fn print_welcome(settings: &DriverSettings) {
    println!("\nWelcome to the simple service-queue interactive program");
    println!("   An empty {} queue of capacity {} has been created for you",
             settings.direction, settings.capacity);
    println!("   Commands:");
    println!("    d                 : delete top");
    println!("    r <id>            : remove specified id");
    println!("    g <id>            : get priority of id");
    println!("    p                 : print priority queue");
    println!("    s                 : get current queue size");
    println!("    i <id> <priority> : insert id and priority into the queue");
    println!("    c <id> <priority> : change priority of id in the queue");
    println!("    q                 : quit");
    println!("-----------------------------------\n");
}

fn run(settings: &DriverSettings) -> Result<(), TPlanError> {
    let mut queue = IndexedPriorityQueue::with_capacity(settings.capacity, settings.direction);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    print_welcome(settings);
    let mut lines = stdin.lock().lines();
    loop {
        write!(stdout, "cmd > ")?;
        stdout.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        if command::execute_line(&mut queue, &line, &mut stdout)? {
            break;
        }
    }

    Ok(())
}

fn main() {
    tplan_lib::init_logger();

    let args: Vec<_> = env::args().collect();
    let settings = match parse_settings(&args) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("usage:  pq_driver [--dir min|max] [--capacity N]");
            process::exit(2);
        }
    };
    log::info!("Starting queue driver with settings {:?}", settings);

    if let Err(err) = run(&settings) {
        log::error!("{}: {}", err.name(), err);
        process::exit(1);
    }
}
