use std::{env, io, process};

use tplan_lib::travel::{TravelOutcome, TravelPlanner};

fn main() {
    tplan_lib::init_logger();

    let args: Vec<_> = env::args().collect();
    if args.len() != 2 {
        println!("usage:  travel <graph_file>");
        return;
    }

    let graph = match tplan_lib::load_graph(&args[1]) {
        Ok(graph) => graph,
        Err(err) => {
            log::error!("Failed to load graph from {}: {}", &args[1], err);
            eprintln!("travel: cannot load {}: {}", &args[1], err);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut planner = TravelPlanner::new(&graph, stdin.lock(), io::stdout());
    match planner.run() {
        Ok(TravelOutcome::Arrived { travelled, optimal }) =>
            log::info!("Arrived after {:.2} units, optimal {:.2}", travelled, optimal),
        Ok(outcome) => log::info!("Session ended: {:?}", outcome),
        Err(err) => {
            log::error!("{}: {}", err.name(), err);
            process::exit(1);
        }
    }
}
