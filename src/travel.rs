use std::io::{BufRead, Write};

use crate::error::TPlanError;
use crate::graph::{Graph, GraphView};
use crate::shortest_path::ShortestPathReport;

/// How a travel planner session ended
#[derive(Debug, PartialEq)]
pub enum TravelOutcome {
    Arrived { travelled: f64, optimal: f64 },
    GaveUp,
    Unreachable,
}

/// Interactive session that guides a user through `graph` towards a destination,
/// reading choices from `input` and writing prompts to `output`
pub struct TravelPlanner<'g, R, W> {
    graph: &'g Graph,
    input: R,
    output: W,
}

impl<'g, R: BufRead, W: Write> TravelPlanner<'g, R, W> {
    pub fn new(graph: &'g Graph, input: R, output: W) -> Self {
        Self {
            graph,
            input,
            output,
        }
    }

    /// Run a complete session. End of input at any prompt counts as giving up.
    pub fn run(&mut self) -> Result<TravelOutcome, TPlanError> {
        let graph = self.graph;
        writeln!(self.output, "Welcome to travel planner.\n")?;
        writeln!(self.output, "Vertices:\n")?;
        writeln!(self.output, "\t{}\n", graph.names().join(" "))?;

        let loc = match self.prompt_location("SELECT YOUR CURRENT LOCATION:\t")? {
            Some(loc) => loc,
            None => return Ok(TravelOutcome::GaveUp),
        };
        let dest = match self.prompt_location("SELECT YOUR DESTINATION     :\t")? {
            Some(dest) => dest,
            None => return Ok(TravelOutcome::GaveUp),
        };
        writeln!(self.output)?;

        // Paths are computed towards the destination, so every vertex knows its next move
        let report = graph.shortest_paths_from(&dest)?;
        let route = report.route_names_from(&loc)?;
        if !route.is_reachable() {
            log::info!("{} cannot be reached from {}", dest, loc);
            writeln!(self.output, "Your destination is unreachable.\nGOODBYE.")?;
            return Ok(TravelOutcome::Unreachable);
        }

        writeln!(self.output, "You can reach your destination in {:.2} units.\n", route.dist)?;
        writeln!(self.output, "SHORTEST PATH:")?;
        let (last, rest) = route.nodes.split_last()
            .ok_or_else(|| TPlanError::Internal { message: "Empty route".to_string() })?;
        for name in rest {
            writeln!(self.output, "\t{} ->", name)?;
        }
        writeln!(self.output, "\t{}\n", last)?;
        writeln!(self.output, "TIME TO TRAVEL!")?;

        let outcome = match self.travel(&report, &loc)? {
            Some(travelled) => {
                writeln!(self.output, "\nYOU MADE IT.")?;
                writeln!(self.output, "(OPTIMAL DISTANCE: {:.2})", route.dist)?;
                writeln!(self.output, "GOODBYE.")?;
                TravelOutcome::Arrived { travelled, optimal: route.dist }
            }
            None => {
                writeln!(self.output, "THAT'S OK.\nGOODBYE.")?;
                TravelOutcome::GaveUp
            }
        };
        log::info!("Travel session from {} to {} ended: {:?}", loc, dest, outcome);

        Ok(outcome)
    }

    /// Move from `loc` to the source of `report` one user choice at a time.
    /// Returns the travelled distance, or `None` if the user gave up.
    fn travel(&mut self, report: &ShortestPathReport<'_, Graph>, loc: &str) -> Result<Option<f64>, TPlanError> {
        let graph = self.graph;
        let dest_id = report.source();
        let mut cur = graph.id_of(loc)
            .ok_or_else(|| TPlanError::Internal { message: format!("Unknown location {}", loc) })?;
        let mut travelled = 0.0;

        while cur != dest_id {
            let next = report.next_hop(cur)
                .ok_or_else(|| TPlanError::Internal {
                    message: format!("No move from {} towards the destination", cur)
                })?;
            let remaining = report.distance(cur).unwrap_or_default();
            let edges = graph.neighbors(cur);

            writeln!(self.output, "CURRENT LOCATION:\t{}", name(graph, cur))?;
            writeln!(self.output, "DESTINATION     :\t{}", name(graph, dest_id))?;
            writeln!(self.output, "MINIMUM DISTANCE TO DESTINATION:\t{:.2}\n", remaining)?;
            writeln!(self.output, "POSSIBLE MOVES:\n")?;
            writeln!(self.output, "\t0. I give up!")?;
            for (i, edge) in edges.iter().enumerate() {
                writeln!(self.output, "\t{}. {} ({:.2} units)", i + 1, name(graph, edge.tgt), edge.weight)?;
            }

            // With parallel edges only the lightest one lies on a shortest path
            let recommended = edges.iter()
                .enumerate()
                .filter(|(_, edge)| edge.tgt == next)
                .min_by(|(_, a), (_, b)| a.weight.total_cmp(&b.weight))
                .map(|(i, _)| i + 1)
                .unwrap_or_default();
            writeln!(self.output, "RECOMMENDED MOVE:\t{}. {}\n", recommended, name(graph, next))?;

            let choice = match self.read_choice(edges.len())? {
                Some(choice) if choice > 0 => choice,
                _ => return Ok(None),
            };
            let edge = &edges[choice - 1];
            travelled += edge.weight;
            cur = edge.tgt;
            writeln!(self.output, "\nTOTAL DISTANCE TRAVELED:\t{:.2} units", travelled)?;
        }

        Ok(Some(travelled))
    }

    /// Ask for a vertex name until a known one is entered.
    /// Returns `None` on end of input.
    fn prompt_location(&mut self, prompt: &str) -> Result<Option<String>, TPlanError> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            if self.graph.contains(&line) {
                return Ok(Some(line));
            }
            writeln!(self.output, "INVALID LOCATION")?;
        }
    }

    /// Ask for a move number in `0..=num_moves` until a valid one is entered.
    /// Returns `None` on end of input.
    fn read_choice(&mut self, num_moves: usize) -> Result<Option<usize>, TPlanError> {
        loop {
            write!(self.output, "SELECT A MOVE (ENTER A NUMBER):\t")?;
            self.output.flush()?;

            let line = match self.read_line()? {
                Some(line) => line,
                None => return Ok(None),
            };
            match line.parse::<usize>() {
                Ok(choice) if choice <= num_moves => return Ok(Some(choice)),
                _ => writeln!(self.output, "ERROR: INVALID CHOICE")?,
            }
        }
    }

    /// Read one trimmed line, `None` on end of input
    fn read_line(&mut self) -> Result<Option<String>, TPlanError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn name(graph: &Graph, node_id: usize) -> &str {
    graph.name_of(node_id).unwrap_or(" ")
}
