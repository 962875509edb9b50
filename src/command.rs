use std::{io::Write, str::FromStr};

use crate::error::TPlanError;
use crate::indexed_pq::IndexedPriorityQueue;

/// Thin wrapper for the tokens of a command line with an API to get values
/// from the line easily
struct Args<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> From<&'a str> for Args<'a> {
    fn from(line: &'a str) -> Self {
        Self {
            tokens: line.split_whitespace().collect(),
        }
    }
}

impl<'a> Args<'a> {
    /// Get the token at `index`.
    /// Returns an error if the line is too short
    fn get(&self, index: usize) -> Result<&'a str, TPlanError> {
        if let Some(&token) = self.tokens.get(index) {
            Ok(token)
        } else {
            log::debug!("Argument {} not specified", index);
            Err(TPlanError::BadInput {
                message: format!("Missing argument {}", index)
            })
        }
    }

    /// Get the token at `index`.
    /// Returns an error if the line is too short or
    /// if the token cannot be parsed to the specified type `F`.
    fn get_and_parse<F: FromStr>(&self, index: usize) -> Result<F, TPlanError> {
        let token = self.get(index)?;
        if let Ok(val) = token.parse::<F>() {
            Ok(val)
        } else {
            log::debug!("Cannot parse argument {} from {}", index, token);
            Err(TPlanError::BadInput {
                message: format!("Invalid value for argument {}: '{}'", index, token)
            })
        }
    }

    /// Returns an error unless the line consists of exactly `arity` tokens
    fn expect_len(&self, arity: usize) -> Result<(), TPlanError> {
        if self.tokens.len() == arity {
            Ok(())
        } else {
            Err(TPlanError::BadInput {
                message: format!("Expected {} tokens, got {}", arity, self.tokens.len())
            })
        }
    }
}

/// A single command of the interactive priority queue driver.
/// Ids are kept signed so that negative ids reach the queue and fail there.
#[derive(Debug, PartialEq)]
pub enum Command {
    Insert { id: i64, priority: f64 },
    Change { id: i64, priority: f64 },
    DeleteTop,
    Remove { id: i64 },
    GetPriority { id: i64 },
    Print,
    Size,
    Quit,
}

impl FromStr for Command {
    type Err = TPlanError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let args = Args::from(line);
        let cmd = args.get(0)?;

        let command = match cmd {
            "i" => Self::Insert { id: args.get_and_parse(1)?, priority: args.get_and_parse(2)? },
            "c" => Self::Change { id: args.get_and_parse(1)?, priority: args.get_and_parse(2)? },
            "d" => Self::DeleteTop,
            "r" => Self::Remove { id: args.get_and_parse(1)? },
            "g" => Self::GetPriority { id: args.get_and_parse(1)? },
            "p" => Self::Print,
            "s" => Self::Size,
            "q" => Self::Quit,
            _ => {
                return Err(TPlanError::BadInput {
                    message: format!("Unknown command '{}'", cmd)
                });
            }
        };
        args.expect_len(command.arity())?;

        Ok(command)
    }
}

impl Command {
    /// Number of tokens including the command letter
    fn arity(&self) -> usize {
        match self {
            Self::Insert { .. } | Self::Change { .. } => 3,
            Self::Remove { .. } | Self::GetPriority { .. } => 2,
            _ => 1,
        }
    }
}

/// Convert a user supplied id to a queue key. Negative ids map to a key that is
/// out of range for every queue.
fn to_key(id: i64) -> usize {
    usize::try_from(id).unwrap_or(usize::MAX)
}

/// Execute `command` on `queue` and report the outcome to `out`.
/// Returns `true` if the driver should quit.
pub fn execute<W: Write>(queue: &mut IndexedPriorityQueue, command: &Command, out: &mut W) -> Result<bool, TPlanError> {
    match *command {
        Command::Insert { id, priority } => match queue.insert(to_key(id), priority) {
            Ok(()) => writeln!(out, "  insert successful")?,
            Err(err) => {
                log::debug!("Insert failed: {}", err);
                writeln!(out, "  insert failed")?
            }
        },
        Command::Change { id, priority } => match queue.change_priority(to_key(id), priority) {
            Ok(()) => writeln!(out, "  change successful")?,
            Err(err) => {
                log::debug!("Change failed: {}", err);
                writeln!(out, "  change failed")?
            }
        },
        Command::DeleteTop => match queue.delete_top() {
            Ok((key, priority)) => writeln!(out, "  delete_top: id = {} priority = {:.6}", key, priority)?,
            Err(_) => writeln!(out, "  delete_top failed")?,
        },
        Command::Remove { id } => match queue.remove(to_key(id)) {
            Ok(()) => writeln!(out, "  {} is outta here!", id)?,
            Err(err) => {
                log::debug!("Remove failed: {}", err);
                writeln!(out, "  could not remove {}!", id)?
            }
        },
        Command::GetPriority { id } => match queue.get_priority(to_key(id)) {
            Some(priority) => writeln!(out, "  priority of id {} is {:.6}", id, priority)?,
            None => writeln!(out, "  bad id")?,
        },
        Command::Print => write!(out, "{}", queue)?,
        Command::Size => writeln!(out, "  len: {}", queue.len())?,
        Command::Quit => {
            writeln!(out, "  goodbye...")?;
            return Ok(true);
        }
    }

    Ok(false)
}

/// Parse and execute one input line. Blank lines are ignored, unparsable lines
/// are answered with an error message.
/// Returns `true` if the driver should quit.
pub fn execute_line<W: Write>(queue: &mut IndexedPriorityQueue, line: &str, out: &mut W) -> Result<bool, TPlanError> {
    if line.trim().is_empty() {
        return Ok(false);
    }

    match line.parse::<Command>() {
        Ok(command) => execute(queue, &command, out),
        Err(err) => {
            log::debug!("Bad command {:?}: {}", line.trim(), err);
            writeln!(out, "    bad command. try again")?;
            Ok(false)
        }
    }
}
