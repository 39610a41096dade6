//! The line-oriented policy file format shared by every policy kind.
//!
//! `#` starts a comment that runs to the end of the line, blank lines are skipped, and
//! every other line is a list of `:`-separated tokens. A line `horizon: <n>` switches the
//! epoch that subsequent lines apply to (1-based in the file, 0-based in memory).

use std::io::BufRead;

use crate::core::collection::FiniteCollection;
use crate::core::entity::{Entity, Kind};
use crate::error::{Error, Result};

#[derive(Debug)]
pub(crate) enum Record {
    Horizon(usize),
    Tokens(Vec<String>),
}

/// One meaningful line of a policy file with its 1-based line number.
#[derive(Debug)]
pub(crate) struct Line {
    pub number: usize,
    pub record: Record,
}

pub(crate) fn read_lines<R: BufRead>(reader: R) -> Result<Vec<Line>> {
    let mut lines = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let content = match line.find('#') {
            Some(comment) => &line[..comment],
            None => line.as_str(),
        };
        if content.trim().is_empty() {
            continue;
        }

        let tokens: Vec<String> = content.split(':').map(|t| t.trim().to_string()).collect();
        if tokens.iter().any(String::is_empty) {
            return Err(Error::parse(number, "empty token"));
        }

        let record = if tokens[0] == "horizon" {
            if tokens.len() != 2 {
                return Err(Error::parse(number, "expected `horizon: <n>`"));
            }
            let epoch: usize = tokens[1]
                .parse()
                .map_err(|_| Error::parse(number, format!("invalid horizon '{}'", tokens[1])))?;
            if epoch == 0 {
                return Err(Error::parse(number, "horizons are numbered from 1"));
            }
            Record::Horizon(epoch - 1)
        } else {
            Record::Tokens(tokens)
        };
        lines.push(Line { number, record });
    }
    Ok(lines)
}

/// Resolves a name read on `line` against a collection, keeping a shared handle to the
/// stored entity.
pub(crate) fn lookup<K: Kind>(
    collection: &FiniteCollection<K>,
    name: &str,
    line: usize,
) -> Result<Entity<K>> {
    collection
        .find(name)
        .cloned()
        .map_err(|err| err.at_line(line))
}

/// Validates an epoch switch against the number of epochs a policy holds.
pub(crate) fn check_epoch(line: usize, epoch: usize, slots: usize) -> Result<usize> {
    if epoch >= slots {
        return Err(Error::parse(
            line,
            format!("horizon {} exceeds the policy's {} epochs", epoch + 1, slots),
        ));
    }
    Ok(epoch)
}
