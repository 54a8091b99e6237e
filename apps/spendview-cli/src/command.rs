//! Shell commands read from stdin, one per line.

use anyhow::{anyhow, bail, Result};
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  all                  show transactions of every employee
  employee <id>        show transactions of one employee
  more                 load the next page (all employees only)
  approve <id>         approve a transaction
  unapprove <id>       revoke an approval
  reload               drop cached data and refetch the current view
  employees            list the employee picker
  help                 show this help
  quit                 exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    All,
    Employee(String),
    More,
    Approve(String),
    Unapprove(String),
    Reload,
    Employees,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            bail!("empty command");
        };
        let argument = words.next();
        if words.next().is_some() {
            bail!("too many arguments for '{}'", name);
        }

        let required = |what: &str| {
            argument
                .map(str::to_string)
                .ok_or_else(|| anyhow!("'{}' needs {}", name, what))
        };

        let command = match name.to_lowercase().as_str() {
            "all" => Command::All,
            "employee" => Command::Employee(required("an employee id")?),
            "more" => Command::More,
            "approve" => Command::Approve(required("a transaction id")?),
            "unapprove" => Command::Unapprove(required("a transaction id")?),
            "reload" => Command::Reload,
            "employees" => Command::Employees,
            "help" | "?" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => bail!("unknown command '{}' (try 'help')", other),
        };

        Ok(command)
    }
}
