use sl_core::{PortAssignment, PortField};

use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  start              start the server
  stop               stop the server
  browser            open the web application in a browser
  ports <web> <data> set the ports used for the next start
  clear              clear the output
  status             show server state, ports and log file
  quit | exit        stop everything and leave
  help               show this list";

/// One line typed at the launcher prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Stop,
    Exit,
    Browser,
    Clear,
    Status,
    Ports(PortAssignment),
    Help,
}

impl FromStr for ConsoleCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(String::new());
        };

        let command = match verb.to_lowercase().as_str() {
            "start" => Self::Start,
            "stop" => Self::Stop,
            "quit" | "exit" => Self::Exit,
            "browser" | "open" => Self::Browser,
            "clear" => Self::Clear,
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "ports" => {
                let (Some(web), Some(data), None) = (words.next(), words.next(), words.next())
                else {
                    return Err("Usage: ports <web> <data>".to_string());
                };
                let web_port = PortField::Web
                    .parse(web)
                    .map_err(|_| PortField::Web.unavailable_message())?;
                let data_port = PortField::Data
                    .parse(data)
                    .map_err(|_| PortField::Data.unavailable_message())?;
                return Ok(Self::Ports(PortAssignment::new(web_port, data_port)));
            }
            other => return Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
        };

        match words.next() {
            None => Ok(command),
            Some(_) => Err(format!("'{verb}' takes no arguments")),
        }
    }
}
