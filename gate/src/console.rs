//! Operator console.
//!
//! A line-oriented check-in station: the operator types (or a keyboard-wedge
//! reader types) a scan code or a bare ticket id, reads the verdict, and
//! confirms the check-in.
//!
//! ```text
//! > 12345
//! Valid ticket. Ready to check in.
//!   Event:  Base Workshop Meet 3 (#0)
//!   Token:  #12345
//!   Owner:  0x1234...5678
//!   Status: Unused
//! > check-in
//! Ticket checked in successfully!
//! ```

use std::io;
use std::time::Duration;
use ticket_gate_core::{CHECKED_IN_MESSAGE, GateStation, SEPARATOR, Scanner, Ticket, Verdict};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// How long `scan` waits for a code by default.
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(30);

const HELP: &str = "\
Commands:
  <ticket id>           verify a token ID at this venue (manual input)
  <id>-<contract>-<net> verify a full scan code
  scan                  read one code from the configured reader
  check-in              check in the ticket shown as valid
  clear                 forget the current verdict
  help                  show this help
  quit                  leave the console";

const NO_SCANNER: &str = "No code reader configured. Enter the token ID manually.";

const SCAN_TIMED_OUT: &str = "No code was read. Scan again or enter the token ID manually.";

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A full scan code.
    Code(String),
    /// A bare ticket id for this venue.
    Manual(String),
    /// Read one code from the reader.
    Scan,
    /// Check in the held ticket.
    CheckIn,
    /// Forget the held verdict.
    Clear,
    /// Show the command list.
    Help,
    /// Leave the console.
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `None`.
    ///
    /// Keywords are matched case-insensitively before anything else; input
    /// containing the scan code separator is a full code, anything else a
    /// ticket id.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" => None,
            "quit" | "exit" => Some(Self::Quit),
            "check-in" | "checkin" => Some(Self::CheckIn),
            "scan" => Some(Self::Scan),
            "clear" => Some(Self::Clear),
            "help" | "?" => Some(Self::Help),
            _ if line.contains(SEPARATOR) => Some(Self::Code(line.to_string())),
            _ => Some(Self::Manual(line.to_string())),
        }
    }
}

/// Interactive station writing its reports to `W`.
pub struct Console<W> {
    station: GateStation,
    scanner: Option<Scanner>,
    scan_timeout: Duration,
    output: W,
}

impl<W: AsyncWrite + Unpin> Console<W> {
    /// Console over `station`, optionally reading codes through `scanner`.
    pub fn new(station: GateStation, scanner: Option<Scanner>, output: W) -> Self {
        Self {
            station,
            scanner,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
            output,
        }
    }

    /// Override how long `scan` waits for a code.
    #[must_use]
    pub fn with_scan_timeout(mut self, timeout: Duration) -> Self {
        self.scan_timeout = timeout;
        self
    }

    /// The underlying station.
    pub const fn station(&self) -> &GateStation {
        &self.station
    }

    /// Give back the output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Read commands from `input` until `quit` or end of input.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if reading input or writing output fails.
    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> io::Result<()> {
        self.write_line(HELP).await?;
        self.prompt().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Some(Command::Quit) => break,
                Some(command) => self.execute(command).await?,
                None => {}
            }
            self.prompt().await?;
        }

        if let Some(scanner) = self.scanner.as_mut() {
            scanner.stop().await;
        }
        tracing::info!("Console closed");
        Ok(())
    }

    /// Execute one command and write its report.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if writing output fails.
    pub async fn execute(&mut self, command: Command) -> io::Result<()> {
        let report = match command {
            Command::Code(code) => render_verdict(self.station.submit_code(&code).await),
            Command::Manual(ticket_id) => {
                render_verdict(self.station.submit_manual(&ticket_id).await)
            }
            Command::Scan => self.scan().await,
            Command::CheckIn => match self.station.check_in().await {
                Ok(ticket) => format!("{CHECKED_IN_MESSAGE}\n{}", render_ticket(&ticket)),
                Err(err) => {
                    tracing::warn!(error = %err, "Check-in refused");
                    err.operator_message().to_string()
                }
            },
            Command::Clear => {
                self.station.clear();
                "Cleared.".to_string()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Ok(()),
        };

        self.write_line(&report).await
    }

    async fn scan(&mut self) -> String {
        let Some(scanner) = self.scanner.as_mut() else {
            return NO_SCANNER.to_string();
        };

        let read = tokio::time::timeout(self.scan_timeout, scanner.scan_once()).await;
        match read {
            Ok(Ok(payload)) => render_verdict(self.station.submit_code(&payload).await),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "Scan failed");
                err.operator_message().to_string()
            }
            Err(_) => {
                scanner.stop().await;
                SCAN_TIMED_OUT.to_string()
            }
        }
    }

    async fn prompt(&mut self) -> io::Result<()> {
        self.output.write_all(b"> ").await?;
        self.output.flush().await
    }

    async fn write_line(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}

fn render_verdict(verdict: &Verdict) -> String {
    let message = verdict.operator_message();
    match verdict {
        Verdict::Valid(ticket) | Verdict::AlreadyUsed(ticket) => {
            format!("{message}\n{}", render_ticket(ticket))
        }
        Verdict::NotFound(identity) => format!("{message}\n  Code:   {identity}"),
        Verdict::MalformedInput { error, .. } => format!("{message}\n  ({error})"),
        Verdict::RegistryUnavailable { .. } => message.to_string(),
    }
}

fn render_ticket(ticket: &Ticket) -> String {
    let status = ticket
        .used_at
        .map_or_else(|| "Unused".to_string(), |at| format!("Used at {}", at.to_rfc3339()));

    format!(
        "  Event:  {} (#{})\n  Token:  #{}\n  Owner:  {}\n  Status: {status}",
        ticket.event_name,
        ticket.event_id,
        ticket.identity.ticket_id(),
        ticket.owner,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keywords() {
        assert_eq!(Command::parse("quit"), Some(Command::Quit));
        assert_eq!(Command::parse("  Check-In "), Some(Command::CheckIn));
        assert_eq!(Command::parse("scan"), Some(Command::Scan));
        assert_eq!(Command::parse("?"), Some(Command::Help));
        assert_eq!(Command::parse("   "), None);
    }

    #[test]
    fn test_parse_codes_and_ids() {
        assert_eq!(
            Command::parse("12345-0xabc-84532\r"),
            Some(Command::Code("12345-0xabc-84532".to_string()))
        );
        assert_eq!(
            Command::parse(" 12345 "),
            Some(Command::Manual("12345".to_string()))
        );
    }

    #[test]
    fn test_single_letters_are_ticket_ids() {
        for id in ["c", "s", "q"] {
            assert_eq!(Command::parse(id), Some(Command::Manual(id.to_string())));
        }
    }
}
