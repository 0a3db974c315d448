//! Output formatting utilities for the CLI
//!
//! Probe reports are rendered as tables; everything else is a single
//! colored status line.

use std::io::Write;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use tabled::{settings::Style, Table, Tabled};

use crate::client::LmStudioClient;

/// Format per-port probe results as an ASCII table
///
/// `winner` marks the port the sweep would pick, if any.
pub fn format_probe_report(host: &str, report: &[(u16, bool)], winner: Option<u16>) -> String {
    if report.is_empty() {
        return "No candidate ports configured".to_string();
    }

    #[derive(Tabled)]
    struct ProbeRow {
        #[tabled(rename = "ADDRESS")]
        address: String,
        #[tabled(rename = "PORT")]
        port: u16,
        #[tabled(rename = "STATUS")]
        status: &'static str,
        #[tabled(rename = "SELECTED")]
        selected: &'static str,
    }

    let rows: Vec<ProbeRow> = report
        .iter()
        .map(|&(port, reachable)| ProbeRow {
            address: host.to_string(),
            port,
            status: if reachable { "LM Studio" } else { "-" },
            selected: if winner == Some(port) { "*" } else { "" },
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

/// Describe an established client
pub fn format_connection(client: &LmStudioClient) -> String {
    let creds = client.credentials();
    let mut output = String::new();
    output.push_str(&format!("Server: {}\n", client.base_url()));
    output.push_str(&format!("Client: {}\n", creds.client_identifier()));
    output.push_str(&format!("Credentials: {}\n", creds.kind()));
    output
}

/// Where a status line goes
#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

fn print_status(stream: Stream, color: Color, symbol: &str, msg: &str) {
    let mut out: Box<dyn Write> = match stream {
        Stream::Stdout => Box::new(std::io::stdout()),
        Stream::Stderr => Box::new(std::io::stderr()),
    };
    let _ = crossterm::execute!(
        out,
        SetForegroundColor(color),
        Print(symbol),
        Print(" "),
        ResetColor,
        Print(msg),
        Print("\n")
    );
}

/// Print a success message in green with a checkmark prefix
pub fn print_success(msg: &str) {
    print_status(Stream::Stdout, Color::Green, "✓", msg);
}

/// Print an error message in red to stderr
pub fn print_error(msg: &str) {
    print_status(Stream::Stderr, Color::Red, "✗", msg);
}

/// Print a warning message in yellow to stderr
pub fn print_warning(msg: &str) {
    print_status(Stream::Stderr, Color::Yellow, "⚠", msg);
}

/// Print an informational message in cyan
///
/// Progress notes go to stderr so stdout stays parseable.
pub fn print_info(msg: &str) {
    print_status(Stream::Stderr, Color::Cyan, "ℹ", msg);
}
