//! Parsers for the output of platform tools.
//!
//! These are pure functions so they can be tested on every platform against
//! captured output, even though each one is only used on a single OS.

#![cfg_attr(not(any(target_os = "macos", target_os = "windows")), allow(dead_code))]

use crate::domain::{Protocol, SocketEntry};

/// Extract the port from an `address:port` string.
///
/// Handles multiple address formats:
/// - IPv4: "127.0.0.1:3000" or "*:8080"
/// - IPv6: "\[::1]:3000" or "\[fe80::1%4]:8080"
///
/// Wildcard ports (`*`) and unparseable ports yield `None`.
pub fn local_port(address: &str) -> Option<u16> {
    let port = if address.starts_with('[') {
        let bracket_end = address.find(']')?;
        address[bracket_end + 1..].strip_prefix(':')?
    } else {
        let last_colon = address.rfind(':')?;
        &address[last_colon + 1..]
    };
    port.parse().ok()
}

/// Parse the socket rows of `lsof -nP -i`.
///
/// Expected lsof output format:
/// ```text
/// COMMAND    PID  USER   FD   TYPE             DEVICE SIZE/OFF NODE NAME
/// node     34805  code   19u  IPv6 0x3d8015e195af1f3f      0t0  TCP [::1]:3000 (LISTEN)
/// Safari     812  code   25u  IPv4 0x1a2b3c4d5e6f7081      0t0  TCP 10.0.0.2:50123->17.253.1.1:443 (ESTABLISHED)
/// mDNSRespo  321  root    8u  IPv4 0x99aa88bb77cc66dd      0t0  UDP *:5353
/// ```
///
/// Rows without a numeric PID, a TCP/UDP node or a local port are skipped.
pub fn parse_lsof_sockets(output: &str) -> Vec<SocketEntry> {
    let mut entries = Vec::new();

    for line in output.lines().skip(1) {
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 9 {
            continue;
        }

        let pid: u32 = match columns[1].parse() {
            Ok(p) if p > 0 => p,
            _ => continue,
        };

        // The NODE column is followed by NAME and an optional (STATE)
        let Some(node) = columns
            .iter()
            .skip(2)
            .position(|c| *c == "TCP" || *c == "UDP")
            .map(|i| i + 2)
        else {
            continue;
        };
        let protocol = if columns[node] == "TCP" { Protocol::Tcp } else { Protocol::Udp };

        let Some(name) = columns.get(node + 1) else {
            continue;
        };
        let (local, peer) = match name.split_once("->") {
            Some((local, peer)) => (local, Some(peer)),
            None => (*name, None),
        };

        let port = match local_port(local) {
            Some(p) if p > 0 => p,
            _ => continue,
        };

        let listening = match protocol {
            Protocol::Tcp => columns.get(node + 2) == Some(&"(LISTEN)"),
            Protocol::Udp => peer.is_none(),
        };

        entries.push(SocketEntry::new(port, protocol, pid, listening));
    }

    entries
}

/// Parse the output of `netstat -ano`.
///
/// Example output:
/// ```text
/// Active Connections
///
///   Proto  Local Address          Foreign Address        State           PID
///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1020
///   TCP    192.168.1.5:50000      20.1.2.3:443           ESTABLISHED     5432
///   UDP    0.0.0.0:5353           *:*                                    2210
/// ```
///
/// PID 0 rows (TIME_WAIT and other kernel-owned sockets) are skipped.
pub fn parse_netstat_sockets(output: &str) -> Vec<SocketEntry> {
    let mut entries = Vec::new();

    for line in output.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();

        let (protocol, listening) = match parts.as_slice() {
            // State names are localised, so a zero foreign port also means LISTEN
            ["TCP", _, foreign, state, _] => (
                Protocol::Tcp,
                *state == "LISTENING" || local_port(foreign) == Some(0),
            ),
            ["UDP", _, foreign, _] => (Protocol::Udp, *foreign == "*:*"),
            _ => continue,
        };

        let port = match local_port(parts[1]) {
            Some(p) if p > 0 => p,
            _ => continue,
        };

        let pid: u32 = match parts[parts.len() - 1].parse() {
            Ok(p) if p > 0 => p,
            _ => continue,
        };

        entries.push(SocketEntry::new(port, protocol, pid, listening));
    }

    entries
}

/// One row of `tasklist /V /FO CSV /NH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasklistRow {
    pub image_name: String,
    pub pid: u32,
    /// `None` when tasklist reports `N/A`.
    pub user: Option<String>,
}

/// Parse the first process row of `tasklist /V /FO CSV /NH`.
///
/// Example output:
/// ```text
/// "node.exe","5432","Console","1","45,000 K","Running","DESKTOP\dev","0:00:01","N/A"
/// ```
///
/// The filter-miss message (`INFO: No tasks are running ...`) yields `None`.
pub fn parse_tasklist_csv(output: &str) -> Option<TasklistRow> {
    output.lines().find_map(|line| {
        let fields = parse_csv_line(line.trim());
        if fields.len() < 2 {
            return None;
        }

        let pid = fields[1].parse().ok()?;
        let user = fields
            .get(6)
            .filter(|u| !u.is_empty() && **u != "N/A")
            .map(|u| u.to_string());

        Some(TasklistRow {
            image_name: fields[0].to_string(),
            pid,
            user,
        })
    })
}

/// Parse a CSV line, handling quoted fields.
pub fn parse_csv_line(line: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut field_start: Option<usize> = None;

    for (i, c) in line.char_indices() {
        match c {
            '"' if in_quotes => {
                if let Some(start) = field_start.take() {
                    fields.push(&line[start..i]);
                }
                in_quotes = false;
            }
            '"' => {
                in_quotes = true;
                field_start = Some(i + 1);
            }
            ',' if !in_quotes => {
                if let Some(start) = field_start.take() {
                    fields.push(&line[start..i]);
                }
            }
            _ => {
                if field_start.is_none() && !in_quotes {
                    field_start = Some(i);
                }
            }
        }
    }

    if let Some(start) = field_start {
        if !in_quotes {
            fields.push(&line[start..]);
        }
    }

    fields
}
