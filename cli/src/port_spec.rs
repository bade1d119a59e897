//! Parsing of textual port sets such as `3000, 8000-8002`.

use std::collections::BTreeSet;

/// The outcome of parsing a port set specification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSpec {
    /// Valid ports, deduplicated and ascending.
    pub ports: Vec<u16>,
    /// Tokens that were not a port or an inclusive `start-end` range.
    pub rejected: Vec<String>,
}

/// Parse a comma-separated list of ports and inclusive ranges.
///
/// Only values within 1-65535 are accepted and a range needs `start <= end`.
/// Invalid tokens are collected in [`PortSpec::rejected`] and skipped.
pub fn parse(spec: &str) -> PortSpec {
    let mut ports = BTreeSet::new();
    let mut rejected = Vec::new();

    for token in spec.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        match parse_token(token) {
            Some((start, end)) => ports.extend(start..=end),
            None => rejected.push(token.to_string()),
        }
    }

    PortSpec {
        ports: ports.into_iter().collect(),
        rejected,
    }
}

fn parse_token(token: &str) -> Option<(u16, u16)> {
    let (start, end) = match token.split_once('-') {
        Some((start, end)) => (parse_port(start)?, parse_port(end)?),
        None => {
            let port = parse_port(token)?;
            (port, port)
        }
    };

    (start <= end).then_some((start, end))
}

fn parse_port(text: &str) -> Option<u16> {
    text.trim().parse::<u16>().ok().filter(|port| *port > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_and_range() {
        let spec = parse("3000, 8000-8002");
        assert_eq!(spec.ports, vec![3000, 8000, 8001, 8002]);
        assert!(spec.rejected.is_empty());
    }

    #[test]
    fn test_dedup_and_sort() {
        assert_eq!(parse("443,80,80,79-81").ports, vec![79, 80, 81, 443]);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let spec = parse("0,22,65536,70000-70001,9-3,abc,1-65535x");
        assert_eq!(spec.ports, vec![22]);
        assert_eq!(
            spec.rejected,
            vec!["0", "65536", "70000-70001", "9-3", "abc", "1-65535x"]
        );
    }

    #[test]
    fn test_full_range_bounds() {
        let spec = parse("65534-65535,1");
        assert_eq!(spec.ports, vec![1, 65534, 65535]);
    }

    #[test]
    fn test_empty() {
        assert_eq!(parse(" , ,"), PortSpec::default());
    }
}
