use anyhow::{bail, Result};

/// Inclusive TCP port range. `start > end` is a valid, empty range rather
/// than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Number of ports the range covers; zero when start > end.
    pub fn len(&self) -> u64 {
        if self.start > self.end {
            0
        } else {
            u64::from(self.end) - u64::from(self.start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Ports in ascending order; empty iterator for an empty range.
    pub fn iter(&self) -> impl Iterator<Item = u16> {
        self.start..=self.end
    }
}

/// Parse a comma-separated target list into host strings.
///
/// Entries are trimmed; empty segments (doubled or trailing commas) are
/// skipped. Duplicates are kept: each occurrence is scanned independently.
pub fn parse_targets(s: &str) -> Result<Vec<String>> {
    let targets: Vec<String> = s
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    if targets.is_empty() {
        bail!("no targets given: expected a comma-separated list of hosts");
    }
    Ok(targets)
}

/// Total tasks a scan will submit: |targets| x ports in range.
pub fn task_count(targets: &[String], range: PortRange) -> u64 {
    targets.len() as u64 * range.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_single_target() {
        let t = parse_targets("scanme.nmap.org").unwrap();
        assert_eq!(t, vec!["scanme.nmap.org"]);
    }

    #[test]
    fn parse_trims_and_skips_empty_segments() {
        let t = parse_targets(" 10.0.0.1 , example.com ,, 10.0.0.2, ").unwrap();
        assert_eq!(t, vec!["10.0.0.1", "example.com", "10.0.0.2"]);
    }

    #[test]
    fn parse_keeps_duplicates() {
        let t = parse_targets("a,a").unwrap();
        assert_eq!(t, vec!["a", "a"]);
    }

    #[test]
    fn empty_list_rejected() {
        assert!(parse_targets("").is_err());
        assert!(parse_targets(" , ,").is_err());
    }

    #[test]
    fn inverted_range_is_empty_not_error() {
        let r = PortRange::new(100, 10);
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
        assert_eq!(r.iter().count(), 0);
    }

    #[test]
    fn range_len_is_inclusive() {
        assert_eq!(PortRange::new(0, 100).len(), 101);
        assert_eq!(PortRange::new(80, 80).len(), 1);
        assert_eq!(PortRange::new(0, 65535).len(), 65536);
    }

    #[test]
    fn task_count_is_cartesian() {
        let targets = vec!["a".to_string(), "b".to_string()];
        assert_eq!(task_count(&targets, PortRange::new(1, 3)), 6);
        assert_eq!(task_count(&targets, PortRange::new(3, 1)), 0);
    }
}
