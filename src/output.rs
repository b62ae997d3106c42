use crate::types::ScanReport;
use anyhow::{Context, Result};
use std::io::Write;

/// Serialize the open-port subset as a pretty JSON array of
/// `{target, port, success, banner?}` records.
pub fn render_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(&report.open).context("failed to serialize scan results as JSON")
}

/// Write the human-readable summary: header counts plus one line per open
/// port with its banner.
pub fn write_summary(
    out: &mut impl Write,
    targets_display: &str,
    report: &ScanReport,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Scan Summary:")?;
    writeln!(out, "Targets: {targets_display}")?;
    writeln!(out, "Started at: {}", report.started_at)?;
    writeln!(out, "Total ports scanned: {}", report.total_scanned)?;
    writeln!(out, "Open ports: {}", report.open.len())?;
    writeln!(out, "Scan completed in: {} ms", report.elapsed_ms)?;
    for entry in &report.open {
        let banner = entry
            .banner
            .as_deref()
            .map(escape_banner)
            .unwrap_or_default();
        writeln!(out, "  {}:{}  {}", entry.target, entry.port, banner)?;
    }
    Ok(())
}

/// Keep each banner on one summary line.
fn escape_banner(banner: &str) -> String {
    banner.replace('\r', "\\r").replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ScanResult, ScanTask};

    fn sample_report() -> ScanReport {
        let open_task = ScanTask::new("127.0.0.1", 22);
        let mut report = ScanReport {
            total_scanned: 3,
            open: vec![ScanResult::open(&open_task, Some("SSH-2.0\r\n".into()))],
            elapsed_ms: 42,
            started_at: "2026-01-01T00:00:00Z".into(),
        };
        report.open.push(ScanResult::open(&ScanTask::new("127.0.0.1", 80), None));
        report
    }

    #[test]
    fn json_is_an_array_of_open_records() {
        let json = render_json(&sample_report()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        let arr = parsed.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["target"], "127.0.0.1");
        assert_eq!(arr[0]["port"], 22);
        assert_eq!(arr[0]["success"], true);
        assert_eq!(arr[0]["banner"], "SSH-2.0\r\n");
        assert_eq!(arr[1]["banner"], "No response");
    }

    #[test]
    fn summary_counts_and_escapes_banners() {
        let mut buf = Vec::new();
        write_summary(&mut buf, "127.0.0.1", &sample_report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Started at: 2026-01-01T00:00:00Z"));
        assert!(text.contains("Total ports scanned: 3"));
        assert!(text.contains("Open ports: 2"));
        assert!(text.contains("SSH-2.0\\r\\n"));
        assert!(!text.contains('\r'));
    }
}
