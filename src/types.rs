use serde::{Deserialize, Serialize};

/// Banner value recorded when a port accepted the connection but sent no
/// bytes before the read deadline. Distinguishes "connected, silent" from
/// "connected, talked".
pub const NO_RESPONSE_BANNER: &str = "No response";

/// One (host, port) unit of scan work. Consumed exactly once by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanTask {
    pub host: String,
    pub port: u16,
}

impl ScanTask {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// Outcome of probing one task. Exactly one is produced per submitted task.
///
/// Wire names match the JSON output format: `open` serializes as `success`
/// and `banner` is omitted entirely for closed ports.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ScanResult {
    pub target: String,
    pub port: u16,
    #[serde(rename = "success")]
    pub open: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl ScanResult {
    /// A successful probe. `banner` falls back to the no-response sentinel
    /// when the service stayed silent.
    pub fn open(task: &ScanTask, banner: Option<String>) -> Self {
        Self {
            target: task.host.clone(),
            port: task.port,
            open: true,
            banner: Some(banner.unwrap_or_else(|| NO_RESPONSE_BANNER.to_string())),
        }
    }

    /// All connection attempts failed.
    pub fn closed(task: &ScanTask) -> Self {
        Self {
            target: task.host.clone(),
            port: task.port,
            open: false,
            banner: None,
        }
    }
}

/// Aggregate scan outcome returned to the caller once the result sink drains.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ScanReport {
    /// Every submitted task produced exactly one result; this counts them all.
    pub total_scanned: u64,
    /// The subset of results with `open == true`, in arrival order.
    pub open: Vec<ScanResult>,
    pub elapsed_ms: u64,
    /// RFC3339 UTC timestamp taken when the scan started.
    pub started_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_result_defaults_to_sentinel_banner() {
        let task = ScanTask::new("127.0.0.1", 80);
        let res = ScanResult::open(&task, None);
        assert!(res.open);
        assert_eq!(res.banner.as_deref(), Some(NO_RESPONSE_BANNER));
    }

    #[test]
    fn closed_result_has_no_banner() {
        let task = ScanTask::new("127.0.0.1", 81);
        let res = ScanResult::closed(&task);
        assert!(!res.open);
        assert!(res.banner.is_none());
    }

    #[test]
    fn json_uses_success_and_omits_absent_banner() {
        let task = ScanTask::new("10.0.0.1", 22);
        let open = serde_json::to_value(ScanResult::open(&task, Some("SSH-2.0".into()))).unwrap();
        assert_eq!(open["success"], true);
        assert_eq!(open["banner"], "SSH-2.0");

        let closed = serde_json::to_value(ScanResult::closed(&task)).unwrap();
        assert_eq!(closed["success"], false);
        assert!(closed.get("banner").is_none());
    }
}
