//! Server health probe
//!
//! Reports database reachability plus host resource usage. Resource
//! collection is thin glue behind the `SystemProbe` trait; anything that
//! cannot be read simply reports N/A instead of failing the request.

use log::error;
use serde::Serialize;
use std::sync::Arc;

use crate::metadata::FileMetadataStore;

/// Host resource lookups consumed by the health endpoint.
pub trait SystemProbe: Send + Sync {
    fn cpu_usage(&self) -> Option<String>;
    fn memory_usage(&self) -> Option<String>;
    fn disk_space_available(&self) -> Option<String>;
}

/// Reads resource figures from the host (Linux procfs and `df`).
pub struct HostProbe;

impl SystemProbe for HostProbe {
    fn cpu_usage(&self) -> Option<String> {
        let loadavg = std::fs::read_to_string("/proc/loadavg").ok()?;
        let one_minute = loadavg.split_whitespace().next()?;
        Some(format!("{}% (1min avg)", one_minute))
    }

    fn memory_usage(&self) -> Option<String> {
        let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
        let field = |name: &str| -> Option<u64> {
            meminfo
                .lines()
                .find(|l| l.starts_with(name))?
                .split_whitespace()
                .nth(1)?
                .parse()
                .ok()
        };
        let total_kb = field("MemTotal:")?;
        let available_kb = field("MemAvailable:")?;
        if total_kb == 0 {
            return None;
        }
        let used_kb = total_kb.saturating_sub(available_kb);
        let to_gb = |kb: u64| kb as f64 / 1024.0 / 1024.0;
        let percent = (used_kb as f64 / total_kb as f64 * 100.0).round();
        Some(format!(
            "{:.2} GB / {:.2} GB ({}% used)",
            to_gb(used_kb),
            to_gb(total_kb),
            percent
        ))
    }

    fn disk_space_available(&self) -> Option<String> {
        let output = std::process::Command::new("df").args(["-k", "/"]).output().ok()?;
        if !output.status.success() {
            return None;
        }
        let text = String::from_utf8(output.stdout).ok()?;
        let available_kb: u64 = text
            .lines()
            .nth(1)?
            .split_whitespace()
            .nth(3)?
            .parse()
            .ok()?;
        Some(format!("{} GB", available_kb / (1024 * 1024)))
    }
}

/// Fixed figures for tests.
pub struct MockProbe;

impl SystemProbe for MockProbe {
    fn cpu_usage(&self) -> Option<String> {
        Some("0.42% (1min avg)".to_string())
    }
    fn memory_usage(&self) -> Option<String> {
        Some("1.00 GB / 4.00 GB (25% used)".to_string())
    }
    fn disk_space_available(&self) -> Option<String> {
        Some("100 GB".to_string())
    }
}

/// Snapshot returned by the health endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStatus {
    pub database_status: String,
    pub cpu_usage: String,
    pub memory_usage: String,
    pub disk_space_available: String,
}

pub struct HealthService {
    metadata: Arc<dyn FileMetadataStore>,
    probe: Arc<dyn SystemProbe>,
}

impl HealthService {
    pub fn new(metadata: Arc<dyn FileMetadataStore>, probe: Arc<dyn SystemProbe>) -> Self {
        Self { metadata, probe }
    }

    /// Collect a status snapshot. Never fails: unreachable collaborators
    /// show up in the report instead.
    pub fn status(&self) -> ServerStatus {
        let database_status = match self.metadata.ping() {
            Ok(()) => "ONLINE".to_string(),
            Err(e) => {
                error!("metadata store ping failed: {}", e);
                "OFFLINE".to_string()
            }
        };
        let or_na = |value: Option<String>| value.unwrap_or_else(|| "N/A".to_string());
        ServerStatus {
            database_status,
            cpu_usage: or_na(self.probe.cpu_usage()),
            memory_usage: or_na(self.probe.memory_usage()),
            disk_space_available: or_na(self.probe.disk_space_available()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::metadata::mock_store::MockFileMetadataStore;
    use crate::metadata::{FileMetadataStore, FileRecord};

    #[test]
    fn test_status_with_healthy_backend() {
        let service = HealthService::new(
            Arc::new(MockFileMetadataStore::new()),
            Arc::new(MockProbe),
        );
        let status = service.status();
        assert_eq!(status.database_status, "ONLINE");
        assert_eq!(status.cpu_usage, "0.42% (1min avg)");
        assert_eq!(status.disk_space_available, "100 GB");
    }

    struct DeadMetadataStore;

    impl FileMetadataStore for DeadMetadataStore {
        fn insert(&self, _record: &FileRecord) -> Result<(), StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        fn find(&self, _owner: &str, _filename: &str) -> Result<Option<FileRecord>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        fn list_by_owner(&self, _owner: &str) -> Result<Vec<FileRecord>, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        fn delete(&self, _owner: &str, _filename: &str) -> Result<usize, StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
        fn ping(&self) -> Result<(), StoreError> {
            Err(StoreError::Backend("down".to_string()))
        }
    }

    struct BlindProbe;

    impl SystemProbe for BlindProbe {
        fn cpu_usage(&self) -> Option<String> {
            None
        }
        fn memory_usage(&self) -> Option<String> {
            None
        }
        fn disk_space_available(&self) -> Option<String> {
            None
        }
    }

    #[test]
    fn test_status_degrades_instead_of_failing() {
        let service = HealthService::new(Arc::new(DeadMetadataStore), Arc::new(BlindProbe));
        let status = service.status();
        assert_eq!(status.database_status, "OFFLINE");
        assert_eq!(status.cpu_usage, "N/A");
        assert_eq!(status.memory_usage, "N/A");
        assert_eq!(status.disk_space_available, "N/A");
    }

    #[test]
    fn test_serialized_field_names() {
        let status = ServerStatus {
            database_status: "ONLINE".to_string(),
            cpu_usage: "1".to_string(),
            memory_usage: "2".to_string(),
            disk_space_available: "3".to_string(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("databaseStatus").is_some());
        assert!(json.get("cpuUsage").is_some());
        assert!(json.get("memoryUsage").is_some());
        assert!(json.get("diskSpaceAvailable").is_some());
    }
}
