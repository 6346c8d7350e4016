//! Application Configuration
//!
//! This module provides configuration management for the application,
//! supporting YAML configuration files with sensible defaults.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Storage backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum StorageBackend {
    LocalDisk,
    Mock,
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::LocalDisk
    }
}

/// Metadata backend types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum MetadataBackend {
    SQLite,
    Mock,
}

impl Default for MetadataBackend {
    fn default() -> Self {
        MetadataBackend::SQLite
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Physical file storage configuration
    pub storage: StorageConfig,
    /// Metadata database configuration
    pub metadata: MetadataConfig,
    /// Session lifetime configuration
    pub session: SessionConfig,
    /// Upload acceptance policy
    pub upload: UploadConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Optional admin account seeded at startup
    pub bootstrap: Option<BootstrapConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Number of worker threads
    pub workers: usize,
    /// Maximum request body size in bytes
    pub max_payload_size: usize,
}

/// Physical storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage backend type
    pub backend: StorageBackend,
    /// Base directory under which per-user subdirectories live
    pub base_path: String,
}

/// Metadata backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Metadata backend type
    pub backend: MetadataBackend,
    /// Database file path
    pub db_path: String,
}

/// Session lifetime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds before an issued session expires
    pub ttl_seconds: u64,
}

/// Upload acceptance policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Minimum accepted file size in bytes (inclusive)
    pub min_size: u64,
    /// Maximum accepted file size in bytes (inclusive)
    pub max_size: u64,
    /// Maximum accepted filename length in characters
    pub max_filename_length: usize,
    /// Content types accepted after sniffing the file bytes
    pub allowed_types: Vec<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Path to log configuration file
    pub config_file: String,
}

/// Admin account created at startup when absent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    pub admin_username: String,
    pub admin_password: String,
}

impl AppConfig {
    /// Load configuration from file, use defaults if not found
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = "config.yaml";
        if Path::new(config_path).exists() {
            let content = fs::read_to_string(config_path)?;
            let config: AppConfig = serde_yaml::from_str(&content)?;
            info!("Loaded configuration from {}", config_path);
            Ok(config)
        } else {
            warn!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Create default configuration
    pub fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8085,
                workers: 4,
                max_payload_size: 16 * 1024 * 1024, // room for a 5MB file as base64
            },
            storage: StorageConfig {
                backend: StorageBackend::LocalDisk,
                base_path: "./data/uploads".to_string(),
            },
            metadata: MetadataConfig {
                backend: MetadataBackend::SQLite,
                db_path: "./data/file_vault.db".to_string(),
            },
            session: SessionConfig { ttl_seconds: 3600 },
            upload: UploadConfig {
                min_size: 1024,
                max_size: 5 * 1024 * 1024,
                max_filename_length: 255,
                allowed_types: vec![
                    "text/plain".to_string(),
                    "application/pdf".to_string(),
                    "image/jpeg".to_string(),
                    "image/png".to_string(),
                ],
            },
            logging: LoggingConfig {
                config_file: "server_log.yaml".to_string(),
            },
            bootstrap: None,
        }
    }
}
