//! Container metadata probe
//!
//! Local probe built on two optional command-line tools: `ffprobe` for
//! container/format metadata and `c2patool` for the embedded provenance
//! manifest. Either tool may be absent; the probe degrades to whatever it
//! can produce and only reports Unavailable when it can produce nothing.

use crate::models::VideoMetadata;
use crate::types::{MetadataProbe, ServiceError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// ffprobe `format` section (the subset the data model carries)
#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    tags: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Option<FfprobeFormat>,
}

/// Local container-metadata probe
pub struct FfprobeClient {
    ffprobe_bin: String,
    c2pa_bin: String,
}

impl FfprobeClient {
    pub fn new() -> Self {
        Self {
            ffprobe_bin: "ffprobe".to_string(),
            c2pa_bin: "c2patool".to_string(),
        }
    }

    /// Probe with explicit binary names (used by tests)
    pub fn with_binaries(ffprobe_bin: impl Into<String>, c2pa_bin: impl Into<String>) -> Self {
        Self {
            ffprobe_bin: ffprobe_bin.into(),
            c2pa_bin: c2pa_bin.into(),
        }
    }

    /// Whether `name` resolves to an executable on PATH
    fn binary_available(name: &str) -> bool {
        let Some(paths) = std::env::var_os("PATH") else {
            return false;
        };
        std::env::split_paths(&paths).any(|dir| dir.join(name).is_file())
    }

    async fn run_ffprobe(&self, path: &Path) -> Result<FfprobeOutput, ServiceError> {
        let output = tokio::process::Command::new(&self.ffprobe_bin)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await?;

        if !output.status.success() {
            return Err(ServiceError::Internal(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| ServiceError::Parse(e.to_string()))
    }

    /// Read the provenance manifest store, when the container carries one
    async fn run_c2pa(&self, path: &Path) -> Option<serde_json::Value> {
        if !Self::binary_available(&self.c2pa_bin) {
            tracing::debug!("c2patool not in PATH, skipping provenance manifest read");
            return None;
        }

        let output = tokio::process::Command::new(&self.c2pa_bin)
            .arg(path)
            .output()
            .await
            .ok()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("ManifestNotFound") || stderr.contains("no JUMBF data") {
                return None;
            }
            tracing::warn!(error = %stderr, "Provenance manifest read failed");
            return None;
        }

        serde_json::from_str(stdout.trim()).ok()
    }

    fn metadata_from_probe(
        probe: Option<FfprobeOutput>,
        manifest: Option<serde_json::Value>,
    ) -> VideoMetadata {
        let mut metadata = VideoMetadata {
            provenance_manifest: manifest,
            ..VideoMetadata::default()
        };

        if let Some(format) = probe.and_then(|p| p.format) {
            metadata.format = format.format_name;
            metadata.duration_seconds = format.duration.as_deref().and_then(|d| d.parse().ok());
            metadata.encoder = format
                .tags
                .get("encoder")
                .filter(|e| !e.is_empty() && e.as_str() != "unknown")
                .cloned();
            metadata.creation_time = format.tags.get("creation_time").cloned();
            metadata.device = format.tags.get("com.apple.quicktime.make").cloned();
        }

        metadata
    }
}

impl Default for FfprobeClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MetadataProbe for FfprobeClient {
    async fn probe(&self, video: &[u8]) -> Result<VideoMetadata, ServiceError> {
        let ffprobe_ok = Self::binary_available(&self.ffprobe_bin);
        let c2pa_ok = Self::binary_available(&self.c2pa_bin);
        if !ffprobe_ok && !c2pa_ok {
            return Err(ServiceError::NotAvailable(
                "neither ffprobe nor c2patool found in PATH".to_string(),
            ));
        }

        // Both tools want a file path; stage the bytes in a scratch file
        let scratch: PathBuf =
            std::env::temp_dir().join(format!("clipcheck-probe-{}.bin", Uuid::new_v4()));
        tokio::fs::write(&scratch, video).await?;

        let probe = if ffprobe_ok {
            match self.run_ffprobe(&scratch).await {
                Ok(output) => Some(output),
                Err(e) => {
                    tracing::warn!(error = %e, "ffprobe failed, continuing without container metadata");
                    None
                }
            }
        } else {
            tracing::debug!("ffprobe not in PATH, skipping container metadata");
            None
        };

        let manifest = self.run_c2pa(&scratch).await;

        if let Err(e) = tokio::fs::remove_file(&scratch).await {
            tracing::warn!(path = %scratch.display(), error = %e, "Failed to remove scratch file");
        }

        Ok(Self::metadata_from_probe(probe, manifest))
    }
}
