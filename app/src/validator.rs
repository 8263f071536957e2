// ==============================================================================
// validator.rs - Workbook File Validation
// ==============================================================================
// Description: Checks the supplementary workbook before it is loaded (size,
//              extension, ZIP container magic) and fingerprints it
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// Security: Allowlist-only file types, magic number verification
// ==============================================================================

use anyhow::{Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const MAX_WORKBOOK_SIZE: u64 = 200 * 1024 * 1024; // 200 MB

/// Office Open XML workbooks are ZIP containers
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4b, 0x03, 0x04];

const ALLOWED_EXTENSIONS: [&str; 2] = ["xlsx", "xlsm"];

#[derive(Debug, Clone, Serialize)]
pub struct ValidatedWorkbook {
    pub file_name: String,
    pub extension: String,
    pub size: u64,
    pub hash_sha256: String,
    pub validated_at: chrono::DateTime<chrono::Utc>,
}

pub struct WorkbookValidator {
    max_file_size: u64,
}

impl WorkbookValidator {
    pub fn new() -> Self {
        Self {
            max_file_size: MAX_WORKBOOK_SIZE,
        }
    }

    pub fn with_max_size(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn validate(&self, path: &Path) -> Result<ValidatedWorkbook> {
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid workbook path: {:?}", path))?
            .to_string_lossy()
            .to_string();

        info!("Validating workbook: {}", file_name);

        // 1. Size check
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to read metadata for {:?}", path))?;
        let size = metadata.len();

        if size > self.max_file_size {
            anyhow::bail!(
                "Workbook too large: {} bytes (max: {} bytes)",
                size,
                self.max_file_size
            );
        }
        debug!("Size check passed: {} bytes", size);

        // 2. Extension check (allowlist)
        let extension = self.get_extension(&file_name)?;
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            anyhow::bail!("Invalid workbook type: .{}", extension);
        }
        debug!("Extension check passed: {}", extension);

        // 3. Magic number verification
        let magic = self.read_magic_number(path)?;
        if magic != ZIP_MAGIC {
            anyhow::bail!("Magic number mismatch for .{} file", extension);
        }
        debug!("Magic number check passed");

        // 4. Fingerprint
        let hash_sha256 = self.compute_sha256(path)?;
        info!("Workbook SHA-256: {}", hash_sha256);

        Ok(ValidatedWorkbook {
            file_name,
            extension,
            size,
            hash_sha256,
            validated_at: chrono::Utc::now(),
        })
    }

    fn get_extension(&self, file_name: &str) -> Result<String> {
        match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Ok(ext.to_lowercase()),
            _ => anyhow::bail!("No file extension found in {}", file_name),
        }
    }

    fn read_magic_number(&self, path: &Path) -> Result<[u8; 4]> {
        let mut file = File::open(path).context("Failed to open workbook")?;
        let mut buffer = [0u8; 4];
        file.read_exact(&mut buffer)
            .context("Workbook is shorter than a ZIP header")?;
        Ok(buffer)
    }

    fn compute_sha256(&self, path: &Path) -> Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; 8192];

        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl Default for WorkbookValidator {
    fn default() -> Self {
        Self::new()
    }
}
