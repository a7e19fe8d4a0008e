use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn utc_compact_string(ts: DateTime<Utc>) -> String {
    ts.format("%Y%m%dT%H%M%SZ").to_string()
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open file for hashing: {}", path.display()))?;

    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 8192];

    loop {
        let count = file
            .read(&mut buf)
            .with_context(|| format!("failed to read file for hashing: {}", path.display()))?;
        if count == 0 {
            break;
        }
        hasher.update(&buf[..count]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

/// Writes pretty JSON to a sibling temp file and renames it over `path`, so a
/// reader never observes a half-written document.
pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let staging_path = staging_path_for(path);
    let result = write_staged(&staging_path, &data).and_then(|()| {
        fs::rename(&staging_path, path).with_context(|| {
            format!(
                "failed to move {} into place at {}",
                staging_path.display(),
                path.display()
            )
        })
    });
    if result.is_err() && staging_path.exists() {
        let _ = fs::remove_file(&staging_path);
    }
    result
}

fn write_staged(staging_path: &Path, data: &[u8]) -> Result<()> {
    let mut file = File::create(staging_path)
        .with_context(|| format!("failed to create json file: {}", staging_path.display()))?;
    file.write_all(data)
        .with_context(|| format!("failed to write json file: {}", staging_path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", staging_path.display()))?;
    file.sync_all()
        .with_context(|| format!("failed to flush json file: {}", staging_path.display()))
}

fn staging_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.json".to_string());
    path.with_file_name(format!(".{file_name}.tmp"))
}

/// Camel-cases a spreadsheet label: `"Control Rules"`, `"ControlRules"` and
/// `"control_rules"` all become `"controlRules"`.
pub fn camel_case(input: &str) -> String {
    let mut words = Vec::<String>::new();

    for token in input.split(|ch: char| !ch.is_alphanumeric()) {
        let mut current = String::new();
        let mut previous_lower = false;
        for ch in token.chars() {
            if ch.is_uppercase() && previous_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
            current.push(ch);
        }
        if !current.is_empty() {
            words.push(current);
        }
    }

    let mut out = String::with_capacity(input.len());
    for (index, word) in words.iter().enumerate() {
        let lower = word.to_lowercase();
        if index == 0 {
            out.push_str(&lower);
            continue;
        }
        let mut chars = lower.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}
