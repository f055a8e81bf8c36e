//! Project ID generation with date-based sequencing.

use anyhow::Result;
use chrono::NaiveDate;
use rand::Rng;
use std::path::Path;

const BASE36_CHARS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a new project ID in the format: YYYY-MM-DD-SSS-XXX
/// where SSS is a base36 sequence and XXX is a random base36 suffix.
pub fn generate_id(projects_dir: &Path, today: NaiveDate) -> Result<String> {
    let date = today.format("%Y-%m-%d").to_string();
    let seq = next_sequence_for_date(projects_dir, &date)?;
    Ok(compose_id(&date, seq))
}

/// Same as [`generate_id`], sequencing against IDs already known in memory.
pub fn generate_id_among<'a>(
    existing: impl IntoIterator<Item = &'a str>,
    today: NaiveDate,
) -> String {
    let date = today.format("%Y-%m-%d").to_string();
    let seq = existing
        .into_iter()
        .filter_map(|id| sequence_of(id, &date))
        .max()
        .unwrap_or(0)
        + 1;
    compose_id(&date, seq)
}

fn compose_id(date: &str, seq: u32) -> String {
    format!("{}-{}-{}", date, format_base36(seq, 3), random_base36(3))
}

/// Get the next sequence number for a given date.
fn next_sequence_for_date(projects_dir: &Path, date: &str) -> Result<u32> {
    let mut max_seq = 0u32;

    if projects_dir.exists() {
        for entry in std::fs::read_dir(projects_dir)? {
            let entry = entry?;
            let filename = entry.file_name();
            let name = filename.to_string_lossy();

            if let Some(stem) = name.strip_suffix(".md") {
                if let Some(seq) = sequence_of(stem, date) {
                    max_seq = max_seq.max(seq);
                }
            }
        }
    }

    Ok(max_seq + 1)
}

/// Sequence part of `id` when it was generated on `date`.
fn sequence_of(id: &str, date: &str) -> Option<u32> {
    if !id.starts_with(date) {
        return None;
    }
    // parts: [YYYY, MM, DD, SSS, XXX]
    let parts: Vec<&str> = id.split('-').collect();
    if parts.len() != 5 {
        return None;
    }
    parse_base36(parts[3])
}

/// Whether `s` has the shape of a generated project ID.
pub fn looks_like_id(s: &str) -> bool {
    let parts: Vec<&str> = s.split('-').collect();
    parts.len() == 5
        && NaiveDate::parse_from_str(&parts[..3].join("-"), "%Y-%m-%d").is_ok()
        && parse_base36(parts[3]).is_some()
        && parts[4].len() == 3
        && parse_base36(parts[4]).is_some()
}

/// Format a number as base36 with zero-padding.
pub fn format_base36(n: u32, width: usize) -> String {
    if n == 0 {
        return "0".repeat(width);
    }

    let mut result = Vec::new();
    let mut num = n;

    while num > 0 {
        let digit = (num % 36) as usize;
        result.push(BASE36_CHARS[digit] as char);
        num /= 36;
    }

    result.reverse();
    let s: String = result.into_iter().collect();

    if s.len() < width {
        format!("{:0>width$}", s, width = width)
    } else {
        s
    }
}

/// Parse a base36 string to a number.
fn parse_base36(s: &str) -> Option<u32> {
    if s.is_empty() {
        return None;
    }

    let mut result = 0u32;
    for c in s.chars() {
        let pos = BASE36_CHARS.iter().position(|&b| b as char == c)?;
        result = result.checked_mul(36)?.checked_add(pos as u32)?;
    }

    Some(result)
}

/// Generate a random base36 string of the given length.
fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36_CHARS[rng.gen_range(0..36)] as char)
        .collect()
}
