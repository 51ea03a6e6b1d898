//! Content-hash duplicate detection.
//!
//! Files are hashed with SHA-256 in fixed-size chunks, so memory stays
//! bounded regardless of file size. Hashes are written back into the
//! records (the lazily-filled `FileRecord::hash`).

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

use mergedown_shared::{DuplicateGroup, FileRecord, MergeError, Result};

/// Sentinel hash for files that could not be read.
///
/// Sentinel records are never grouped — two unreadable files are not
/// evidence of identical content.
pub const UNREADABLE_HASH: &str = "<unreadable>";

/// Chunk size for streamed hashing.
const HASH_CHUNK_BYTES: usize = 8192;

/// Compute the SHA-256 content hash of a file, streaming in fixed chunks.
pub fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| MergeError::io(path, e))?;
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; HASH_CHUNK_BYTES];

    loop {
        let read = file.read(&mut chunk).map_err(|e| MergeError::io(path, e))?;
        if read == 0 {
            break;
        }
        hasher.update(&chunk[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Group files by content hash, returning only groups with ≥ 2 members.
///
/// Fills each record's lazy `hash` field as a side effect; unreadable
/// files get [`UNREADABLE_HASH`] and are skipped. Groups come back in
/// first-seen order.
#[instrument(skip_all, fields(files = records.len()))]
pub fn detect_duplicates(records: &mut [FileRecord]) -> Vec<DuplicateGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();

    for (i, record) in records.iter_mut().enumerate() {
        let hash = match hash_file(&record.path) {
            Ok(hash) => hash,
            Err(e) => {
                warn!(path = %record.path.display(), error = %e, "could not hash file");
                record.hash = Some(UNREADABLE_HASH.to_string());
                continue;
            }
        };
        record.hash = Some(hash.clone());

        let bucket = buckets.entry(hash.clone()).or_default();
        if bucket.is_empty() {
            order.push(hash);
        }
        bucket.push(i);
    }

    let groups: Vec<DuplicateGroup> = order
        .into_iter()
        .filter_map(|hash| {
            let members = &buckets[&hash];
            (members.len() > 1).then(|| DuplicateGroup {
                hash,
                paths: members.iter().map(|&i| records[i].path.clone()).collect(),
            })
        })
        .collect();

    debug!(groups = groups.len(), "duplicate detection complete");
    groups
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::Utc;

    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("md-dedupe-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn record(path: PathBuf) -> FileRecord {
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        FileRecord {
            path,
            size,
            modified: Utc::now(),
            hash: None,
            preview: String::new(),
        }
    }

    #[test]
    fn identical_files_form_one_group() {
        let dir = temp_dir();
        let a = dir.join("a.md");
        let b = dir.join("b.md");
        let c = dir.join("c.md");
        std::fs::write(&a, "# same content\n").unwrap();
        std::fs::write(&b, "# same content\n").unwrap();
        std::fs::write(&c, "# different\n").unwrap();

        let mut records = vec![record(a.clone()), record(b.clone()), record(c)];
        let groups = detect_duplicates(&mut records);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].paths, vec![a, b]);
        // Hashes were filled lazily on every record
        assert!(records.iter().all(|r| r.hash.is_some()));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn distinct_files_yield_no_groups() {
        let dir = temp_dir();
        let a = dir.join("a.md");
        let b = dir.join("b.md");
        std::fs::write(&a, "one\n").unwrap();
        std::fs::write(&b, "two\n").unwrap();

        let mut records = vec![record(a), record(b)];
        assert!(detect_duplicates(&mut records).is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unreadable_files_get_sentinel_and_never_group() {
        let mut records = vec![
            record(PathBuf::from("/nonexistent/x.md")),
            record(PathBuf::from("/nonexistent/y.md")),
        ];
        let groups = detect_duplicates(&mut records);
        assert!(groups.is_empty());
        assert_eq!(records[0].hash.as_deref(), Some(UNREADABLE_HASH));
        assert_eq!(records[1].hash.as_deref(), Some(UNREADABLE_HASH));
    }

    #[test]
    fn streamed_hash_matches_for_large_content() {
        let dir = temp_dir();
        let a = dir.join("big-a.md");
        let b = dir.join("big-b.md");
        // Larger than one hash chunk to exercise the streaming loop
        let content = "line of text\n".repeat(2000);
        std::fs::write(&a, &content).unwrap();
        std::fs::write(&b, &content).unwrap();

        assert_eq!(hash_file(&a).unwrap(), hash_file(&b).unwrap());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
