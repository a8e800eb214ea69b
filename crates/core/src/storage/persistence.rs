//! Disk persistence for graph stores using bincode serialization.
//!
//! Snapshots are written with an atomic temp-file + rename to prevent
//! corruption on crash, and carry an 8-byte footer (4 magic bytes + CRC32
//! big-endian) that is verified on load before deserialization. A loaded
//! store is additionally run through [`GraphStore::validate`] so a snapshot
//! can never smuggle a broken invariant back into the process.

use crate::graph::GraphStore;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Magic bytes preceding the CRC32 footer, identifying adgraph snapshots.
const SNAPSHOT_CRC_MAGIC: &[u8; 4] = b"AGS1";

/// Save a store to `path` using bincode with an atomic write.
/// Layout: `[bincode payload][magic "AGS1"][u32 CRC32 BE]`.
pub fn save_store(store: &GraphStore, path: &Path) -> io::Result<()> {
    let bytes = bincode::serialize(store).map_err(|e| io::Error::other(e.to_string()))?;
    let crc = crc32fast::hash(&bytes);

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let mut output = Vec::with_capacity(bytes.len() + 8);
    output.extend_from_slice(&bytes);
    output.extend_from_slice(SNAPSHOT_CRC_MAGIC);
    output.extend_from_slice(&crc.to_be_bytes());

    // Atomic write: write to temp, then rename.
    let tmp = tmp_path(path);
    fs::write(&tmp, &output)?;
    fs::rename(&tmp, path)?;

    tracing::info!(
        "Saved graph snapshot {:?} ({} bytes, CRC32={:#010x})",
        path,
        bytes.len(),
        crc
    );
    Ok(())
}

/// Load a store from `path`, verifying the CRC32 footer and every store
/// invariant before returning it.
pub fn load_store(path: &Path) -> io::Result<GraphStore> {
    let raw = fs::read(path)?;

    if raw.len() < 8 || &raw[raw.len() - 8..raw.len() - 4] != SNAPSHOT_CRC_MAGIC {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("{:?} is not an adgraph snapshot (missing footer)", path),
        ));
    }
    let payload = &raw[..raw.len() - 8];
    let stored_crc = u32::from_be_bytes([
        raw[raw.len() - 4],
        raw[raw.len() - 3],
        raw[raw.len() - 2],
        raw[raw.len() - 1],
    ]);
    let computed_crc = crc32fast::hash(payload);
    if computed_crc != stored_crc {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Snapshot CRC32 mismatch: expected {:#010x}, got {:#010x}. File may be corrupted: {:?}",
                stored_crc, computed_crc, path
            ),
        ));
    }

    let store: GraphStore = bincode::deserialize(payload)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;

    store.validate().map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Snapshot {:?} failed validation: {}", path, e),
        )
    })?;

    tracing::info!(
        "Loaded graph snapshot {:?}: {} points, {} queries, {} edges",
        path,
        store.regular_count(),
        store.query_count(),
        store.edge_count()
    );
    Ok(store)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".tmp");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{QueryPoint, RegularPoint};
    use tempfile::TempDir;

    fn sample_store() -> GraphStore {
        let points = vec![
            RegularPoint {
                id: "node_1".into(),
                features: vec![0.0, 0.0],
            },
            RegularPoint {
                id: "node_2".into(),
                features: vec![1.0, 0.0],
            },
            RegularPoint {
                id: "node_3".into(),
                features: vec![0.0, 2.0],
            },
        ];
        let mut store = GraphStore::build(points, 2).unwrap();
        store
            .attach_query(QueryPoint {
                id: "ads_1".into(),
                features: vec![0.0, 0.0],
                weights: vec![1.0, 1.0],
                build_radius: 1.5,
            })
            .unwrap();
        store
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.bin");
        let store = sample_store();
        save_store(&store, &path).unwrap();
        let loaded = load_store(&path).unwrap();
        assert_eq!(loaded, store);
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("graph.bin");
        save_store(&sample_store(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_corrupted_payload_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.bin");
        save_store(&sample_store(), &path).unwrap();

        let mut raw = fs::read(&path).unwrap();
        raw[0] ^= 0xFF;
        fs::write(&path, &raw).unwrap();

        let err = load_store(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("CRC32"), "got: {err}");
    }

    #[test]
    fn test_missing_footer_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bogus.bin");
        fs::write(&path, b"junk").unwrap();
        let err = load_store(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_invalid_store_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.bin");
        let mut store = sample_store();
        store.edge_count += 1; // breaks the adjacency/edge-count invariant
        save_store(&store, &path).unwrap();
        let err = load_store(&path).unwrap_err();
        assert!(err.to_string().contains("validation"), "got: {err}");
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.bin");
        save_store(&sample_store(), &path).unwrap();
        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
