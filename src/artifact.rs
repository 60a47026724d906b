//! PRN binary model artifact: JSON metadata, tensor index, raw f32 data.
//!
//! Format (PRN1):
//! ```text
//! [4-byte magic: "PRN1"]
//! [4-byte metadata_len: u32 little-endian]
//! [JSON metadata: arbitrary key-value pairs]
//! [4-byte n_tensors: u32 little-endian]
//! [4-byte index_len: u32 little-endian]
//! [Tensor index: JSON array of descriptors]
//! [Raw tensor data: f32 values in little-endian]
//! [4-byte CRC32: checksum of all preceding bytes]
//! ```
//!
//! The checksum is verified on every read, and every descriptor is checked
//! against the data section before any tensor is sliced, so arbitrary bytes
//! decode to an [`crate::error::Error::ArtifactCorrupt`] rather than a panic.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Magic bytes for the PRN format.
pub const PRN_MAGIC: [u8; 4] = [b'P', b'R', b'N', b'1'];

/// Format revision recorded in metadata by writers.
pub const FORMAT_VERSION: u64 = 1;

/// Artifact metadata - arbitrary JSON keyed by string.
pub type Metadata = BTreeMap<String, JsonValue>;

/// Tensor descriptor in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorDescriptor {
    /// Tensor name
    pub name: String,
    /// Data type (only "F32" is defined)
    pub dtype: String,
    /// Shape dimensions
    pub shape: Vec<usize>,
    /// Byte offset in the data section
    pub offset: usize,
    /// Byte size
    pub size: usize,
}

/// PRN format reader.
///
/// Parsing validates the whole file up front: magic, checksum, JSON
/// sections, and every descriptor's bounds and shape. A constructed reader
/// can therefore hand out tensors without further structural checks.
#[derive(Debug)]
pub struct ArtifactReader {
    /// Parsed metadata
    pub metadata: Metadata,
    /// Tensor descriptors
    pub tensors: Vec<TensorDescriptor>,
    /// Data section bytes
    data: Vec<u8>,
    /// Where the artifact came from, for error messages
    path: String,
}

impl ArtifactReader {
    /// Loads an artifact from a file.
    ///
    /// # Errors
    ///
    /// [`Error::ArtifactNotFound`] when the path does not exist;
    /// [`Error::ArtifactCorrupt`] for any decode failure.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().display().to_string();
        let data = match fs::read(path.as_ref()) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ArtifactNotFound { path: path_str });
            }
            Err(e) => {
                return Err(Error::ArtifactCorrupt {
                    path: path_str,
                    reason: format!("read failed: {e}"),
                });
            }
        };
        Self::parse(data, path_str)
    }

    /// Parses an artifact from in-memory bytes.
    ///
    /// # Errors
    ///
    /// [`Error::ArtifactCorrupt`] for any decode failure.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        Self::parse(data, "<bytes>".to_string())
    }

    fn parse(data: Vec<u8>, path: String) -> Result<Self> {
        let corrupt = |reason: String| Error::ArtifactCorrupt {
            path: path.clone(),
            reason,
        };

        if data.len() < 4 {
            return Err(corrupt(format!("file too short: {} bytes", data.len())));
        }
        if data[0..4] != PRN_MAGIC {
            return Err(corrupt(format!(
                "bad magic: expected \"PRN1\", got {:?}",
                &data[0..4]
            )));
        }
        // Trailer check before structural parsing: a flipped byte anywhere
        // surfaces here.
        if data.len() < 20 {
            return Err(corrupt(format!(
                "file too short for header and checksum: {} bytes",
                data.len()
            )));
        }
        let body_len = data.len() - 4;
        let stored = u32::from_le_bytes([
            data[body_len],
            data[body_len + 1],
            data[body_len + 2],
            data[body_len + 3],
        ]);
        let computed = crc32fast::hash(&data[..body_len]);
        if stored != computed {
            return Err(corrupt(format!(
                "checksum mismatch (expected {stored:08x}, computed {computed:08x})"
            )));
        }

        let mut cursor = ByteReader::new(&data[4..body_len]);

        let metadata_len = cursor.read_u32("metadata length").map_err(&corrupt)? as usize;
        let metadata_bytes = cursor.take(metadata_len, "metadata").map_err(&corrupt)?;
        let metadata: Metadata = if metadata_len == 0 {
            BTreeMap::new()
        } else {
            serde_json::from_slice(metadata_bytes)
                .map_err(|e| corrupt(format!("metadata JSON: {e}")))?
        };

        let n_tensors = cursor.read_u32("tensor count").map_err(&corrupt)? as usize;
        let index_len = cursor.read_u32("index length").map_err(&corrupt)? as usize;
        let index_bytes = cursor.take(index_len, "tensor index").map_err(&corrupt)?;
        let tensors: Vec<TensorDescriptor> = if index_len == 0 {
            Vec::new()
        } else {
            serde_json::from_slice(index_bytes)
                .map_err(|e| corrupt(format!("tensor index JSON: {e}")))?
        };
        if tensors.len() != n_tensors {
            return Err(corrupt(format!(
                "tensor count mismatch: header says {n_tensors}, index has {}",
                tensors.len()
            )));
        }

        let section = cursor.rest();
        for desc in &tensors {
            if desc.dtype != "F32" {
                return Err(corrupt(format!(
                    "tensor '{}' has unsupported dtype '{}'",
                    desc.name, desc.dtype
                )));
            }
            let end = desc.offset.checked_add(desc.size);
            if end.is_none() || end.is_some_and(|e| e > section.len()) {
                return Err(corrupt(format!(
                    "tensor '{}' is out of bounds (offset {}, size {}, section {})",
                    desc.name,
                    desc.offset,
                    desc.size,
                    section.len()
                )));
            }
            // The dims are untrusted; an overflowed product never matches
            // a real size.
            let declared = desc
                .shape
                .iter()
                .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
                .and_then(|elems| elems.checked_mul(4));
            if declared != Some(desc.size) {
                return Err(corrupt(format!(
                    "tensor '{}' shape {:?} disagrees with size {}",
                    desc.name, desc.shape, desc.size
                )));
            }
        }

        let data_section = section.to_vec();
        Ok(Self {
            metadata,
            tensors,
            data: data_section,
            path,
        })
    }

    /// Metadata value by key.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&JsonValue> {
        self.metadata.get(key)
    }

    /// String metadata value, required to be present.
    ///
    /// # Errors
    ///
    /// [`Error::ArtifactCorrupt`] when the key is absent or not a string.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        self.metadata(key)
            .and_then(JsonValue::as_str)
            .ok_or_else(|| self.corrupt(format!("metadata key '{key}' missing or not a string")))
    }

    /// Integer metadata value, required to be present.
    ///
    /// # Errors
    ///
    /// [`Error::ArtifactCorrupt`] when the key is absent or not an integer.
    pub fn require_u64(&self, key: &str) -> Result<u64> {
        self.metadata(key)
            .and_then(JsonValue::as_u64)
            .ok_or_else(|| self.corrupt(format!("metadata key '{key}' missing or not an integer")))
    }

    /// Tensor names in index order.
    #[must_use]
    pub fn tensor_names(&self) -> Vec<&str> {
        self.tensors.iter().map(|t| t.name.as_str()).collect()
    }

    /// Shape of a tensor.
    ///
    /// # Errors
    ///
    /// [`Error::ArtifactCorrupt`] when the tensor is absent.
    pub fn tensor_shape(&self, name: &str) -> Result<&[usize]> {
        self.descriptor(name).map(|d| d.shape.as_slice())
    }

    /// Tensor values as f32.
    ///
    /// # Errors
    ///
    /// [`Error::ArtifactCorrupt`] when the tensor is absent.
    pub fn tensor_f32(&self, name: &str) -> Result<Vec<f32>> {
        let desc = self.descriptor(name)?;
        // Bounds were checked at parse time.
        let bytes = &self.data[desc.offset..desc.offset + desc.size];
        let values = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(values)
    }

    /// Total size of the data section in bytes.
    #[must_use]
    pub fn data_len(&self) -> usize {
        self.data.len()
    }

    /// Where this artifact was read from.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.path
    }

    fn descriptor(&self, name: &str) -> Result<&TensorDescriptor> {
        self.tensors
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| self.corrupt(format!("tensor not found: {name}")))
    }

    pub(crate) fn corrupt(&self, reason: String) -> Error {
        Error::ArtifactCorrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

/// Checked cursor over the artifact body. Every read names the field it was
/// after, so truncation errors say what is missing.
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize, what: &str) -> std::result::Result<&'a [u8], String> {
        let end = self.pos.checked_add(n).filter(|&e| e <= self.data.len());
        match end {
            Some(end) => {
                let slice = &self.data[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            None => Err(format!("truncated while reading {what}")),
        }
    }

    fn read_u32(&mut self, what: &str) -> std::result::Result<u32, String> {
        let bytes = self.take(4, what)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

/// PRN format writer.
#[derive(Debug, Default)]
pub struct ArtifactWriter {
    metadata: Metadata,
    tensors: Vec<(TensorDescriptor, Vec<u8>)>,
}

impl ArtifactWriter {
    /// Creates an empty writer with `format_version` pre-set.
    #[must_use]
    pub fn new() -> Self {
        let mut writer = Self::default();
        writer.set_metadata("format_version", JsonValue::from(FORMAT_VERSION));
        writer
    }

    /// Sets a metadata key-value pair.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: JsonValue) {
        self.metadata.insert(key.into(), value);
    }

    /// Adds a tensor with f32 data. The shape is recorded as given; readers
    /// verify shape against size, so a shape that disagrees with `data`
    /// produces an unreadable artifact.
    pub fn add_tensor(&mut self, name: impl Into<String>, shape: Vec<usize>, data: &[f32]) {
        let name = name.into();
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        let size = bytes.len();
        let offset: usize = self.tensors.iter().map(|(_, d)| d.len()).sum();
        let desc = TensorDescriptor {
            name,
            dtype: "F32".to_string(),
            shape,
            offset,
            size,
        };
        self.tensors.push((desc, bytes));
    }

    /// Serializes to PRN bytes.
    ///
    /// # Errors
    ///
    /// [`Error::ArtifactWrite`] when a JSON section fails to serialize.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        output.extend_from_slice(&PRN_MAGIC);

        let metadata_json = serde_json::to_string(&self.metadata).map_err(|e| {
            Error::ArtifactWrite {
                reason: format!("metadata serialization failed: {e}"),
            }
        })?;
        let metadata_bytes = metadata_json.as_bytes();
        output.extend_from_slice(&(metadata_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(metadata_bytes);

        output.extend_from_slice(&(self.tensors.len() as u32).to_le_bytes());

        let descriptors: Vec<_> = self.tensors.iter().map(|(d, _)| d).collect();
        let index_json = serde_json::to_string(&descriptors).map_err(|e| Error::ArtifactWrite {
            reason: format!("index serialization failed: {e}"),
        })?;
        let index_bytes = index_json.as_bytes();
        output.extend_from_slice(&(index_bytes.len() as u32).to_le_bytes());
        output.extend_from_slice(index_bytes);

        for (_, data) in &self.tensors {
            output.extend_from_slice(data);
        }

        let crc = crc32fast::hash(&output);
        output.extend_from_slice(&crc.to_le_bytes());
        Ok(output)
    }

    /// Writes the artifact to a file.
    ///
    /// # Errors
    ///
    /// [`Error::ArtifactWrite`] when serialization or the write fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path.as_ref(), bytes).map_err(|e| Error::ArtifactWrite {
            reason: format!("write to '{}' failed: {e}", path.as_ref().display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_writer() -> ArtifactWriter {
        let mut writer = ArtifactWriter::new();
        writer.set_metadata("model", JsonValue::from("linear"));
        writer.set_metadata("n_features", JsonValue::from(3));
        writer.add_tensor("coefficients", vec![3], &[1.5, -2.0, 0.25]);
        writer.add_tensor("intercept", vec![1], &[10.0]);
        writer
    }

    #[test]
    fn test_roundtrip_in_memory() {
        let bytes = sample_writer().to_bytes().unwrap();
        let reader = ArtifactReader::from_bytes(bytes).unwrap();
        assert_eq!(reader.require_str("model").unwrap(), "linear");
        assert_eq!(reader.require_u64("n_features").unwrap(), 3);
        assert_eq!(reader.require_u64("format_version").unwrap(), FORMAT_VERSION);
        assert_eq!(reader.tensor_f32("coefficients").unwrap(), vec![1.5, -2.0, 0.25]);
        assert_eq!(reader.tensor_f32("intercept").unwrap(), vec![10.0]);
        assert_eq!(reader.tensor_shape("coefficients").unwrap(), &[3]);
        assert_eq!(reader.tensor_names(), vec!["coefficients", "intercept"]);
    }

    #[test]
    fn test_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.prn");
        sample_writer().save(&path).unwrap();
        let reader = ArtifactReader::open(&path).unwrap();
        assert_eq!(reader.tensor_f32("intercept").unwrap(), vec![10.0]);
        assert_eq!(reader.source(), path.display().to_string());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = ArtifactReader::open("no/such/model.prn").unwrap_err();
        match err {
            Error::ArtifactNotFound { path } => assert!(path.contains("model.prn")),
            other => panic!("expected ArtifactNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_is_corrupt() {
        let err = ArtifactReader::from_bytes(Vec::new()).unwrap_err();
        match err {
            Error::ArtifactCorrupt { reason, .. } => assert!(reason.contains("too short")),
            other => panic!("expected ArtifactCorrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_magic_is_corrupt() {
        let mut bytes = sample_writer().to_bytes().unwrap();
        bytes[0] = b'X';
        let err = ArtifactReader::from_bytes(bytes).unwrap_err();
        match err {
            Error::ArtifactCorrupt { reason, .. } => assert!(reason.contains("bad magic")),
            other => panic!("expected ArtifactCorrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_flipped_payload_byte_fails_checksum() {
        let mut bytes = sample_writer().to_bytes().unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xff;
        let err = ArtifactReader::from_bytes(bytes).unwrap_err();
        match err {
            Error::ArtifactCorrupt { reason, .. } => {
                assert!(reason.contains("checksum mismatch"), "reason: {reason}");
            }
            other => panic!("expected ArtifactCorrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_truncated_file_is_corrupt() {
        let bytes = sample_writer().to_bytes().unwrap();
        let truncated = bytes[..bytes.len() - 9].to_vec();
        assert!(ArtifactReader::from_bytes(truncated).is_err());
    }

    #[test]
    fn test_tensor_out_of_bounds_rejected() {
        // Hand-build an artifact whose descriptor points past the data section.
        let metadata = b"{}";
        let index = br#"[{"name":"w","dtype":"F32","shape":[4],"offset":0,"size":16}]"#;
        let mut body = Vec::new();
        body.extend_from_slice(&PRN_MAGIC);
        body.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
        body.extend_from_slice(metadata);
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&(index.len() as u32).to_le_bytes());
        body.extend_from_slice(index);
        body.extend_from_slice(&[0u8; 8]); // only 8 of the 16 promised bytes
        let crc = crc32fast::hash(&body);
        body.extend_from_slice(&crc.to_le_bytes());

        let err = ArtifactReader::from_bytes(body).unwrap_err();
        match err {
            Error::ArtifactCorrupt { reason, .. } => {
                assert!(reason.contains("out of bounds"), "reason: {reason}");
            }
            other => panic!("expected ArtifactCorrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_shape_size_disagreement_rejected() {
        let metadata = b"{}";
        let index = br#"[{"name":"w","dtype":"F32","shape":[5],"offset":0,"size":8}]"#;
        let mut body = Vec::new();
        body.extend_from_slice(&PRN_MAGIC);
        body.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
        body.extend_from_slice(metadata);
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&(index.len() as u32).to_le_bytes());
        body.extend_from_slice(index);
        body.extend_from_slice(&[0u8; 8]);
        let crc = crc32fast::hash(&body);
        body.extend_from_slice(&crc.to_le_bytes());

        let err = ArtifactReader::from_bytes(body).unwrap_err();
        match err {
            Error::ArtifactCorrupt { reason, .. } => {
                assert!(reason.contains("disagrees with size"), "reason: {reason}");
            }
            other => panic!("expected ArtifactCorrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_overflowing_shape_dims_rejected() {
        // Dims sized so that naive element math would wrap usize.
        let indexes: [&[u8]; 2] = [
            br#"[{"name":"w","dtype":"F32","shape":[4611686018427387904,4],"offset":0,"size":8}]"#,
            br#"[{"name":"w","dtype":"F32","shape":[4294967296,4294967296],"offset":0,"size":8}]"#,
        ];
        for index in indexes {
            let metadata = b"{}";
            let mut body = Vec::new();
            body.extend_from_slice(&PRN_MAGIC);
            body.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
            body.extend_from_slice(metadata);
            body.extend_from_slice(&1u32.to_le_bytes());
            body.extend_from_slice(&(index.len() as u32).to_le_bytes());
            body.extend_from_slice(index);
            body.extend_from_slice(&[0u8; 8]);
            let crc = crc32fast::hash(&body);
            body.extend_from_slice(&crc.to_le_bytes());

            let err = ArtifactReader::from_bytes(body).unwrap_err();
            match err {
                Error::ArtifactCorrupt { reason, .. } => {
                    assert!(reason.contains("disagrees with size"), "reason: {reason}");
                }
                other => panic!("expected ArtifactCorrupt, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_unsupported_dtype_rejected() {
        let metadata = b"{}";
        let index = br#"[{"name":"w","dtype":"I8","shape":[8],"offset":0,"size":8}]"#;
        let mut body = Vec::new();
        body.extend_from_slice(&PRN_MAGIC);
        body.extend_from_slice(&(metadata.len() as u32).to_le_bytes());
        body.extend_from_slice(metadata);
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&(index.len() as u32).to_le_bytes());
        body.extend_from_slice(index);
        body.extend_from_slice(&[0u8; 8]);
        let crc = crc32fast::hash(&body);
        body.extend_from_slice(&crc.to_le_bytes());

        let err = ArtifactReader::from_bytes(body).unwrap_err();
        match err {
            Error::ArtifactCorrupt { reason, .. } => {
                assert!(reason.contains("unsupported dtype"), "reason: {reason}");
            }
            other => panic!("expected ArtifactCorrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_tensor_count_mismatch_rejected() {
        let mut writer = ArtifactWriter::new();
        writer.add_tensor("w", vec![1], &[1.0]);
        let mut bytes = writer.to_bytes().unwrap();
        // Find the n_tensors field: magic(4) + meta_len(4) + metadata.
        let meta_len =
            u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
        let n_tensors_at = 8 + meta_len;
        bytes[n_tensors_at] = 2;
        // Re-seal the checksum so only the count is wrong.
        let body_len = bytes.len() - 4;
        let crc = crc32fast::hash(&bytes[..body_len]);
        bytes[body_len..].copy_from_slice(&crc.to_le_bytes());

        let err = ArtifactReader::from_bytes(bytes).unwrap_err();
        match err {
            Error::ArtifactCorrupt { reason, .. } => {
                assert!(reason.contains("tensor count mismatch"), "reason: {reason}");
            }
            other => panic!("expected ArtifactCorrupt, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_tensor_lookup_fails() {
        let bytes = sample_writer().to_bytes().unwrap();
        let reader = ArtifactReader::from_bytes(bytes).unwrap();
        assert!(reader.tensor_f32("weights").is_err());
        assert!(reader.tensor_shape("weights").is_err());
    }

    #[test]
    fn test_missing_metadata_keys_fail_with_context() {
        let bytes = sample_writer().to_bytes().unwrap();
        let reader = ArtifactReader::from_bytes(bytes).unwrap();
        let err = reader.require_str("target").unwrap_err();
        assert!(err.to_string().contains("target"));
        let err = reader.require_u64("n_trees").unwrap_err();
        assert!(err.to_string().contains("n_trees"));
        // Wrong type also fails: "model" is a string, not an integer.
        assert!(reader.require_u64("model").is_err());
    }

    #[test]
    fn test_empty_artifact_roundtrips() {
        let writer = ArtifactWriter::new();
        let bytes = writer.to_bytes().unwrap();
        let reader = ArtifactReader::from_bytes(bytes).unwrap();
        assert!(reader.tensor_names().is_empty());
        assert_eq!(reader.data_len(), 0);
    }
}
