//! Inspect command implementation.

use std::fs;
use std::path::Path;

use pronosticar::artifact::ArtifactReader;

use crate::error::Result;
use crate::output;

/// Run the inspect command
pub(crate) fn run(path: &Path) -> Result<()> {
    let reader = ArtifactReader::open(path)?;

    output::section("Artifact");
    output::kv("Path", path.display());
    if let Ok(meta) = fs::metadata(path) {
        output::kv("Size", output::format_size(meta.len()));
    }
    output::kv("Format", "PRN1");
    output::kv("Data section", output::format_size(reader.data_len() as u64));

    output::section("Metadata");
    for (key, value) in &reader.metadata {
        output::kv(key, value);
    }

    output::section("Tensors");
    if reader.tensors.is_empty() {
        println!("  (none)");
    }
    for desc in &reader.tensors {
        println!(
            "  {} {:?} ({})",
            desc.name,
            desc.shape,
            output::format_size(desc.size as u64)
        );
    }
    Ok(())
}
