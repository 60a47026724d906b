//! Validate command implementation.
//!
//! Runs the same checks a gateway load would, plus a scoring smoke test,
//! and reports each as a PASS/FAIL line.

use std::path::Path;

use pronosticar::artifact::ArtifactReader;
use pronosticar::features::FeatureRecord;
use pronosticar::gateway::predict;
use pronosticar::model::{SalesModel, Scorer, META_TARGET};

use crate::error::{CliError, Result};
use crate::output;

/// Run the validate command
pub(crate) fn run(path: &Path) -> Result<()> {
    println!("Validating {}...", path.display());
    output::section("Checks");

    // Format: magic, checksum, JSON sections, tensor bounds.
    let reader = match ArtifactReader::open(path) {
        Ok(reader) => {
            output::success("format: magic, checksum, and tensor index decode");
            reader
        }
        Err(e) => {
            output::fail(&format!("format: {e}"));
            return Err(e.into());
        }
    };

    let mut failures = 0;

    // Schema: model kind, arity, feature names, tensor shapes.
    let model = match SalesModel::from_reader(&reader) {
        Ok(model) => {
            output::success(&format!(
                "schema: {} model, {} features",
                model.kind(),
                model.n_features()
            ));
            Some(model)
        }
        Err(e) => {
            output::fail(&format!("schema: {e}"));
            failures += 1;
            None
        }
    };

    // Scoring: the stock record must produce a finite value.
    if let Some(model) = &model {
        let smoke = FeatureRecord::default()
            .encode()
            .and_then(|vector| predict(model, &vector));
        match smoke {
            Ok(value) if value.is_finite() => {
                output::success("scoring: stock record scores to a finite value");
            }
            Ok(value) => {
                output::fail(&format!("scoring: stock record scored {value}"));
                failures += 1;
            }
            Err(e) => {
                output::fail(&format!("scoring: {e}"));
                failures += 1;
            }
        }
    }

    // Metadata: target is informational, so a miss only warns.
    if reader.metadata(META_TARGET).is_some() {
        output::success("metadata: target column recorded");
    } else {
        output::warning("metadata: 'target' missing");
    }

    if failures > 0 {
        return Err(CliError::ValidationFailed(format!(
            "{failures} check(s) failed"
        )));
    }
    println!();
    output::success("all checks passed");
    Ok(())
}
