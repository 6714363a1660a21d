// SPDX-License-Identifier: Apache-2.0

use crate::decode::{SpreadsheetFormat, decode_rows};
use crate::logging::{ImportLog, ImportStage};
use crate::normalize::normalize_row;
use crate::{ImportError, ImportEvent};
use civreg_core::now_millis;
use civreg_store::CitizenRecordStore;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Result of one bulk import. `count` is rows upserted, `errors` rows that
/// failed persistence after normalization. Rows skipped by the normalizer
/// appear in neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportOutcome {
    pub count: u64,
    pub errors: u64,
}

/// Runs a staged upload through decode → normalize → upsert.
///
/// Rows are committed independently; a failure partway through leaves the
/// already-upserted prefix in place. Per-row store failures are counted and
/// logged, never propagated. The caller owns the staged file and its
/// cleanup.
pub async fn import_spreadsheet(
    store: &dyn CitizenRecordStore,
    path: &Path,
    format: SpreadsheetFormat,
) -> Result<(ImportOutcome, Vec<ImportEvent>), ImportError> {
    let mut log = ImportLog::default();
    log.emit(
        ImportStage::Decode,
        "import.decode.begin",
        BTreeMap::from([("format".to_string(), format.as_str().to_string())]),
    );

    let rows = {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || decode_rows(&path, format))
            .await
            .map_err(|e| ImportError(format!("decode task failed: {e}")))??
    };
    let total_rows = rows.len();
    log.emit(
        ImportStage::Decode,
        "import.decode.complete",
        BTreeMap::from([("rows".to_string(), total_rows.to_string())]),
    );

    let mut outcome = ImportOutcome::default();
    let mut skipped: u64 = 0;
    for row in &rows {
        let Some(mut record) = normalize_row(row) else {
            skipped += 1;
            continue;
        };
        record.imported_at = now_millis();
        match store.upsert_by_hash(&record).await {
            Ok(()) => outcome.count += 1,
            Err(e) => {
                warn!(identity = %record.identity_masked, "record upsert failed: {e}");
                outcome.errors += 1;
            }
        }
    }

    log.emit(
        ImportStage::Persist,
        "import.persist.complete",
        BTreeMap::from([
            ("count".to_string(), outcome.count.to_string()),
            ("errors".to_string(), outcome.errors.to_string()),
            ("skipped".to_string(), skipped.to_string()),
        ]),
    );
    Ok((outcome, log.events().to_vec()))
}
