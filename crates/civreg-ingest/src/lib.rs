// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

mod decode;
mod logging;
mod normalize;
mod pipeline;

use std::fmt::{Display, Formatter};

pub const CRATE_NAME: &str = "civreg-ingest";

pub use decode::{RawRow, SpreadsheetFormat, decode_rows};
pub use logging::{ImportEvent, ImportLog, ImportStage};
pub use normalize::{MIN_IDENTITY_LEN, normalize_row, parse_date_of_birth};
pub use pipeline::{ImportOutcome, import_spreadsheet};

/// Whole-file import failure (unreadable upload, no sheets, broken stream).
/// Per-row persistence failures never raise this; they aggregate into
/// [`ImportOutcome::errors`].
#[derive(Debug)]
pub struct ImportError(pub String);

impl Display for ImportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ImportError {}
