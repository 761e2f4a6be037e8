//! Chart emitter: Chart.js payload and the HTML page around it.

pub mod html;
pub mod payload;

pub use html::{render_html, write_html};
pub use payload::{build_payload, payload_json, ChartPayload, LineDataset, XyPoint, PALETTE};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to serialize chart payload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
