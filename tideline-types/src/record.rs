//! Records flowing from the sources to the response writer.

use serde::Deserialize;
use serde_json::Value;

use crate::samples::{BasalSample, CbgSample};

/// One legacy-store document, kept as undecoded JSON bytes.
///
/// The store may hand back malformed documents; decoding is deferred to the
/// response writer, which skips and counts the ones that fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord(Vec<u8>);

#[derive(Deserialize)]
struct UploadRef {
    #[serde(rename = "uploadId")]
    upload_id: Option<String>,
}

impl RawRecord {
    /// Wrap raw document bytes.
    #[must_use]
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Encode a JSON value as a raw record.
    #[must_use]
    pub fn from_value(v: &Value) -> Self {
        Self(v.to_string().into_bytes())
    }

    /// Borrow the document bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume and return the document bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// The `uploadId` field of the document, if present and decodable.
    ///
    /// Only the one field is decoded; a malformed document yields `None`.
    #[must_use]
    pub fn upload_id(&self) -> Option<String> {
        serde_json::from_slice::<UploadRef>(&self.0)
            .ok()
            .and_then(|r| r.upload_id)
    }
}

impl From<Vec<u8>> for RawRecord {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// A heterogeneous output record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// Legacy-store document passed through as fetched.
    Raw(RawRecord),
    /// Already-decoded document (e.g. augmented pump settings).
    Document(Value),
    /// Continuous glucose reading, written with `type: "cbg"`.
    Cbg(CbgSample),
    /// Reconciled basal segment, written with `type: "basal"`.
    Basal(BasalSample),
}
