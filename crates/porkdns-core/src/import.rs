//! Import identifier parsing
//!
//! Records are imported as `<domain>/<record-id>`; nameserver sets are
//! imported by their bare domain. Malformed ids fail here, before any
//! gateway call is made.

use crate::error::{Error, Result};

/// Keys needed to read an existing record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordImportId {
    pub domain: String,
    pub id: String,
}

/// Parse a record import id of the form `<domain>/<record-id>`
pub fn parse_record_import_id(raw: &str) -> Result<RecordImportId> {
    let parts: Vec<&str> = raw.split('/').collect();

    match parts.as_slice() {
        [domain, id] if !domain.is_empty() && !id.is_empty() => Ok(RecordImportId {
            domain: (*domain).to_string(),
            id: (*id).to_string(),
        }),
        _ => Err(Error::invalid_input(format!(
            "Expected import ID in format 'domain/record_id', got: {}",
            raw
        ))),
    }
}

/// Parse a nameserver import id, which is the domain itself
pub fn parse_nameserver_import_id(raw: &str) -> Result<String> {
    if raw.is_empty() || raw.contains('/') {
        return Err(Error::invalid_input(format!(
            "Expected import ID in format 'domain', got: {}",
            raw
        )));
    }
    Ok(raw.to_string())
}
