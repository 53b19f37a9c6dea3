//! Structured-response extraction for model output.
//!
//! Model text is parsed into a [`Record`](crate::types::Record) with a
//! best-effort repair pass. Extraction never fails: unparseable text comes
//! back as a sentinel record that call sites check with [`is_unparsed`].

mod json_repair;

pub use json_repair::{
    JsonRepairer, RAW_RESPONSE_KEY, extract_braced_record, extract_record, is_unparsed,
    raw_response, unparsed_record,
};
