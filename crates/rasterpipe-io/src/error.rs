//! Codec error wrapping: turns each codec crate's own error type into the
//! shared [`rasterpipe_core::Error`] taxonomy.

use rasterpipe_core::Error;

pub(crate) fn decode_failed(format: &str, cause: impl std::fmt::Display) -> Error {
    Error::bad_input(format!("{format} decode failed: {cause}"))
}

pub(crate) fn encode_failed(format: &str, cause: impl std::fmt::Display) -> Error {
    Error::invalid_state(format!("{format} encode failed: {cause}"))
}

pub(crate) fn unsupported(format: &str, detail: impl std::fmt::Display) -> Error {
    Error::invalid_argument(format!("{format}: {detail}"))
}
