use encoding_rs::{Encoding, EUC_KR, UTF_8};
use tracing::debug;

use crate::errors::{DecodeAttempt, LoadError};

/// Encodings tried in order. The CRM export tool writes CP949 (EUC-KR per
/// WHATWG); files that were opened and re-saved by hand are usually UTF-8.
static ENCODINGS: [&Encoding; 2] = [EUC_KR, UTF_8];

pub fn decode_export(bytes: &[u8]) -> Result<String, LoadError> {
    let mut attempts = Vec::new();

    for encoding in ENCODINGS {
        let (text, used, had_errors) = encoding.decode(bytes);
        if !had_errors {
            debug!(encoding = used.name(), "decoded inquiry export");
            return Ok(text.into_owned());
        }
        attempts.push(DecodeAttempt::new(
            encoding.name(),
            "byte sequence is not valid for this encoding",
        ));
    }

    Err(LoadError::Decode { attempts })
}
