//! CRLF -> LF normalization on ingest, so the transcript parser only ever
//! has to reason about `\n`.

pub fn normalize(raw: &str) -> String {
    if raw.contains('\r') {
        raw.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        raw.to_string()
    }
}
