//! Inline-button callback payloads.
//!
//! Wire form is a short `kind:arg` string (Telegram caps callback data at 64 bytes).

use std::fmt;

const LIST_PREFIX: &str = "list:";

/// Typed callback payload; parsed and validated before any handler sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackPayload {
    /// Show page `page` (1-based) of the stored videos.
    ListPage { page: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CallbackParseError {
    #[error("unknown callback kind: {0}")]
    UnknownKind(String),
    #[error("invalid page number: {0}")]
    InvalidPage(String),
}

impl CallbackPayload {
    pub fn parse(data: &str) -> Result<Self, CallbackParseError> {
        let Some(raw_page) = data.strip_prefix(LIST_PREFIX) else {
            return Err(CallbackParseError::UnknownKind(data.to_string()));
        };

        // Decimal digits only: rejects signs, whitespace and empty input.
        if raw_page.is_empty() || !raw_page.bytes().all(|b| b.is_ascii_digit()) {
            return Err(CallbackParseError::InvalidPage(raw_page.to_string()));
        }
        match raw_page.parse::<u32>() {
            Ok(page) if page >= 1 => Ok(CallbackPayload::ListPage { page }),
            _ => Err(CallbackParseError::InvalidPage(raw_page.to_string())),
        }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CallbackPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackPayload::ListPage { page } => write!(f, "{LIST_PREFIX}{page}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_pages() {
        assert_eq!(
            CallbackPayload::parse("list:1"),
            Ok(CallbackPayload::ListPage { page: 1 })
        );
        assert_eq!(
            CallbackPayload::parse("list:42"),
            Ok(CallbackPayload::ListPage { page: 42 })
        );
    }

    #[test]
    fn encodes_as_wire_form() {
        assert_eq!(CallbackPayload::ListPage { page: 3 }.encode(), "list:3");
    }

    #[test]
    fn rejects_malformed_data() {
        for bad in ["list:0", "list:-1", "list:+2", "list:x", "list:", "list: 2", "list:99999999999"] {
            assert!(
                matches!(
                    CallbackPayload::parse(bad),
                    Err(CallbackParseError::InvalidPage(_))
                ),
                "expected invalid page: {bad}"
            );
        }
        assert!(matches!(
            CallbackPayload::parse("other:1"),
            Err(CallbackParseError::UnknownKind(_))
        ));
        assert!(matches!(
            CallbackPayload::parse(""),
            Err(CallbackParseError::UnknownKind(_))
        ));
    }
}
