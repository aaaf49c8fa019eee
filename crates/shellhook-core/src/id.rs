//! Script identifier newtype.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Globally unique script identifier, the sole external selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScriptId(pub Uuid);

impl ScriptId {
    /// Parses a textual UUID (any format accepted by `uuid`).
    pub fn parse(input: &str) -> Result<Self, CoreError> {
        Uuid::parse_str(input.trim())
            .map(ScriptId)
            .map_err(|_| CoreError::MalformedId {
                input: input.to_string(),
            })
    }

    /// Generates a fresh random identifier.
    pub fn new_v4() -> Self {
        ScriptId(Uuid::new_v4())
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ScriptId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScriptId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hyphenated_uuid() {
        let id = ScriptId::parse("5e5adb92-0d04-11ee-97cf-4b6c30e50f6a").unwrap();
        assert_eq!(id.to_string(), "5e5adb92-0d04-11ee-97cf-4b6c30e50f6a");
    }

    #[test]
    fn rejects_garbage() {
        let err = ScriptId::parse("blabla").unwrap_err();
        assert!(matches!(err, CoreError::MalformedId { ref input } if input == "blabla"));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(
            ScriptId::parse(""),
            Err(CoreError::MalformedId { .. })
        ));
    }
}
