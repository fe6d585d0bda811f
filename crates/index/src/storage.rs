use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Where the index keeps its data.
///
/// Deserialized through [`FromStr`], so configuration files accept the
/// aliases too (`sqlite`, `mem`, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Storage {
    /// SQLite database file inside the index directory.
    #[default]
    Disk,
    /// Private in-process database, gone once the index is closed. Useful for
    /// dry runs and tests.
    Memory,
}

impl Storage {
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Memory => "memory",
        }
    }
}

impl Display for Storage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Storage {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disk" | "file" | "sqlite" => Ok(Self::Disk),
            "memory" | "mem" => Ok(Self::Memory),
            _ => exn::bail!(ErrorKind::UnsupportedStorage(s.to_string())),
        }
    }
}

impl TryFrom<String> for Storage {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn storage_default() {
        assert_eq!(Storage::default(), Storage::Disk);
    }

    #[rstest]
    #[case("disk", Storage::Disk)]
    #[case("SQLite", Storage::Disk)]
    #[case(" memory ", Storage::Memory)]
    fn test_from_str(#[case] input: &str, #[case] expected: Storage) {
        assert_eq!(input.parse::<Storage>().unwrap(), expected);
    }

    #[test]
    fn test_deserialize_accepts_aliases() {
        let storage: Vec<Storage> = serde_json::from_str(r#"["sqlite", "MEM", "disk"]"#).unwrap();
        assert_eq!(storage, vec![Storage::Disk, Storage::Memory, Storage::Disk]);
        assert!(serde_json::from_str::<Storage>(r#""bolt""#).is_err());
        assert_eq!(serde_json::to_string(&Storage::Memory).unwrap(), r#""memory""#);
    }

    #[test]
    fn test_from_str_invalid() {
        let err = "bolt".parse::<Storage>().unwrap_err();
        assert_eq!(*err, ErrorKind::UnsupportedStorage("bolt".to_string()));
    }
}
