use std::fmt::{Display, Formatter, Result as FmtResult};

/// A book author as listed in an INPX record (`last,first,middle`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Author {
    pub last: String,
    pub first: String,
    pub middle: String,
}
impl Author {
    pub fn new(last: impl Into<String>, first: impl Into<String>, middle: impl Into<String>) -> Self {
        Self {
            last: last.into().trim().to_string(),
            first: first.into().trim().to_string(),
            middle: middle.into().trim().to_string(),
        }
    }

    /// Parse a single `last,first,middle` entry. Missing parts are left empty.
    pub(crate) fn parse(value: &str) -> Self {
        let mut parts = value.split(crate::consts::NAME_SEPARATOR);
        let last = parts.next().unwrap_or_default();
        let first = parts.next().unwrap_or_default();
        let middle = parts.next().unwrap_or_default();
        Self::new(last, first, middle)
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty() && self.first.is_empty() && self.middle.is_empty()
    }
}

/// Renders the name in reading order: `First Middle Last`.
impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let parts = [&self.first, &self.middle, &self.last];
        let mut first = true;
        for part in parts.into_iter().filter(|p| !p.is_empty()) {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(part)?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Толстой,Лев,Николаевич", "Лев Николаевич Толстой")]
    #[case("Pratchett,Terry,", "Terry Pratchett")]
    #[case("Homer", "Homer")]
    #[case(" Le Guin , Ursula ,K. ", "Ursula K. Le Guin")]
    #[case("", "")]
    fn test_parse_and_display(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(Author::parse(raw).to_string(), expected);
    }

    #[test]
    fn test_is_empty() {
        assert!(Author::parse(",,").is_empty());
        assert!(!Author::parse("Homer").is_empty());
    }
}
