/// Descriptive header of a collection, read from `collection.info`.
///
/// The file is line-oriented: collection name, archive file name, numeric
/// collection type, then a free-form description spanning the remaining lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionInfo {
    pub name: String,
    pub file_name: String,
    pub kind: Option<u32>,
    pub description: String,
}
impl CollectionInfo {
    pub(crate) fn parse(text: &str) -> Self {
        let mut lines = text.lines().map(str::trim);
        let name = lines.next().unwrap_or_default().to_string();
        let file_name = lines.next().unwrap_or_default().to_string();
        let kind = lines.next().and_then(|k| k.parse().ok());
        let description = lines.collect::<Vec<_>>().join("\n").trim().to_string();
        Self { name, file_name, kind, description }
    }
}
