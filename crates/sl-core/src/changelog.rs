//! Persisted changelog entry types.

use crate::changeset::{Changeset, ChangesetId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One applied changeset as recorded in the changelog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangelogEntry {
    pub id: String,
    pub author: String,
    pub filename: String,
    #[serde(rename = "dateexecuted")]
    pub date_executed: DateTime<Utc>,
    /// 1-based position in apply order
    #[serde(rename = "orderexecuted")]
    pub order_executed: usize,
    pub checksum: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub version: String,
}

impl ChangelogEntry {
    /// Build a fresh entry for a changeset that was just applied
    pub fn from_changeset(
        changeset: &Changeset,
        order_executed: usize,
        date_executed: DateTime<Utc>,
    ) -> Self {
        Self {
            id: changeset.id().to_string(),
            author: changeset.author().to_string(),
            filename: changeset.filename().to_string(),
            date_executed,
            order_executed,
            checksum: changeset.checksum().to_string(),
            description: changeset.description(),
            tag: None,
            version: changeset.version().to_string(),
        }
    }

    /// Composite identity of the changeset this entry records
    pub fn identity(&self) -> ChangesetId {
        ChangesetId::new(&self.author, &self.id, &self.filename)
    }

    /// Whether this entry records the changeset with the given identity
    pub fn matches(&self, identity: &ChangesetId) -> bool {
        self.author == identity.author
            && self.id == identity.id
            && self.filename == identity.filename
    }
}

impl fmt::Display for ChangelogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}) {}:{} ({}) {} [tag='{}']",
            self.order_executed,
            self.author,
            self.id,
            self.filename,
            self.checksum,
            self.tag.as_deref().unwrap_or("")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn entry() -> ChangelogEntry {
        let parsed = Parser::default()
            .parse_str("--changeset jane:1\n--description first\nCREATE TABLE t (id INT);")
            .unwrap();
        let cs = parsed.iter().next().unwrap();
        ChangelogEntry::from_changeset(cs, 1, Utc::now())
    }

    #[test]
    fn test_from_changeset_copies_identity_and_checksum() {
        let e = entry();
        assert_eq!(e.author, "jane");
        assert_eq!(e.id, "1");
        assert_eq!(e.filename, "memory");
        assert_eq!(e.order_executed, 1);
        assert_eq!(e.description, "first");
        assert_eq!(e.version, "1.0");
        assert_eq!(e.checksum, crate::compute_checksum("CREATE TABLE t (id INT);"));
        assert!(e.tag.is_none());
        assert!(e.matches(&ChangesetId::new("jane", "1", "memory")));
        assert!(!e.matches(&ChangesetId::new("jane", "1", "other.sql")));
    }

    #[test]
    fn test_display_format() {
        let mut e = entry();
        let shown = e.to_string();
        assert!(shown.starts_with("1) jane:1 (memory) "));
        assert!(shown.ends_with("[tag='']"));

        e.tag = Some("v1".to_string());
        assert!(e.to_string().ends_with("[tag='v1']"));
    }

    #[test]
    fn test_json_field_names() {
        let e = entry();
        let json = serde_json::to_value(&e).unwrap();
        assert!(json.get("orderexecuted").is_some());
        assert!(json.get("dateexecuted").is_some());
        assert!(json.get("tag").is_none());

        let back: ChangelogEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, e);
    }
}
