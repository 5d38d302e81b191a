//! zPath grammar: `"@" ("." segment)+` — a dotted absolute path rooted at the
//! workspace, naming a file and a block within it.
//!
//! The final segment is the block name; the segment before it is the file
//! name; everything earlier is the folder path. `@.UI.zUI.index` names block
//! `index` inside file `zUI` inside folder `UI/`.

use crate::error::ZoloError;

/// A parsed, validated zPath triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZPath {
    pub folder: Vec<String>,
    pub file: String,
    pub block: String,
}

impl ZPath {
    /// Parse a zPath string. Requires at least a file and a block segment
    /// (i.e. at least 2 segments after the root `@`), so the breadcrumb
    /// rewrite in navigation never has to guess at a short key — see the
    /// precondition decision in DESIGN.md.
    pub fn parse(raw: &str) -> Result<Self, ZoloError> {
        let rest = raw
            .strip_prefix('@')
            .ok_or_else(|| ZoloError::Navigation(format!("zPath '{raw}' must start with '@'")))?;

        let segments: Vec<&str> = rest
            .split('.')
            .filter(|s| !s.is_empty())
            .collect();

        if segments.len() < 2 {
            return Err(ZoloError::Navigation(format!(
                "zPath '{raw}' needs at least a file and a block segment"
            )));
        }

        let block = segments[segments.len() - 1].to_string();
        let file = segments[segments.len() - 2].to_string();
        let folder = segments[..segments.len() - 2]
            .iter()
            .map(|s| s.to_string())
            .collect();

        Ok(ZPath { folder, file, block })
    }

    /// The crumb key used in `session.zCrumbs`: `folder.file.block`, joined
    /// by dots. Always has at least 3 dot-separated segments when folder is
    /// non-empty; exactly 2 when the block lives at the workspace root.
    pub fn crumb_key(&self) -> String {
        let mut parts = self.folder.clone();
        parts.push(self.file.clone());
        parts.push(self.block.clone());
        parts.join(".")
    }

    /// `file.block`, the conventional qualified name used when referring to
    /// a block from within the same folder.
    pub fn qualified_block(&self) -> String {
        format!("{}.{}", self.file, self.block)
    }

    /// Whether this path's crumb key has the minimum 3 dotted segments the
    /// breadcrumb rewrite in navigation requires (see DESIGN.md decision on
    /// the original's precondition). Validating at parse time means the
    /// navigation layer never has to silently skip a rewrite.
    pub fn has_rewritable_crumb_key(&self) -> bool {
        self.crumb_key().split('.').count() >= 3
    }
}

impl std::fmt::Display for ZPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@")?;
        for seg in &self.folder {
            write!(f, ".{seg}")?;
        }
        write!(f, ".{}.{}", self.file, self.block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_example_from_spec() {
        let p = ZPath::parse("@.UI.zUI.index").unwrap();
        assert_eq!(p.folder, vec!["UI".to_string()]);
        assert_eq!(p.file, "zUI");
        assert_eq!(p.block, "index");
        assert_eq!(p.crumb_key(), "UI.zUI.index");
        assert_eq!(p.qualified_block(), "zUI.index");
    }

    #[test]
    fn root_level_path_has_only_two_segments() {
        let p = ZPath::parse("@.zUI.index").unwrap();
        assert!(p.folder.is_empty());
        assert!(!p.has_rewritable_crumb_key());
    }

    #[test]
    fn rejects_missing_root_marker() {
        assert!(ZPath::parse("UI.zUI.index").is_err());
    }

    #[test]
    fn rejects_single_segment() {
        assert!(ZPath::parse("@.index").is_err());
    }

    #[test]
    fn display_round_trips() {
        let p = ZPath::parse("@.A.B.zUI.index").unwrap();
        assert_eq!(p.to_string(), "@.A.B.zUI.index");
    }
}
