//! Per-user decorative assets loaded from disk.
//!
//! Files are named `<userId>[-<variant>].<ext>`. Everything before the first
//! `-` of the file stem is the owning user id; the variant suffix only keeps
//! file names unique. The index is built once at startup and never reloaded.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, error, warn};

/// Kind of decorative asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Small badge drawn next to the user's name.
    Icon,
    /// Image painted over the user's bar.
    BarBackground,
}

impl AssetKind {
    /// Directory name under the asset root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetKind::Icon => "icons",
            AssetKind::BarBackground => "barBgImgs",
        }
    }
}

/// Encoded image payloads grouped by user id.
#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    icons: HashMap<String, Vec<Vec<u8>>>,
    backgrounds: HashMap<String, Vec<Vec<u8>>>,
}

impl AssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from `<root>/icons` and `<root>/barBgImgs`, creating
    /// the directories when missing.
    pub fn from_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::from_dirs(
            root.join(AssetKind::Icon.dir_name()),
            root.join(AssetKind::BarBackground.dir_name()),
        )
    }

    /// Build an index from explicit icon and background directories.
    ///
    /// A directory that cannot be created or read contributes nothing.
    pub fn from_dirs(icons_dir: impl AsRef<Path>, backgrounds_dir: impl AsRef<Path>) -> Self {
        let mut index = Self::new();
        index.load_dir(AssetKind::Icon, icons_dir.as_ref());
        index.load_dir(AssetKind::BarBackground, backgrounds_dir.as_ref());

        debug!(
            icon_users = index.icons.len(),
            background_users = index.backgrounds.len(),
            "Asset index built"
        );
        index
    }

    fn load_dir(&mut self, kind: AssetKind, dir: &Path) {
        if let Err(e) = fs::create_dir_all(dir) {
            error!(dir = %dir.display(), error = %e, "Failed to create asset directory");
            return;
        }

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(dir = %dir.display(), error = %e, "Failed to read asset directory");
                return;
            }
        };

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        for path in paths {
            let Some(user_id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(owner_of_stem)
            else {
                warn!(path = %path.display(), "Skipping asset with non UTF-8 name");
                continue;
            };

            match fs::read(&path) {
                Ok(bytes) => self.insert(kind, user_id, bytes),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read asset file");
                }
            }
        }
    }

    /// Add one payload for a user. Order of insertion is preserved.
    pub fn insert(&mut self, kind: AssetKind, user_id: impl Into<String>, bytes: Vec<u8>) {
        self.map_mut(kind).entry(user_id.into()).or_default().push(bytes);
    }

    pub fn get(&self, kind: AssetKind, user_id: &str) -> &[Vec<u8>] {
        let map = match kind {
            AssetKind::Icon => &self.icons,
            AssetKind::BarBackground => &self.backgrounds,
        };
        map.get(user_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn icons_for(&self, user_id: &str) -> &[Vec<u8>] {
        self.get(AssetKind::Icon, user_id)
    }

    pub fn backgrounds_for(&self, user_id: &str) -> &[Vec<u8>] {
        self.get(AssetKind::BarBackground, user_id)
    }

    /// Iterate `(user_id, payload)` pairs of one kind.
    pub fn entries(&self, kind: AssetKind) -> impl Iterator<Item = (&str, &[u8])> {
        let map = match kind {
            AssetKind::Icon => &self.icons,
            AssetKind::BarBackground => &self.backgrounds,
        };
        map.iter()
            .flat_map(|(user, items)| items.iter().map(move |b| (user.as_str(), b.as_slice())))
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty() && self.backgrounds.is_empty()
    }

    fn map_mut(&mut self, kind: AssetKind) -> &mut HashMap<String, Vec<Vec<u8>>> {
        match kind {
            AssetKind::Icon => &mut self.icons,
            AssetKind::BarBackground => &mut self.backgrounds,
        }
    }
}

/// User id encoded in an asset file stem.
pub fn owner_of_stem(stem: &str) -> String {
    stem.split('-').next().unwrap_or(stem).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_of_stem() {
        assert_eq!(owner_of_stem("10001-2"), "10001");
        assert_eq!(owner_of_stem("10001"), "10001");
        assert_eq!(owner_of_stem(" 42 -gold-star"), "42");
    }

    #[test]
    fn test_missing_user_is_empty() {
        let index = AssetIndex::new();
        assert!(index.icons_for("nobody").is_empty());
        assert!(index.is_empty());
    }
}
