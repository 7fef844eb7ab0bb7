//! Common record fixtures and temporary asset directories.

use std::fs;
use std::path::PathBuf;

use rank_common::{BalanceRecord, BindingRecord, IdentityRecord};
use tempfile::TempDir;

/// A balance in the default currency.
pub fn balance(owner_id: u64, amount: f64) -> BalanceRecord {
    BalanceRecord::new(owner_id, amount, "default")
}

/// An identity with a predictable name (`user<owner>`) and avatar.
pub fn identity(owner_id: u64, user_id: &str, channel_id: &str, platform: &str) -> IdentityRecord {
    IdentityRecord {
        owner_id,
        external_user_id: user_id.to_string(),
        display_name: format!("user{}", owner_id),
        avatar_url: Some(format!("https://avatars.example/{}.png", user_id)),
        channel_id: channel_id.to_string(),
        platform_kind: platform.to_string(),
    }
}

/// A platform binding for an external user id.
pub fn binding(owner_id: u64, user_id: &str, platform: &str) -> BindingRecord {
    BindingRecord {
        external_user_id: user_id.to_string(),
        binding_id: owner_id,
        owner_id,
        platform_kind: platform.to_string(),
    }
}

/// Temporary asset root with `icons/` and `barBgImgs/` subdirectories.
pub struct AssetDirFixture {
    pub root: TempDir,
}

impl AssetDirFixture {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("create temp dir");
        fs::create_dir_all(root.path().join("icons")).expect("create icons dir");
        fs::create_dir_all(root.path().join("barBgImgs")).expect("create barBgImgs dir");
        Self { root }
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.root.path().join("icons")
    }

    pub fn backgrounds_dir(&self) -> PathBuf {
        self.root.path().join("barBgImgs")
    }

    /// Write an icon file, e.g. `add_icon("10001-2.png", bytes)`.
    pub fn add_icon(&self, file_name: &str, bytes: &[u8]) {
        fs::write(self.icons_dir().join(file_name), bytes).expect("write icon");
    }

    /// Write a bar background file.
    pub fn add_background(&self, file_name: &str, bytes: &[u8]) {
        fs::write(self.backgrounds_dir().join(file_name), bytes).expect("write background");
    }
}

impl Default for AssetDirFixture {
    fn default() -> Self {
        Self::new()
    }
}
