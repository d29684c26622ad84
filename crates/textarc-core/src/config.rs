//! Configuration for packing and extraction.

/// How the extractor treats a file that already exists at the target path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Replace the existing file.
    Overwrite,
    /// Keep the existing file and record the entry as skipped.
    SkipExisting,
    /// Abort the extraction with `DestinationConflict`.
    #[default]
    FailOnConflict,
}

impl CollisionPolicy {
    /// Returns the policy name as used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overwrite => "overwrite",
            Self::SkipExisting => "skip-existing",
            Self::FailOnConflict => "fail-on-conflict",
        }
    }
}

impl std::fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for building an archive from filesystem sources.
///
/// # Examples
///
/// ```
/// use textarc_core::PackConfig;
///
/// let config = PackConfig::default()
///     .with_compression_level(9)
///     .with_include_hidden(false);
/// assert_eq!(config.compression_level, 9);
/// ```
#[derive(Debug, Clone)]
pub struct PackConfig {
    /// Deflate level (0 stores entries uncompressed, 1-9 deflate).
    pub compression_level: u8,

    /// Follow symbolic links into their targets.
    ///
    /// When disabled, links are recorded as skipped entries.
    pub follow_symlinks: bool,

    /// Include files and directories whose name starts with a dot.
    pub include_hidden: bool,

    /// Store each file's modification time in its entry header.
    ///
    /// When disabled every entry carries the container's minimum timestamp.
    pub store_mtime: bool,
}

impl Default for PackConfig {
    /// Default values:
    /// - `compression_level`: 6
    /// - `follow_symlinks`: true
    /// - `include_hidden`: true
    /// - `store_mtime`: true
    fn default() -> Self {
        Self {
            compression_level: 6,
            follow_symlinks: true,
            include_hidden: true,
            store_mtime: true,
        }
    }
}

impl PackConfig {
    /// Sets the deflate level, clamped to 0-9.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level.min(9);
        self
    }

    /// Sets whether symbolic links are followed.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Sets whether hidden entries are included.
    #[must_use]
    pub fn with_include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// Sets whether modification times are stored.
    #[must_use]
    pub fn with_store_mtime(mut self, store: bool) -> Self {
        self.store_mtime = store;
        self
    }
}

/// Configuration for extracting an archive into a destination directory.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    /// What to do when a file already exists.
    pub collision_policy: CollisionPolicy,

    /// Apply archived modification times to written files.
    pub restore_mtime: bool,

    /// Create the destination directory if it does not exist.
    pub create_destination: bool,
}

impl Default for ExtractConfig {
    /// Default values:
    /// - `collision_policy`: `FailOnConflict`
    /// - `restore_mtime`: true
    /// - `create_destination`: true
    fn default() -> Self {
        Self {
            collision_policy: CollisionPolicy::default(),
            restore_mtime: true,
            create_destination: true,
        }
    }
}

impl ExtractConfig {
    /// Sets the collision policy.
    #[must_use]
    pub fn with_collision_policy(mut self, policy: CollisionPolicy) -> Self {
        self.collision_policy = policy;
        self
    }

    /// Sets whether modification times are restored.
    #[must_use]
    pub fn with_restore_mtime(mut self, restore: bool) -> Self {
        self.restore_mtime = restore;
        self
    }

    /// Sets whether a missing destination directory is created.
    #[must_use]
    pub fn with_create_destination(mut self, create: bool) -> Self {
        self.create_destination = create;
        self
    }
}
