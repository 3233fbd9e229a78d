//! Executable resolution for ffmpeg and ffprobe
//!
//! Lookups go to the filesystem on every call. Nothing is cached, so a tool
//! installed while the application runs is picked up by the next operation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::errors::*;
use crate::domain::model::*;

/// Conventional installation directories, searched before the search path
pub const DEFAULT_INSTALL_DIRS: [&str; 3] = ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];

/// Which search-path value the installed policy falls back to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchPath {
    /// Read `PATH` from the process environment at lookup time
    #[default]
    Inherit,
    /// Use this value, in the `PATH` format of the platform
    Explicit(OsString),
    /// Don't consult a search path at all
    Disabled,
}

/// Where executables are looked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSearchConfig {
    pub install_dirs: Vec<PathBuf>,
    pub search_path: SearchPath,
    /// Bundled tool directory; defaults to the directory of the running executable
    pub resource_dir: Option<PathBuf>,
}

impl Default for ToolSearchConfig {
    fn default() -> Self {
        Self {
            install_dirs: DEFAULT_INSTALL_DIRS.iter().map(PathBuf::from).collect(),
            search_path: SearchPath::Inherit,
            resource_dir: None,
        }
    }
}

/// Locates executables according to a [`ToolPolicy`]
#[derive(Debug, Clone, Default)]
pub struct ExecutableResolver {
    config: ToolSearchConfig,
}

impl ExecutableResolver {
    pub fn new(config: ToolSearchConfig) -> Self {
        Self { config }
    }

    /// Resolve a tool to an executable path.
    ///
    /// ffprobe is first looked up next to the ffmpeg the same policy would
    /// pick, so both come from one installation when possible.
    pub fn resolve(&self, tool: Tool, policy: ToolPolicy) -> DomainResult<ResolvedTool> {
        let found = match tool {
            Tool::Ffmpeg => self.find(tool, policy),
            Tool::Ffprobe => self
                .sibling_of_ffmpeg(policy)
                .or_else(|| self.find(tool, policy)),
        };

        match found {
            Some(path) => {
                debug!(tool = %tool, policy = ?policy, path = %path.display(), "Resolved tool");
                Ok(ResolvedTool { tool, path })
            }
            None => {
                debug!(tool = %tool, policy = ?policy, "Tool not found");
                Err(DomainError::ToolNotFound { tool })
            }
        }
    }

    /// Whether switching to installed tools would find both ffmpeg and ffprobe
    pub fn installed_tools_available(&self) -> bool {
        self.resolve(Tool::Ffmpeg, ToolPolicy::Installed).is_ok()
            && self.resolve(Tool::Ffprobe, ToolPolicy::Installed).is_ok()
    }

    fn sibling_of_ffmpeg(&self, policy: ToolPolicy) -> Option<PathBuf> {
        let ffmpeg = self.find(Tool::Ffmpeg, policy)?;
        let dir = ffmpeg.parent()?;
        executable_in(Tool::Ffprobe.executable_name(), dir)
    }

    fn find(&self, tool: Tool, policy: ToolPolicy) -> Option<PathBuf> {
        let name = tool.executable_name();
        self.search_dirs(policy)
            .iter()
            .find_map(|dir| executable_in(name, dir))
    }

    fn search_dirs(&self, policy: ToolPolicy) -> Vec<PathBuf> {
        match policy {
            ToolPolicy::Installed => {
                let mut dirs = self.config.install_dirs.clone();
                dirs.extend(self.path_entries());
                dirs
            }
            ToolPolicy::Bundled => match self.bundled_root() {
                Some(root) => vec![root.clone(), root.join("bin")],
                None => Vec::new(),
            },
        }
    }

    fn path_entries(&self) -> Vec<PathBuf> {
        let value = match &self.config.search_path {
            SearchPath::Inherit => std::env::var_os("PATH"),
            SearchPath::Explicit(value) => Some(value.clone()),
            SearchPath::Disabled => None,
        };

        value
            .map(|value| {
                std::env::split_paths(&value)
                    .filter(|entry| !entry.as_os_str().is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn bundled_root(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.config.resource_dir {
            return Some(dir.clone());
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
    }
}

/// An existing, executable file called `name` directly inside `dir`
fn executable_in(name: &str, dir: &Path) -> Option<PathBuf> {
    if dir.as_os_str().is_empty() {
        return None;
    }
    which::which_in(name, Some(dir.as_os_str()), dir).ok()
}
