use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// External executables the workflow depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolType {
    YtDlp,
    Ffmpeg,
}

impl ToolType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolType::YtDlp => "yt-dlp",
            ToolType::Ffmpeg => "ffmpeg",
        }
    }

    fn binary_name(&self) -> String {
        if cfg!(windows) {
            format!("{}.exe", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }
}

/// Install directories checked after PATH
pub const WELL_KNOWN_DIRS: [&str; 3] = ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];

/// Finds external tools: explicit override, then PATH, then well-known dirs
#[derive(Debug, Clone, Default)]
pub struct ToolLocator {
    overrides: Vec<(ToolType, PathBuf)>,
    search_path: Option<OsString>,
    well_known: Vec<PathBuf>,
}

impl ToolLocator {
    /// Locator backed by the process PATH and the well-known install dirs
    pub fn from_env() -> Self {
        Self {
            overrides: Vec::new(),
            search_path: std::env::var_os("PATH"),
            well_known: WELL_KNOWN_DIRS.iter().map(PathBuf::from).collect(),
        }
    }

    pub fn with_override(mut self, tool: ToolType, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.overrides.retain(|(t, _)| *t != tool);
            self.overrides.push((tool, path));
        }
        self
    }

    pub fn with_search_path(mut self, search_path: Option<OsString>) -> Self {
        self.search_path = search_path;
        self
    }

    pub fn with_well_known(mut self, dirs: Vec<PathBuf>) -> Self {
        self.well_known = dirs;
        self
    }

    pub fn locate(&self, tool: ToolType) -> Option<PathBuf> {
        // 1. Explicit path wins, even if it turns out to be wrong
        if let Some((_, path)) = self.overrides.iter().find(|(t, _)| *t == tool) {
            if !is_executable(path) {
                log::warn!(
                    "[Tools] {} override {} is not executable",
                    tool.as_str(),
                    path.display()
                );
            }
            return Some(path.clone());
        }

        let name = tool.binary_name();

        // 2. Try PATH
        if let Some(search_path) = &self.search_path {
            for dir in std::env::split_paths(search_path) {
                let candidate = dir.join(&name);
                if is_executable(&candidate) {
                    log::debug!("[Tools] Found {} in PATH: {}", tool.as_str(), candidate.display());
                    return Some(candidate);
                }
            }
        }

        // 3. Try common paths
        for dir in &self.well_known {
            let candidate = dir.join(&name);
            if is_executable(&candidate) {
                log::debug!("[Tools] Found {} at {}", tool.as_str(), candidate.display());
                return Some(candidate);
            }
        }

        log::info!("[Tools] {} not found", tool.as_str());
        None
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn make_tool(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_path_before_well_known() {
        let on_path = tempfile::tempdir().unwrap();
        let well_known = tempfile::tempdir().unwrap();
        let expected = make_tool(on_path.path(), "ffmpeg");
        make_tool(well_known.path(), "ffmpeg");

        let locator = ToolLocator::default()
            .with_search_path(Some(on_path.path().as_os_str().to_owned()))
            .with_well_known(vec![well_known.path().to_path_buf()]);

        assert_eq!(locator.locate(ToolType::Ffmpeg), Some(expected));
    }

    #[test]
    fn test_falls_back_to_well_known() {
        let empty = tempfile::tempdir().unwrap();
        let well_known = tempfile::tempdir().unwrap();
        let expected = make_tool(well_known.path(), "yt-dlp");

        let locator = ToolLocator::default()
            .with_search_path(Some(empty.path().as_os_str().to_owned()))
            .with_well_known(vec![well_known.path().to_path_buf()]);

        assert_eq!(locator.locate(ToolType::YtDlp), Some(expected));
        assert_eq!(locator.locate(ToolType::Ffmpeg), None);
    }

    #[test]
    fn test_non_executable_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ffmpeg"), "").unwrap();
        std::fs::set_permissions(
            dir.path().join("ffmpeg"),
            std::fs::Permissions::from_mode(0o644),
        )
        .unwrap();

        let locator = ToolLocator::default()
            .with_search_path(Some(dir.path().as_os_str().to_owned()));
        assert_eq!(locator.locate(ToolType::Ffmpeg), None);
    }

    #[test]
    fn test_override_wins() {
        let locator = ToolLocator::default()
            .with_override(ToolType::Ffmpeg, Some(PathBuf::from("/custom/ffmpeg")));
        assert_eq!(
            locator.locate(ToolType::Ffmpeg),
            Some(PathBuf::from("/custom/ffmpeg"))
        );
        assert_eq!(locator.locate(ToolType::YtDlp), None);
    }
}
