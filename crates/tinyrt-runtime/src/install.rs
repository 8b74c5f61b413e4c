//! Install protocol shared by every backend
//!
//! ```text
//! Checking ──► AlreadyInstalled
//!    │
//!    └──► Downloading ──► Extracting ──► Normalizing ──► Installed
//!              │               │               │
//!              └───────────────┴───────────────┴──► InstallFailed
//! ```
//!
//! Backends describe themselves with a [`Layout`] and resolve their paths
//! into an [`Installation`]; the steps here are free functions over those two.

use crate::artifact::{self, DownloadDescriptor};
use crate::exec::spawn_and_capture;
use crate::platform::Target;
use crate::transfer::{Extractor, Fetcher};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tinyrt_core::{EnvOverrides, InstallPhase, Result, RuntimeConfig, RuntimeError, RuntimeKind};

/// How the version query output is compared with the configured version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionMatch {
    /// Trimmed output equals the version
    Exact,
    /// Output contains the version
    Contains,
}

impl VersionMatch {
    pub fn matches(&self, reported: &str, expected: &str) -> bool {
        match self {
            VersionMatch::Exact => reported.trim() == expected,
            VersionMatch::Contains => reported.contains(expected),
        }
    }
}

/// Where archives are unpacked before normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractInto {
    /// Parent of the runtime path (the install root)
    InstallRoot,
    /// The runtime path itself
    RuntimePath,
}

/// Static description of one runtime kind's files and conventions
#[derive(Debug)]
pub struct Layout {
    pub kind: RuntimeKind,
    /// Interpreter file name under `bin/` on non-Windows platforms
    pub interpreter: &'static str,
    /// Interpreter file name at the runtime root on Windows
    pub windows_interpreter: &'static str,
    /// Extension of script files, without the dot
    pub script_extension: &'static str,
    pub version_flag: &'static str,
    pub version_match: VersionMatch,
    pub extract_into: ExtractInto,
    /// Canonical spelling of a configured version
    pub normalize_version: fn(&str) -> String,
}

impl Layout {
    pub fn executable_path(&self, runtime_path: &Path, target: &Target) -> PathBuf {
        if target.is_windows() {
            runtime_path.join(self.windows_interpreter)
        } else {
            runtime_path.join("bin").join(self.interpreter)
        }
    }
}

/// Resolved selectors and locations for one (kind, version, platform, arch)
#[derive(Debug, Clone)]
pub struct Installation {
    pub kind: RuntimeKind,
    pub version: String,
    pub target: Target,
    pub runtime_path: PathBuf,
    pub executable: PathBuf,
    pub mirror: Option<String>,
    pub scratch_dir: PathBuf,
    pub download_dir: PathBuf,
}

impl Installation {
    /// Applies `config` over `env` and the host defaults
    ///
    /// An explicit `runtime_path` bypasses the install root; the platform
    /// still selects the executable sub-path.
    ///
    /// # Errors
    ///
    /// Returns `Config` or `Io` if the default install root cannot be located.
    pub fn resolve(layout: &Layout, config: &RuntimeConfig, env: &EnvOverrides) -> Result<Self> {
        let kind = layout.kind;
        let version = (layout.normalize_version)(&config.version_or_default(kind));
        let target = Target::resolve(config, env);

        let runtime_path = match &config.runtime_path {
            Some(path) => path.clone(),
            None => tinyrt_core::paths::install_root(kind, config, env)?.join(&version),
        };
        let runtime_path = anchor(runtime_path)?;
        let executable = layout.executable_path(&runtime_path, &target);

        let mirror = config
            .mirror
            .clone()
            .or_else(|| env.mirror(kind).map(str::to_string));

        Ok(Self {
            kind,
            version,
            target,
            runtime_path,
            executable,
            mirror,
            scratch_dir: tinyrt_core::paths::scratch_root(config),
            download_dir: tinyrt_core::paths::download_dir(config),
        })
    }

    pub fn descriptor(&self) -> Result<DownloadDescriptor> {
        artifact::resolve(
            self.kind,
            &self.version,
            &self.target,
            self.mirror.as_deref(),
        )
    }

    fn extract_dest(&self, layout: &Layout) -> PathBuf {
        match layout.extract_into {
            ExtractInto::RuntimePath => self.runtime_path.clone(),
            ExtractInto::InstallRoot => self
                .runtime_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.runtime_path.clone()),
        }
    }

    fn failed(&self, phase: InstallPhase, source: RuntimeError) -> RuntimeError {
        RuntimeError::InstallFailed {
            kind: self.kind,
            version: self.version.clone(),
            phase,
            source: Box::new(source),
        }
    }
}

/// Resolves a relative path against the working directory
///
/// Extraction and normalization need a real parent directory, which a bare
/// `rt` does not have.
fn anchor(path: PathBuf) -> Result<PathBuf> {
    if path.has_root() {
        return Ok(path);
    }
    std::path::absolute(&path).map_err(|e| RuntimeError::io("resolve runtime path", e))
}

/// Live installed-check; any failure counts as "not installed"
pub async fn probe_installed(installation: &Installation, layout: &Layout) -> bool {
    if !is_dir(&installation.runtime_path).await || !is_file(&installation.executable).await {
        return false;
    }

    let output = match spawn_and_capture(&installation.executable, &[layout.version_flag]).await {
        Ok(output) if output.success() => output,
        Ok(output) => {
            tracing::debug!(
                "{} {} exited with {:?}",
                installation.executable.display(),
                layout.version_flag,
                output.exit_code
            );
            return false;
        }
        Err(e) => {
            tracing::debug!("version query failed: {}", e);
            return false;
        }
    };

    // Older interpreters print the version on stderr
    let reported = if output.stdout.trim().is_empty() {
        output.stderr.trim()
    } else {
        output.stdout.trim()
    };

    let matched = layout
        .version_match
        .matches(reported, &installation.version);
    if !matched {
        tracing::debug!(
            "{} reports '{}', expected {}",
            installation.executable.display(),
            reported,
            installation.version
        );
    }
    matched
}

/// Live check that records success in `installed`; the flag never reverts
pub async fn check_and_mark(
    installation: &Installation,
    layout: &Layout,
    installed: &AtomicBool,
) -> bool {
    let ready = probe_installed(installation, layout).await;
    if ready {
        installed.store(true, Ordering::Release);
    }
    ready
}

/// Fails unless the runtime is marked installed or passes a fresh check
pub async fn require_installed(
    installation: &Installation,
    layout: &Layout,
    installed: &AtomicBool,
) -> Result<()> {
    if installed.load(Ordering::Acquire) || check_and_mark(installation, layout, installed).await {
        return Ok(());
    }

    Err(RuntimeError::NotInstalled {
        kind: installation.kind,
        version: installation.version.clone(),
    })
}

/// Confirms an existing runtime or provisions a new one, then marks it ready
pub async fn install(
    installation: &Installation,
    layout: &Layout,
    installed: &AtomicBool,
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
) -> Result<()> {
    if check_and_mark(installation, layout, installed).await {
        tracing::info!(
            "{} {} already installed at {}",
            installation.kind.display_name(),
            installation.version,
            installation.runtime_path.display()
        );
        return Ok(());
    }

    provision(installation, layout, fetcher, extractor).await?;

    if !is_file(&installation.executable).await {
        tracing::warn!(
            "{} not found after install",
            installation.executable.display()
        );
    }
    installed.store(true, Ordering::Release);
    Ok(())
}

/// Downloads, unpacks and normalizes the runtime described by `installation`
///
/// The caller has already established that the runtime is not installed.
///
/// # Errors
///
/// Returns `InstallFailed` carrying the phase and the underlying error. A
/// failed download leaves whatever reached the scratch area in place.
pub async fn provision(
    installation: &Installation,
    layout: &Layout,
    fetcher: &dyn Fetcher,
    extractor: &dyn Extractor,
) -> Result<()> {
    let descriptor = installation
        .descriptor()
        .map_err(|e| installation.failed(InstallPhase::Downloading, e))?;
    let archive = installation.download_dir.join(&descriptor.file_name);

    tracing::info!(
        "downloading {} {} from {}",
        installation.kind.display_name(),
        installation.version,
        descriptor.url
    );
    create_dir_all(&installation.download_dir)
        .await
        .map_err(|e| installation.failed(InstallPhase::Downloading, e))?;
    fetcher
        .fetch(&descriptor.url, &archive)
        .await
        .map_err(|e| installation.failed(InstallPhase::Downloading, e))?;

    let dest = installation.extract_dest(layout);
    tracing::debug!("extracting {} into {}", archive.display(), dest.display());
    create_dir_all(&dest)
        .await
        .map_err(|e| installation.failed(InstallPhase::Extracting, e))?;
    extractor
        .extract(&archive, &dest, descriptor.archive_kind)
        .await
        .map_err(|e| installation.failed(InstallPhase::Extracting, e))?;

    finish_layout(installation, &dest, &descriptor.top_level_dir)
        .await
        .map_err(|e| installation.failed(InstallPhase::Normalizing, e))?;

    if let Err(e) = tokio::fs::remove_file(&archive).await {
        tracing::warn!(
            "failed to remove downloaded archive {}: {}",
            archive.display(),
            e
        );
    }

    tracing::info!(
        "installed {} {} at {}",
        installation.kind.display_name(),
        installation.version,
        installation.runtime_path.display()
    );
    Ok(())
}

async fn finish_layout(installation: &Installation, dest: &Path, top_level: &str) -> Result<()> {
    let extracted = dest.join(top_level);
    let runtime_path = installation.runtime_path.clone();
    let windows = installation.target.is_windows();

    tokio::task::spawn_blocking(move || -> Result<()> {
        if normalize_layout(&extracted, &runtime_path)? {
            tracing::debug!(
                "moved {} to {}",
                extracted.display(),
                runtime_path.display()
            );
        }
        if !windows {
            let marked = mark_executables(&runtime_path.join("bin"))?;
            tracing::debug!("marked {} files executable", marked);
        }
        Ok(())
    })
    .await
    .map_err(|e| RuntimeError::io("normalize layout", std::io::Error::other(e)))?
}

/// Moves `extracted` to `runtime_path`, replacing stale contents
///
/// `extracted` may live inside `runtime_path`; it is first moved into a
/// staging directory next to `runtime_path` so the replacement never deletes
/// its own source.
///
/// # Returns
///
/// `false` when there was nothing to move (flat archive).
pub fn normalize_layout(extracted: &Path, runtime_path: &Path) -> Result<bool> {
    if !extracted.is_dir() || extracted == runtime_path {
        return Ok(false);
    }

    let parent = runtime_path.parent().ok_or_else(|| {
        RuntimeError::Config(format!(
            "runtime path {} has no parent directory",
            runtime_path.display()
        ))
    })?;
    fs::create_dir_all(parent)
        .map_err(|e| RuntimeError::io(format!("create directory {}", parent.display()), e))?;

    // Staging on the same file system keeps every move a rename
    let staging = tempfile::Builder::new()
        .prefix(".tinyrt-staging-")
        .tempdir_in(parent)
        .map_err(|e| {
            RuntimeError::io(format!("create staging directory in {}", parent.display()), e)
        })?;
    let staged = staging.path().join("runtime");

    fs::rename(extracted, &staged).map_err(|e| {
        RuntimeError::io(
            format!("move {} to {}", extracted.display(), staged.display()),
            e,
        )
    })?;

    if runtime_path.exists() {
        fs::remove_dir_all(runtime_path).map_err(|e| {
            RuntimeError::io(format!("remove stale {}", runtime_path.display()), e)
        })?;
    }

    fs::rename(&staged, runtime_path).map_err(|e| {
        RuntimeError::io(
            format!("move {} to {}", staged.display(), runtime_path.display()),
            e,
        )
    })?;

    Ok(true)
}

/// Adds execute bits to every regular file directly inside `bin_dir`
///
/// # Returns
///
/// Number of files updated; `0` when `bin_dir` does not exist.
#[cfg(unix)]
pub fn mark_executables(bin_dir: &Path) -> Result<usize> {
    use std::os::unix::fs::PermissionsExt;

    if !bin_dir.is_dir() {
        return Ok(0);
    }

    let entries = fs::read_dir(bin_dir)
        .map_err(|e| RuntimeError::io(format!("read directory {}", bin_dir.display()), e))?;

    let mut marked = 0;
    for entry in entries {
        let entry = entry
            .map_err(|e| RuntimeError::io(format!("read directory {}", bin_dir.display()), e))?;
        let path = entry.path();

        // Symlinks are left alone; their targets are regular files elsewhere
        let file_type = entry
            .file_type()
            .map_err(|e| RuntimeError::io(format!("get file type of {}", path.display()), e))?;
        if !file_type.is_file() {
            continue;
        }

        let mut permissions = entry
            .metadata()
            .map_err(|e| RuntimeError::io(format!("get metadata for {}", path.display()), e))?
            .permissions();
        permissions.set_mode(permissions.mode() | 0o111);
        fs::set_permissions(&path, permissions)
            .map_err(|e| RuntimeError::io(format!("set permissions for {}", path.display()), e))?;
        marked += 1;
    }

    Ok(marked)
}

#[cfg(not(unix))]
pub fn mark_executables(_bin_dir: &Path) -> Result<usize> {
    Ok(0)
}

async fn create_dir_all(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| RuntimeError::io(format!("create directory {}", path.display()), e))
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}
