use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

/// Which path spelling the filesystem calls expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }
}

fn wsl_mount_re() -> &'static Regex {
    static WSL_MOUNT_RE: OnceLock<Regex> = OnceLock::new();
    WSL_MOUNT_RE.get_or_init(|| Regex::new(r"^/mnt/([A-Za-z])(?:/(.*))?$").expect("valid regex"))
}

fn drive_letter_re() -> &'static Regex {
    static DRIVE_LETTER_RE: OnceLock<Regex> = OnceLock::new();
    DRIVE_LETTER_RE.get_or_init(|| Regex::new(r"^([A-Za-z]):[\\/](.*)$").expect("valid regex"))
}

/// Rewrites `/mnt/c/...` and `C:\...` into the spelling of the running platform.
pub fn normalize(path: &str) -> String {
    normalize_for(path, Platform::current())
}

/// Anything that doesn't look like the foreign spelling passes through untouched.
pub fn normalize_for(path: &str, platform: Platform) -> String {
    match platform {
        Platform::Windows => match wsl_mount_re().captures(path) {
            Some(caps) => {
                let drive = caps[1].to_uppercase();
                let rest = caps.get(2).map_or("", |m| m.as_str());
                format!("{}:\\{}", drive, rest.replace('/', "\\"))
            }
            None => path.to_string(),
        },
        Platform::Posix => match drive_letter_re().captures(path) {
            Some(caps) => {
                let drive = caps[1].to_lowercase();
                format!("/mnt/{}/{}", drive, caps[2].replace('\\', "/"))
            }
            None => path.to_string(),
        },
    }
}

/// Normalizes `pattern`, anchors it at `cwd` when relative, and folds `.`/`..` lexically.
pub fn absolutize(pattern: &str, cwd: &Path) -> PathBuf {
    let native = normalize(pattern);
    let path = Path::new(&native);
    if path.is_absolute() {
        clean(path)
    } else {
        clean(&cwd.join(path))
    }
}

/// Lexical cleanup only; never touches the filesystem, so glob segments survive.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub fn is_glob(segment: &str) -> bool {
    segment.contains('*') || segment.contains('?')
}

/// Longest leading run of glob-free components, e.g. `/repo/src` for `/repo/src/**/*.rs`.
pub fn glob_base(pattern: &Path) -> PathBuf {
    let mut base = PathBuf::new();
    for component in pattern.components() {
        if is_glob(&component.as_os_str().to_string_lossy()) {
            break;
        }
        base.push(component);
    }
    base
}
