use std::ffi::OsString;
use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::{Ec2SshError, Result};

/// Private key file names probed under `~/.ssh`, in priority order.
pub const DEFAULT_PRIVATE_KEY_FILES: &[&str] = &[
    "id_rsa",
    "id_ecdsa",
    "id_ecdsa_sk",
    "id_ed25519",
    "id_ed25519_sk",
];

/// A private key and its `.pub` sibling, both present on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private: PathBuf,
    pub public: PathBuf,
}

impl KeyPair {
    /// Pair an existing private key with its public key.
    pub fn from_private(private: PathBuf) -> Result<Self> {
        if !private.is_file() {
            return Err(Ec2SshError::KeyFileNotFound(private));
        }
        let public = public_key_path(&private);
        if !public.is_file() {
            return Err(Ec2SshError::PublicKeyNotFound {
                private,
                expected: public,
            });
        }
        Ok(Self { private, public })
    }
}

pub fn home_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(Ec2SshError::HomeDirectory)
}

/// Expand a leading `~` or `~/` against the user's home directory.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path == "~" || path.starts_with("~/") {
        Ok(expand_tilde_in(path, &home_dir()?))
    } else {
        Ok(PathBuf::from(path))
    }
}

fn expand_tilde_in(path: &str, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Some("") => home.to_path_buf(),
        Some(rest) if rest.starts_with('/') => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(path),
    }
}

/// `<private>.pub`
pub fn public_key_path(private: &Path) -> PathBuf {
    let mut name = OsString::from(private.as_os_str());
    name.push(".pub");
    PathBuf::from(name)
}

/// First conventional private key in `~/.ssh` that exists as a regular file.
pub fn find_default_private_key() -> Result<PathBuf> {
    let ssh_dir = home_dir()?.join(".ssh");
    find_private_key_in(&ssh_dir).ok_or_else(|| Ec2SshError::PrivateKeyNotFound {
        tried: DEFAULT_PRIVATE_KEY_FILES.join(", "),
    })
}

fn find_private_key_in(ssh_dir: &Path) -> Option<PathBuf> {
    DEFAULT_PRIVATE_KEY_FILES
        .iter()
        .map(|name| ssh_dir.join(name))
        .find(|path| path.is_file())
}

/// Read a public key, trimming the trailing newline.
pub fn read_public_key(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Ec2SshError::Io(std::io::Error::new(
            e.kind(),
            format!("reading public key {}: {}", path.display(), e),
        ))
    })?;
    Ok(content.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, "key").unwrap();
        path
    }

    #[test]
    fn test_expand_tilde() {
        let home = Path::new("/home/alice");
        assert_eq!(
            expand_tilde_in("~/.ssh/id_rsa", home),
            PathBuf::from("/home/alice/.ssh/id_rsa")
        );
        assert_eq!(expand_tilde_in("~", home), PathBuf::from("/home/alice"));
        assert_eq!(
            expand_tilde_in("/etc/ssh/key", home),
            PathBuf::from("/etc/ssh/key")
        );
        assert_eq!(
            expand_tilde_in("~bob/.ssh/id_rsa", home),
            PathBuf::from("~bob/.ssh/id_rsa")
        );
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        assert_eq!(
            expand_tilde("relative/key").unwrap(),
            PathBuf::from("relative/key")
        );
    }

    #[test]
    fn test_public_key_path() {
        assert_eq!(
            public_key_path(Path::new("/home/alice/.ssh/id_ed25519")),
            PathBuf::from("/home/alice/.ssh/id_ed25519.pub")
        );
    }

    #[test]
    fn test_find_prefers_priority_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "id_ed25519");
        let ecdsa = touch(&dir, "id_ecdsa");

        assert_eq!(find_private_key_in(dir.path()), Some(ecdsa));
    }

    #[test]
    fn test_find_skips_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("id_rsa")).unwrap();
        let ed = touch(&dir, "id_ed25519_sk");

        assert_eq!(find_private_key_in(dir.path()), Some(ed));
    }

    #[test]
    fn test_find_none() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "config");
        assert_eq!(find_private_key_in(dir.path()), None);
    }

    #[test]
    fn test_key_pair_requires_public_key() {
        let dir = TempDir::new().unwrap();
        let private = touch(&dir, "id_rsa");

        let err = KeyPair::from_private(private.clone()).unwrap_err();
        assert!(matches!(err, Ec2SshError::PublicKeyNotFound { .. }));

        let public = touch(&dir, "id_rsa.pub");
        let pair = KeyPair::from_private(private.clone()).unwrap();
        assert_eq!(pair.private, private);
        assert_eq!(pair.public, public);
    }

    #[test]
    fn test_key_pair_requires_private_key() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "id_rsa.pub");

        let err = KeyPair::from_private(dir.path().join("id_rsa")).unwrap_err();
        assert!(matches!(err, Ec2SshError::KeyFileNotFound(_)));
    }

    #[test]
    fn test_read_public_key_trims() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("id_ed25519.pub");
        std::fs::write(&path, "ssh-ed25519 AAAAC3Nza alice@laptop\n").unwrap();

        assert_eq!(
            read_public_key(&path).unwrap(),
            "ssh-ed25519 AAAAC3Nza alice@laptop"
        );
    }

    #[test]
    fn test_read_public_key_missing() {
        let dir = TempDir::new().unwrap();
        let err = read_public_key(&dir.path().join("missing.pub")).unwrap_err();
        assert!(err.to_string().contains("missing.pub"));
    }
}
