//! File system operations on the output tree: emptying the output directory
//! before a build ([`clean_output_dir`]) and copying the static assets into
//! it afterwards ([`copy_dir`]).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Empties `dir` so a build starts from a blank slate. If `dir` is a
/// directory, every entry inside it is removed but the directory itself (and
/// its permissions) is kept. If `dir` is some other kind of file it is
/// replaced by an empty directory, and if it doesn't exist it is created
/// along with any missing parents. Running this twice in a row leaves the
/// same empty directory behind.
pub fn clean_output_dir(dir: &Path) -> Result<()> {
    let clean = |err| Error::Clean {
        path: dir.to_owned(),
        err,
    };

    match fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => {
            for entry in fs::read_dir(dir).map_err(clean)? {
                let entry = entry.map_err(clean)?;
                let path = entry.path();
                let removed = if entry.file_type().map_err(clean)?.is_dir() {
                    fs::remove_dir_all(&path)
                } else {
                    fs::remove_file(&path)
                };
                removed.map_err(|err| Error::Clean { path, err })?;
            }
            tracing::debug!("cleaned output directory {}", dir.display());
            Ok(())
        }
        Ok(_) => {
            tracing::info!("replacing file {} with a directory", dir.display());
            fs::remove_file(dir).map_err(clean)?;
            fs::create_dir(dir).map_err(clean)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("creating output directory {}", dir.display());
            fs::create_dir_all(dir).map_err(clean)
        }
        Err(e) => Err(clean(e)),
    }
}

/// Recursively copies the directory `src` to `dst`, preserving the tree
/// structure, the bytes of every file, and the permissions of every
/// directory. `dst` must not exist yet. A failure partway through leaves
/// whatever was copied so far in place.
pub fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    match fs::symlink_metadata(dst) {
        Ok(_) => return Err(Error::DestinationExists(dst.to_owned())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(copy_error(src, dst, e)),
    }
    _copy_dir(src, dst)?;
    tracing::debug!("copied {} to {}", src.display(), dst.display());
    Ok(())
}

fn _copy_dir(src: &Path, dst: &Path) -> Result<()> {
    let permissions = fs::metadata(src)
        .map_err(|e| copy_error(src, dst, e))?
        .permissions();
    fs::create_dir(dst).map_err(|e| copy_error(src, dst, e))?;
    fs::set_permissions(dst, permissions).map_err(|e| copy_error(src, dst, e))?;

    for entry in fs::read_dir(src).map_err(|e| copy_error(src, dst, e))? {
        let entry = entry.map_err(|e| copy_error(src, dst, e))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if fs::metadata(&from)
            .map_err(|e| copy_error(&from, &to, e))?
            .is_dir()
        {
            _copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| copy_error(&from, &to, e))?;
        }
    }
    Ok(())
}

fn copy_error(src: &Path, dst: &Path, err: io::Error) -> Error {
    Error::Copy {
        src: src.to_owned(),
        dst: dst.to_owned(),
        err,
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error preparing or populating the output directory.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while cleaning the output directory.
    Clean { path: PathBuf, err: io::Error },

    /// Returned when the destination of a directory copy already exists.
    DestinationExists(PathBuf),

    /// Returned for I/O problems while copying a file or directory.
    Copy {
        src: PathBuf,
        dst: PathBuf,
        err: io::Error,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::DestinationExists(path) => {
                write!(f, "Destination directory already exists: '{}'", path.display())
            }
            Error::Copy { src, dst, err } => write!(
                f,
                "Copying '{}' to '{}': {}",
                src.display(),
                dst.display(),
                err
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Clean { path: _, err } => Some(err),
            Error::DestinationExists(_) => None,
            Error::Copy { err, .. } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> io::Result<Vec<PathBuf>> {
        fs::read_dir(dir)?.map(|e| e.map(|e| e.path())).collect()
    }

    #[test]
    fn test_clean_removes_stale_entries() -> io::Result<()> {
        let tmp = TempDir::new()?;
        let out = tmp.path().join("public");
        fs::create_dir_all(out.join("posts/old"))?;
        fs::write(out.join("index.html"), "stale")?;
        fs::write(out.join("posts/old/page.html"), "stale")?;
        fs::write(out.join(".hidden"), "stale")?;

        clean_output_dir(&out).unwrap();
        assert!(out.is_dir());
        assert!(entries(&out)?.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_keeps_directory_mode() -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new()?;
        let out = tmp.path().join("public");
        fs::create_dir(&out)?;
        fs::set_permissions(&out, fs::Permissions::from_mode(0o700))?;
        fs::write(out.join("stale.html"), "stale")?;

        clean_output_dir(&out).unwrap();
        assert_eq!(fs::metadata(&out)?.permissions().mode() & 0o777, 0o700);
        Ok(())
    }

    #[test]
    fn test_clean_is_idempotent() -> io::Result<()> {
        let tmp = TempDir::new()?;
        let out = tmp.path().join("public");
        fs::create_dir(&out)?;
        fs::write(out.join("stale.html"), "stale")?;

        clean_output_dir(&out).unwrap();
        clean_output_dir(&out).unwrap();
        assert!(out.is_dir());
        assert!(entries(&out)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_clean_creates_missing_directory() -> io::Result<()> {
        let tmp = TempDir::new()?;
        let out = tmp.path().join("not/yet/there");
        clean_output_dir(&out).unwrap();
        assert!(out.is_dir());
        Ok(())
    }

    #[test]
    fn test_clean_replaces_file_with_directory() -> io::Result<()> {
        let tmp = TempDir::new()?;
        let out = tmp.path().join("public");
        fs::write(&out, "I am a file")?;
        clean_output_dir(&out).unwrap();
        assert!(out.is_dir());
        assert!(entries(&out)?.is_empty());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_does_not_follow_symlinked_entries() -> io::Result<()> {
        let tmp = TempDir::new()?;
        let keep = tmp.path().join("keep");
        fs::create_dir(&keep)?;
        fs::write(keep.join("precious.txt"), "keep me")?;
        let out = tmp.path().join("public");
        fs::create_dir(&out)?;
        std::os::unix::fs::symlink(&keep, out.join("link"))?;

        clean_output_dir(&out).unwrap();
        assert!(entries(&out)?.is_empty());
        assert!(keep.join("precious.txt").is_file());
        Ok(())
    }

    #[test]
    fn test_copy_nested_tree() -> io::Result<()> {
        let tmp = TempDir::new()?;
        let src = tmp.path().join("static");
        fs::create_dir_all(src.join("css/vendor"))?;
        fs::create_dir(src.join("empty"))?;
        fs::write(src.join("favicon.ico"), [0u8, 1, 2, 255])?;
        fs::write(src.join("css/site.css"), "body {}")?;
        fs::write(src.join("css/vendor/reset.css"), "* { margin: 0 }")?;

        let dst = tmp.path().join("public/static");
        fs::create_dir(tmp.path().join("public"))?;
        copy_dir(&src, &dst).unwrap();

        assert_eq!(fs::read(dst.join("favicon.ico"))?, vec![0u8, 1, 2, 255]);
        assert_eq!(fs::read_to_string(dst.join("css/site.css"))?, "body {}");
        assert_eq!(
            fs::read_to_string(dst.join("css/vendor/reset.css"))?,
            "* { margin: 0 }"
        );
        assert!(dst.join("empty").is_dir());
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_preserves_directory_mode() -> io::Result<()> {
        use std::os::unix::fs::PermissionsExt;
        let tmp = TempDir::new()?;
        let src = tmp.path().join("static");
        fs::create_dir_all(src.join("private"))?;
        fs::set_permissions(src.join("private"), fs::Permissions::from_mode(0o750))?;

        let dst = tmp.path().join("copy");
        copy_dir(&src, &dst).unwrap();
        let mode = fs::metadata(dst.join("private"))?.permissions().mode();
        assert_eq!(mode & 0o777, 0o750);
        Ok(())
    }

    #[test]
    fn test_copy_refuses_existing_destination() -> io::Result<()> {
        let tmp = TempDir::new()?;
        let src = tmp.path().join("static");
        fs::create_dir(&src)?;
        fs::write(src.join("a.txt"), "new")?;
        let dst = tmp.path().join("copy");
        fs::create_dir(&dst)?;

        match copy_dir(&src, &dst) {
            Err(Error::DestinationExists(path)) => assert_eq!(path, dst),
            other => panic!("wanted DestinationExists, got {:?}", other),
        }
        assert!(!dst.join("a.txt").exists());
        Ok(())
    }

    #[test]
    fn test_copy_missing_source() {
        let tmp = TempDir::new().unwrap();
        let err = copy_dir(&tmp.path().join("missing"), &tmp.path().join("copy"))
            .unwrap_err();
        assert!(matches!(err, Error::Copy { .. }));
    }
}
