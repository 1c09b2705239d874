//! Where the registry is read from and where the table is written to.
use crate::context::ProjContext;
use crate::result::{Error, Result};
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT: &str = "definitions.ts";
pub const PROJ_DB_FILE: &str = "proj.db";

/// Share directories PROJ is commonly installed to, searched after the environment
const SYSTEM_PROJ_DIRS: &[&str] = &[
    "/usr/share/proj",
    "/usr/local/share/proj",
    "/opt/homebrew/share/proj",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub proj_db: PathBuf,
    pub output: PathBuf,
}

impl GeneratorConfig {
    /// Fill in whatever wasn't given explicitly.
    ///
    /// # Errors
    /// [`Error::DatabaseNotFound`] when no path is given and no `proj.db` can be found.
    pub fn resolve(proj_db: Option<PathBuf>, output: Option<PathBuf>) -> Result<GeneratorConfig> {
        let proj_db = match proj_db {
            Some(p) => p,
            None => locate_proj_db().ok_or(Error::DatabaseNotFound)?,
        };
        Ok(GeneratorConfig {
            proj_db,
            output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
        })
    }
}

fn proj_db_in(dir: &Path) -> Option<PathBuf> {
    let candidate = dir.join(PROJ_DB_FILE);
    candidate.is_file().then(|| candidate)
}

/// Search `candidates` in order; entries of a path list variable are searched left to right
fn first_proj_db<I>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    candidates.into_iter().find_map(|dir| proj_db_in(&dir))
}

/// The `proj.db` the environment provides: `$PROJ_DATA`, then `$PROJ_LIB`, then the usual
/// system share directories, then whichever database the linked libproj reads by default
pub fn locate_proj_db() -> Option<PathBuf> {
    let from_env = ["PROJ_DATA", "PROJ_LIB"]
        .into_iter()
        .filter_map(env::var_os)
        .flat_map(|v| env::split_paths(&v).collect::<Vec<_>>());
    let found = first_proj_db(from_env.chain(SYSTEM_PROJ_DIRS.iter().map(PathBuf::from)))
        .or_else(libproj_default);
    match &found {
        Some(path) => tracing::debug!("using {}", path.display()),
        None => tracing::debug!("no proj.db in PROJ_DATA, PROJ_LIB or the system directories"),
    }
    found
}

fn libproj_default() -> Option<PathBuf> {
    ProjContext::new()
        .ok()
        .and_then(|context| context.database_path())
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn explicit_paths_win() {
        let config = GeneratorConfig::resolve(
            Some(PathBuf::from("/data/proj.db")),
            Some(PathBuf::from("out/defs.ts")),
        )
        .unwrap();
        assert_eq!(config.proj_db, PathBuf::from("/data/proj.db"));
        assert_eq!(config.output, PathBuf::from("out/defs.ts"));
    }

    #[test]
    fn output_defaults_to_definitions_ts() {
        let config = GeneratorConfig::resolve(Some(PathBuf::from("proj.db")), None).unwrap();
        assert_eq!(config.output, PathBuf::from("definitions.ts"));
    }

    #[test]
    fn searches_directories_in_order() {
        let empty = tempdir().unwrap();
        let first = tempdir().unwrap();
        let second = tempdir().unwrap();
        fs::write(first.path().join(PROJ_DB_FILE), b"").unwrap();
        fs::write(second.path().join(PROJ_DB_FILE), b"").unwrap();

        let found = first_proj_db(vec![
            empty.path().to_path_buf(),
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ]);
        assert_eq!(found, Some(first.path().join(PROJ_DB_FILE)));
        assert_eq!(first_proj_db(vec![empty.path().to_path_buf()]), None);
    }

    #[test]
    fn libproj_knows_its_own_database() {
        let path = libproj_default().unwrap();
        assert_eq!(path.file_name().unwrap(), PROJ_DB_FILE);
        assert!(locate_proj_db().is_some());
    }

    #[test]
    fn a_directory_named_proj_db_is_not_a_database() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(PROJ_DB_FILE)).unwrap();
        assert_eq!(first_proj_db(vec![dir.path().to_path_buf()]), None);
    }
}
