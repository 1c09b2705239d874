//! Registries the tests of every module share: the `proj.db` libproj itself reads, and
//! private copies of it that a test may narrow down or damage.
use crate::context::ProjContext;
use crate::ProjDb;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

/// The registry libproj finds by itself
pub(crate) fn installed_proj_db() -> PathBuf {
    ProjContext::new()
        .unwrap()
        .database_path()
        .expect("libproj should know where its proj.db is")
}

pub(crate) fn registry() -> ProjDb {
    ProjDb::open(installed_proj_db()).unwrap()
}

/// A writable copy of the installed registry
pub(crate) fn registry_copy() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("proj.db");
    fs::copy(installed_proj_db(), &path).unwrap();
    (dir, path)
}

/// A copy of the registry whose catalog lists only `keep`, every other CRS marked
/// deprecated. The rows stay, so transformations to the kept CRSs still resolve.
pub(crate) fn catalog_of(keep: &[(&str, &str)]) -> (TempDir, PathBuf) {
    let (dir, path) = registry_copy();
    let conn = Connection::open(&path).unwrap();
    let tables: Vec<String> = conn
        .prepare("SELECT DISTINCT table_name FROM crs_view")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<rusqlite::Result<_>>()
        .unwrap();
    for table in &tables {
        conn.execute(&format!("UPDATE {} SET deprecated = 1", table), [])
            .unwrap();
        for (auth_name, code) in keep {
            conn.execute(
                &format!(
                    "UPDATE {} SET deprecated = 0 WHERE auth_name = ?1 AND code = ?2",
                    table
                ),
                params![auth_name, code],
            )
            .unwrap();
        }
    }
    (dir, path)
}

/// Give a CRS one more usage, over the extent another CRS of the same authority is used in
pub(crate) fn add_usage(
    path: &Path,
    table_name: &str,
    auth_name: &str,
    code: &str,
    extent_of: &str,
) {
    let conn = Connection::open(path).unwrap();
    let inserted = conn
        .execute(
            "INSERT INTO usage
             SELECT 'TEST', 'extra_' || ?3, o.object_table_name, o.object_auth_name,
                    o.object_code, e.extent_auth_name, e.extent_code,
                    o.scope_auth_name, o.scope_code
             FROM usage o, usage e
             WHERE o.object_table_name = ?1 AND o.object_auth_name = ?2 AND o.object_code = ?3
               AND e.object_auth_name = ?2 AND e.object_code = ?4
             LIMIT 1",
            params![table_name, auth_name, code, extent_of],
        )
        .unwrap();
    assert_eq!(inserted, 1);
}
