pub mod config;
pub mod context;
pub mod crs;
pub mod generator;
pub mod records;
pub mod result;
mod sql;
pub mod srs;
pub mod transform;
pub mod types;
use crate::context::ProjContext;
use crate::records::MetadataEntry;
use crate::result::{Error, Result};
use crate::sql::{queries::*, schema::REQUIRED_TABLES};
use crate::types::CrsInfo;
#[doc(inline)]
pub use crsdefs_derive::RegistryRow;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Params};
use std::collections::HashSet;
use std::path::Path;

/// The oldest `DATABASE.LAYOUT.VERSION.MAJOR` the queries in this crate are written against
pub const MIN_LAYOUT_VERSION_MAJOR: i64 = 1;

/// A PROJ coordinate reference system database (`proj.db`), opened read-only and validated.
///
/// The catalog is read over SQL. CRSs and operations are built by libproj, reading the same
/// file through [`ProjDb::proj`].
pub struct ProjDb {
    /// The underlying rusqlite connection for the registry
    ///
    /// Access is provided here for queries this crate doesn't cover.
    pub conn: Connection,
    /// The libproj context bound to the registry
    pub proj: ProjContext,
}

/// A trait that maps a struct onto one registry table, so rows can be fetched by
/// authority and code or by an arbitrary predicate.
///
/// Implement it with `#[derive(RegistryRow)]`.
pub trait RegistryRow: Sized {
    /// A `SELECT` of every mapped column, without a `WHERE` clause
    fn select_sql() -> &'static str;

    /// Build a value from a row produced by [`RegistryRow::select_sql`]
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self>;
}

impl ProjDb {
    /// Open a registry read-only, checking that it is intact, that it has every table the
    /// generator depends on and that its layout is one the queries here understand.
    ///
    /// # Examples
    /// ```ignore
    /// let db = crsdefs::ProjDb::open("/usr/share/proj/proj.db").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<ProjDb> {
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        let integrity_check: String =
            conn.query_row("SELECT * FROM pragma_integrity_check()", [], |row| {
                row.get(0)
            })?;
        if integrity_check != "ok" {
            return Err(Error::ValidationError(format!(
                "integrity check reported {}",
                integrity_check
            )));
        }
        check_schema(&conn)?;
        let (major, minor) = layout_version(&conn)?;
        if major < MIN_LAYOUT_VERSION_MAJOR {
            return Err(Error::ValidationError(format!(
                "database layout {}.{} is older than {}.0",
                major, minor, MIN_LAYOUT_VERSION_MAJOR
            )));
        }
        let proj = ProjContext::with_database(&path)?;
        tracing::debug!(major, minor, "opened PROJ database");
        Ok(ProjDb { conn, proj })
    }

    /// Close the registry
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::SQLiteError(e))
    }

    /// Fails with [`Error::ValidationError`] naming every required table the registry lacks
    pub fn check_schema(&self) -> Result<()> {
        check_schema(&self.conn)
    }

    /// `DATABASE.LAYOUT.VERSION.MAJOR` and `.MINOR` from the metadata table
    pub fn layout_version(&self) -> Result<(i64, i64)> {
        layout_version(&self.conn)
    }

    /// Fetch the row of type `T` with the given authority and code, if there is one.
    pub fn get_by_code<T: RegistryRow>(
        &self,
        auth_name: &str,
        code: &str,
    ) -> rusqlite::Result<Option<T>> {
        let sql = format!("{} WHERE auth_name = ?1 AND code = ?2", T::select_sql());
        self.conn
            .query_row(&sql, params![auth_name, code], |row| T::from_row(row))
            .optional()
    }

    /// Fetch all rows of type `T` that match the given predicate.
    /// # Examples
    /// ```ignore
    /// let projected: Vec<CrsRecord> = db
    ///     .get_where("table_name = ?1 AND auth_name = ?2", params!["projected_crs", "EPSG"])
    ///     .unwrap();
    /// ```
    pub fn get_where<T: RegistryRow, P: Params>(
        &self,
        predicate: &str,
        params: P,
    ) -> rusqlite::Result<Vec<T>> {
        select_where(&self.conn, predicate, params)
    }

    /// Every non-deprecated CRS known to the registry, one entry per usage, in a stable order.
    ///
    /// Nothing is filtered beyond deprecation. Each call runs the query again.
    pub fn query_crs_info(&self) -> Result<Vec<CrsInfo>> {
        let mut stmt = self.conn.prepare(QUERY_CRS_INFO)?;
        let rows = stmt.query_map([], |row| CrsInfo::from_row(row))?;
        Ok(rows.collect::<rusqlite::Result<Vec<CrsInfo>>>()?)
    }
}

fn select_where<T: RegistryRow, P: Params>(
    conn: &Connection,
    predicate: &str,
    params: P,
) -> rusqlite::Result<Vec<T>> {
    let sql = format!("{} WHERE {}", T::select_sql(), predicate);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, |row| T::from_row(row))?;
    rows.collect()
}

fn metadata(conn: &Connection, key: &str) -> Result<Option<String>> {
    let entries: Vec<MetadataEntry> = select_where(conn, "key = ?1", [key])?;
    Ok(entries.into_iter().next().map(|e| e.value))
}

fn layout_version(conn: &Connection) -> Result<(i64, i64)> {
    let major = metadata(conn, "DATABASE.LAYOUT.VERSION.MAJOR")?.ok_or_else(|| {
        Error::ValidationError("missing DATABASE.LAYOUT.VERSION.MAJOR".to_owned())
    })?;
    let minor = metadata(conn, "DATABASE.LAYOUT.VERSION.MINOR")?;
    let parse = |key: &str, value: &str| {
        value.trim().parse::<i64>().map_err(|_| {
            Error::ValidationError(format!("{} is not a number: {}", key, value))
        })
    };
    Ok((
        parse("DATABASE.LAYOUT.VERSION.MAJOR", &major)?,
        match minor {
            Some(m) => parse("DATABASE.LAYOUT.VERSION.MINOR", &m)?,
            None => 0,
        },
    ))
}

fn check_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare(QUERY_SCHEMA_OBJECTS)?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<HashSet<String>>>()?;
    let missing: Vec<&str> = REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|t| !present.contains(*t))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::ValidationError(format!(
            "missing tables: {}",
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
pub(crate) mod fixtures;

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use std::fs;
    use tempfile::tempdir;

    use crate::records::CrsRecord;
    use crate::types::CrsType;

    use super::*;

    #[test]
    fn open_and_close() {
        let db = fixtures::registry();
        let (major, _) = db.layout_version().unwrap();
        assert!(major >= MIN_LAYOUT_VERSION_MAJOR);
        assert_eq!(
            db.proj.database_path(),
            Some(fixtures::installed_proj_db())
        );
        db.close().unwrap();
    }

    #[test]
    fn open_rejects_a_database_that_is_not_a_registry() {
        let dir = tempdir().unwrap();
        let filename = dir.path().join("empty.db");
        Connection::open(&filename)
            .unwrap()
            .execute_batch("CREATE TABLE metadata (key TEXT, value TEXT)")
            .unwrap();

        match ProjDb::open(&filename) {
            Err(Error::ValidationError(msg)) => {
                assert!(msg.starts_with("missing tables: crs_view, usage"));
                assert!(!msg.contains("metadata"));
            }
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("opened something that isn't a registry"),
        }
    }

    #[test]
    fn open_rejects_missing_tables() {
        let (_dir, path) = fixtures::registry_copy();
        Connection::open(&path)
            .unwrap()
            .execute_batch("DROP TABLE helmert_transformation_table; DROP TABLE axis;")
            .unwrap();

        match ProjDb::open(&path) {
            Err(Error::ValidationError(msg)) => {
                assert_eq!(msg, "missing tables: axis, helmert_transformation_table")
            }
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("opened a registry without its axis table"),
        }
    }

    #[test]
    fn open_rejects_missing_layout_version() {
        let (_dir, path) = fixtures::registry_copy();
        Connection::open(&path)
            .unwrap()
            .execute("DELETE FROM metadata WHERE key LIKE 'DATABASE.LAYOUT.VERSION.%'", [])
            .unwrap();

        match ProjDb::open(&path) {
            Err(Error::ValidationError(msg)) => assert!(msg.contains("LAYOUT")),
            Err(e) => panic!("unexpected error {}", e),
            Ok(_) => panic!("opened a registry without a layout version"),
        }
    }

    #[test]
    fn open_fails_for_missing_file() {
        let dir = tempdir().unwrap();
        let filename = dir.path().join("missing.db");
        assert!(matches!(
            ProjDb::open(&filename),
            Err(Error::SQLiteError(_))
        ));
        assert!(fs::metadata(&filename).is_err());
    }

    #[test]
    fn get_by_code_reads_integer_affinity_codes() {
        let db = fixtures::registry();
        let utm: CrsRecord = db.get_by_code("EPSG", "32631").unwrap().unwrap();
        assert_eq!(utm.table_name, "projected_crs");
        assert_eq!(utm.code, "32631");
        assert_eq!(utm.name, "WGS 84 / UTM zone 31N");
        assert_eq!(utm.kind, "projected");
        assert!(!utm.deprecated);
        assert!(db.get_by_code::<CrsRecord>("EPSG", "1").unwrap().is_none());
    }

    #[test]
    fn get_where_filters() {
        let db = fixtures::registry();
        let wgs84: Vec<CrsRecord> = db
            .get_where(
                "auth_name = ?1 AND code = ?2 AND table_name = ?3",
                params!["EPSG", "4326", "geodetic_crs"],
            )
            .unwrap();
        assert_eq!(wgs84.len(), 1);
        assert_eq!(wgs84[0].kind, "geographic 2D");
    }

    #[test]
    fn query_crs_info_lists_catalog() {
        let db = fixtures::registry();
        let infos = db.query_crs_info().unwrap();

        let wgs84 = infos
            .iter()
            .find(|i| i.auth_name == "EPSG" && i.code == "4326")
            .unwrap();
        assert_eq!(wgs84.name.as_deref(), Some("WGS 84"));
        assert_eq!(wgs84.kind, CrsType::Geographic2D);
        assert_eq!(wgs84.projection_method_name, None);
        let area = wgs84.area_of_use.as_ref().unwrap();
        assert!(area.name.starts_with("World"));
        assert_eq!(
            (area.west, area.south, area.east, area.north),
            (-180.0, -90.0, 180.0, 90.0)
        );

        let utm = infos
            .iter()
            .find(|i| i.auth_name == "EPSG" && i.code == "32631")
            .unwrap();
        assert_eq!(utm.kind, CrsType::Projected);
        assert_eq!(
            utm.projection_method_name.as_deref(),
            Some("Transverse Mercator")
        );

        // deprecated entries never show up
        let deprecated: Vec<CrsRecord> = db.get_where("deprecated = 1", []).unwrap();
        assert!(!deprecated.is_empty());
        assert!(!infos
            .iter()
            .any(|i| i.auth_name == deprecated[0].auth_name && i.code == deprecated[0].code));
        // the stored order is stable between calls
        assert_eq!(infos, db.query_crs_info().unwrap());
    }

    #[test]
    fn query_crs_info_repeats_crs_with_several_usages() {
        let (_dir, path) = fixtures::catalog_of(&[("EPSG", "4326")]);
        fixtures::add_usage(&path, "geodetic_crs", "EPSG", "4326", "32631");
        let db = ProjDb::open(&path).unwrap();

        let infos = db.query_crs_info().unwrap();
        assert_eq!(infos.len(), 2);
        assert!(infos.iter().all(|i| i.code == "4326"));
        assert!(infos[0].area_of_use.as_ref().unwrap().name.starts_with("World"));
        assert_eq!(infos[1].area_of_use.as_ref().unwrap().east, 6.0);
    }
}
