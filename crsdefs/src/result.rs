/// The result returned by many methods within the crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that abort a generation run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error when accessing the SQLite database")]
    SQLiteError(#[from] rusqlite::Error),
    #[error("Error writing the generated definitions")]
    Io(#[from] std::io::Error),
    #[error("PROJ database failed validation check: {0}")]
    ValidationError(String),
    #[error("Could not find a proj.db, set PROJ_DATA or pass its path explicitly")]
    DatabaseNotFound,
    #[error("PROJ context: {0}")]
    ProjContext(String),
    #[error("The reference CRS could not be resolved")]
    ReferenceCrs(#[source] CrsError),
}

/// A catalog entry that can't be turned into a usable CRS.
///
/// The generator drops the entry and carries on with the next one.
#[derive(Debug, thiserror::Error)]
pub enum CrsError {
    #[error("crs not found: {auth_name}:{code}")]
    NotFound { auth_name: String, code: String },
    #[error("cannot build crs {auth_name}:{code}: {reason}")]
    Unresolvable {
        auth_name: String,
        code: String,
        reason: String,
    },
    #[error("cannot export {auth_name}:{code} as a PROJ string: {reason}")]
    ProjString {
        auth_name: String,
        code: String,
        reason: String,
    },
}

/// No usable coordinate operation between two CRSs.
///
/// The generator keeps the entry, with an unknown accuracy.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("no coordinate operation from {source_crs} to {target_crs}: {reason}")]
    NoOperation {
        source_crs: String,
        target_crs: String,
        reason: String,
    },
    #[error("operation from {source_crs} to {target_crs} has no PROJ string: {reason}")]
    ProjString {
        source_crs: String,
        target_crs: String,
        reason: String,
    },
}
