//! Generation of the `definitions.ts` table of PROJ strings.
//!
//! Every catalog entry is resolved, exported and measured against the reference CRS, then
//! written as a documented `export const`. Entries that can't be resolved are dropped,
//! entries whose operation to the reference can't be built are kept with an unknown accuracy.
//! A registry that fails underneath the generator stops it, before anything is written.
use crate::crs::{Crs, CrsDetails};
use crate::records::CrsRecord;
use crate::result::{CrsError, Error, Result, TransformError};
use crate::srs::AuthorityCode;
use crate::transform::{Accuracy, Transformer};
use crate::types::CrsInfo;
use crate::ProjDb;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Written at the top of every generated file, whatever the catalog holds
pub const HEADER: &str = "// Auto-generated file from `build-proj-crs`, do not edit

/**
 * WGS 84
 * - **GEOGRAPHIC_2D_CRS**: 4326
 * - **Projection** None
 * - **Area**: World
 * - **Unit**: degree
 * - **Ellipsoid**: WGS 84
 * - **Accuracy**: `null` (in metre)
 * - **Bounds**: `[-180.0, -90.0, 180.0, 90.0]`
 */
export const WGS84 =
  '+title=WGS 84 (long/lat) +proj=longlat +ellps=WGS84 +datum=WGS84 +units=degrees';
";

const NULL_MARKER: &str = "`null`";

/// The exported name of a CRS, e.g. `EPSG_4326`. Dots in the code become underscores.
pub fn derive_identifier(auth_name: &str, code: &str) -> String {
    format!("{}_{}", auth_name, code.replace('.', "_"))
}

fn escape(proj_string: &str) -> String {
    proj_string.replace('\\', "\\\\").replace('\'', "\\'")
}

/// A float the way the documentation has always shown it: shortest round-trip digits,
/// a trailing `.0` on whole numbers and a signed two-digit exponent (`1e-05`, `1e+16`).
pub fn repr_float(value: f64) -> String {
    let shortest = format!("{:?}", value);
    match shortest.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent.trim_start_matches('+')),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => shortest,
    }
}

/// One documented declaration
pub fn format_entry(
    info: &CrsInfo,
    details: &CrsDetails,
    accuracy: Accuracy,
    proj_string: &str,
    identifier: &str,
) -> String {
    let area = info.area_of_use.as_ref();
    let bounds = match area {
        Some(a) => format!(
            "[{}, {}, {}, {}]",
            repr_float(a.west),
            repr_float(a.south),
            repr_float(a.east),
            repr_float(a.north)
        ),
        None => "[None, None, None, None]".to_owned(),
    };
    let accuracy = match accuracy.metres() {
        Some(m) => repr_float(m),
        None => NULL_MARKER.to_owned(),
    };
    format!(
        "
/**
 * {name}
 * - **{kind}**: {code}
 * - **Projection** {method}
 * - **Area**: {area}
 * - **Unit**: {unit}
 * - **Ellipsoid**: {ellipsoid}
 * - **Accuracy**: {accuracy} (in metre)
 * - **Bounds**: `{bounds}`
 */
export const {identifier} = '{proj}';
",
        name = info.name.as_deref().unwrap_or("No description"),
        kind = info.kind.name(),
        code = info.code,
        method = info.projection_method_name.as_deref().unwrap_or("None"),
        area = area.map(|a| a.name.as_str()).unwrap_or("Unknown area"),
        unit = details.unit_name.as_deref().unwrap_or(NULL_MARKER),
        ellipsoid = details.ellipsoid_name.as_deref().unwrap_or(NULL_MARKER),
        accuracy = accuracy,
        bounds = bounds,
        identifier = identifier,
        proj = escape(proj_string),
    )
}

/// A declaration that made it into the output
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedEntry {
    pub identifier: String,
    pub proj_string: String,
    pub accuracy: Accuracy,
    pub text: String,
}

#[derive(Debug)]
pub enum SkipReason {
    /// The CRS couldn't be resolved or has no PROJ string
    Resolution(CrsError),
    /// An earlier entry already used this identifier
    Duplicate(String),
}

/// What happened to one catalog entry
#[derive(Debug)]
pub enum EntryOutcome {
    Emitted(EmittedEntry),
    /// Written with an unknown accuracy and the CRS's own PROJ string
    Degraded(EmittedEntry, TransformError),
    Skipped(SkipReason),
}

/// Turn a resolved entry and its operation to the reference, if there is one, into the
/// declaration that gets written.
fn settle(
    info: &CrsInfo,
    details: &CrsDetails,
    crs_proj_string: String,
    identifier: String,
    transformed: std::result::Result<(Accuracy, String), TransformError>,
) -> EntryOutcome {
    let (accuracy, proj_string, error) = match transformed {
        Ok((accuracy, proj_string)) => (accuracy, proj_string, None),
        Err(e) => (Accuracy::Unknown, crs_proj_string, Some(e)),
    };
    let entry = EmittedEntry {
        text: format_entry(info, details, accuracy, &proj_string, &identifier),
        identifier,
        proj_string,
        accuracy,
    };
    match error {
        None => EntryOutcome::Emitted(entry),
        Some(e) => EntryOutcome::Degraded(entry, e),
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GenerationSummary {
    pub emitted: usize,
    pub degraded: usize,
    pub duplicates: usize,
    pub unresolved: usize,
}

impl GenerationSummary {
    /// Number of declarations in the output, besides the header
    pub fn written(&self) -> usize {
        self.emitted + self.degraded
    }

    fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Emitted(_) => self.emitted += 1,
            EntryOutcome::Degraded(..) => self.degraded += 1,
            EntryOutcome::Skipped(SkipReason::Duplicate(_)) => self.duplicates += 1,
            EntryOutcome::Skipped(SkipReason::Resolution(_)) => self.unresolved += 1,
        }
    }
}

/// Builds the declaration table one catalog entry at a time.
///
/// The identifier set only grows, and only with entries that resolved, so the first
/// resolvable entry for an identifier wins.
pub struct CrsTableGenerator<'a> {
    db: &'a ProjDb,
    target: Crs<'a>,
    seen: HashSet<String>,
    entries: Vec<EmittedEntry>,
    summary: GenerationSummary,
}

impl<'a> CrsTableGenerator<'a> {
    /// A generator measuring accuracy against `target`, normally [`crate::srs::defaults::WGS84`]
    pub fn new(db: &'a ProjDb, target: AuthorityCode<'_>) -> Result<Self> {
        let target = db
            .crs_from_authority(target.auth_name, target.code)
            .map_err(Error::ReferenceCrs)?;
        Ok(CrsTableGenerator {
            db,
            target,
            seen: HashSet::new(),
            entries: Vec::new(),
            summary: GenerationSummary::default(),
        })
    }

    /// Resolve, deduplicate and format one catalog entry, keeping it if it is emitted.
    ///
    /// # Errors
    /// [`Error::SQLiteError`] when the registry can't be read. Problems with the entry
    /// itself are reported in the outcome.
    pub fn process(&mut self, info: &CrsInfo) -> Result<EntryOutcome> {
        let outcome = self.outcome(info)?;
        match &outcome {
            EntryOutcome::Emitted(entry) => self.entries.push(entry.clone()),
            EntryOutcome::Degraded(entry, e) => {
                tracing::warn!("Skipping transformation for CRS {}: {}", info.code, e);
                self.entries.push(entry.clone());
            }
            EntryOutcome::Skipped(SkipReason::Resolution(e)) => {
                tracing::warn!("Skipping CRS {}: {}", info.code, e);
            }
            EntryOutcome::Skipped(SkipReason::Duplicate(identifier)) => {
                tracing::debug!("Skipping duplicate {}", identifier);
            }
        }
        self.summary.record(&outcome);
        Ok(outcome)
    }

    fn outcome(&mut self, info: &CrsInfo) -> Result<EntryOutcome> {
        let db = self.db;
        if db
            .get_by_code::<CrsRecord>(&info.auth_name, &info.code)?
            .is_none()
        {
            return Ok(EntryOutcome::Skipped(SkipReason::Resolution(
                CrsError::NotFound {
                    auth_name: info.auth_name.clone(),
                    code: info.code.clone(),
                },
            )));
        }
        let resolved = db
            .crs_from_authority(&info.auth_name, &info.code)
            .and_then(|crs| {
                let proj_string = crs.to_proj4()?;
                Ok((crs, proj_string))
            });
        let (crs, crs_proj_string) = match resolved {
            Ok(r) => r,
            Err(e) => return Ok(EntryOutcome::Skipped(SkipReason::Resolution(e))),
        };

        let identifier = derive_identifier(&info.auth_name, &info.code);
        if !self.seen.insert(identifier.clone()) {
            return Ok(EntryOutcome::Skipped(SkipReason::Duplicate(identifier)));
        }

        let transformed = Transformer::from_crs(&crs, &self.target)
            .map(|t| (t.accuracy(), t.to_proj4().to_owned()));
        Ok(settle(
            info,
            &crs.details(),
            crs_proj_string,
            identifier,
            transformed,
        ))
    }

    pub fn summary(&self) -> GenerationSummary {
        self.summary
    }

    /// The header followed by every kept entry, in processing order
    pub fn render(&self) -> String {
        let mut out = String::from(HEADER);
        for entry in &self.entries {
            out.push_str(&entry.text);
        }
        out
    }

    /// Write [`CrsTableGenerator::render`] to `path`, replacing whatever is there
    pub fn write_output<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }

    /// Process the whole catalog and write the result to `output`.
    ///
    /// Nothing is written when the registry is missing a table or fails to answer a query.
    pub fn run<P: AsRef<Path>>(mut self, output: P) -> Result<GenerationSummary> {
        self.db.check_schema()?;
        for info in self.db.query_crs_info()? {
            self.process(&info)?;
        }
        self.write_output(&output)?;
        let summary = self.summary;
        tracing::info!(
            written = summary.written(),
            degraded = summary.degraded,
            duplicates = summary.duplicates,
            unresolved = summary.unresolved,
            "{} has been generated.",
            output.as_ref().display()
        );
        Ok(summary)
    }
}
