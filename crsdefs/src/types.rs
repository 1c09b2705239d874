use std::fmt;

/// The kind of a CRS, as the registry's `crs_view` reports it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrsType {
    Geographic2D,
    Geographic3D,
    Geocentric,
    Projected,
    Vertical,
    Compound,
    Engineering,
    Other,
}

impl CrsType {
    /// Maps the `type` column of `crs_view`. Anything unrecognised is `Other`.
    pub fn from_registry(s: &str) -> CrsType {
        match s {
            "geographic 2D" => CrsType::Geographic2D,
            "geographic 3D" => CrsType::Geographic3D,
            "geocentric" => CrsType::Geocentric,
            "projected" => CrsType::Projected,
            "vertical" => CrsType::Vertical,
            "compound" => CrsType::Compound,
            "engineering" => CrsType::Engineering,
            _ => CrsType::Other,
        }
    }

    /// The tag written in the generated documentation, e.g. `PROJECTED_CRS`
    pub fn name(&self) -> &'static str {
        match self {
            CrsType::Geographic2D => "GEOGRAPHIC_2D_CRS",
            CrsType::Geographic3D => "GEOGRAPHIC_3D_CRS",
            CrsType::Geocentric => "GEOCENTRIC_CRS",
            CrsType::Projected => "PROJECTED_CRS",
            CrsType::Vertical => "VERTICAL_CRS",
            CrsType::Compound => "COMPOUND_CRS",
            CrsType::Engineering => "ENGINEERING_CRS",
            CrsType::Other => "OTHER_CRS",
        }
    }
}

impl fmt::Display for CrsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where a CRS is meant to be used, in degrees
#[derive(Debug, Clone, PartialEq)]
pub struct AreaOfUse {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
    pub name: String,
}

/// A single catalog entry, read straight from the registry and never modified
#[derive(Debug, Clone, PartialEq)]
pub struct CrsInfo {
    pub auth_name: String,
    pub code: String,
    pub name: Option<String>,
    pub kind: CrsType,
    pub projection_method_name: Option<String>,
    pub area_of_use: Option<AreaOfUse>,
}

impl CrsInfo {
    pub(crate) fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let kind: String = row.get(3)?;
        let area_name: Option<String> = row.get(5)?;
        let bounds: (Option<f64>, Option<f64>, Option<f64>, Option<f64>) =
            (row.get(6)?, row.get(7)?, row.get(8)?, row.get(9)?);
        // an extent with any missing bound isn't usable as a bounding box
        let area_of_use = match (area_name, bounds) {
            (Some(name), (Some(west), Some(south), Some(east), Some(north))) => Some(AreaOfUse {
                west,
                south,
                east,
                north,
                name,
            }),
            _ => None,
        };
        Ok(CrsInfo {
            auth_name: row.get(0)?,
            code: row.get(1)?,
            name: row.get::<_, Option<String>>(2)?.filter(|n| !n.is_empty()),
            kind: CrsType::from_registry(&kind),
            projection_method_name: row.get(4)?,
            area_of_use,
        })
    }
}
