// Tables and views of proj.db the catalog query and libproj read to resolve a CRS and find
// its operations to another one. A registry missing any of them can't be trusted.
pub const REQUIRED_TABLES: &[&str] = &[
    "metadata",
    "crs_view",
    "usage",
    "extent",
    "unit_of_measure",
    "ellipsoid",
    "prime_meridian",
    "geodetic_datum",
    "vertical_datum",
    "coordinate_system",
    "axis",
    "geodetic_crs",
    "projected_crs",
    "vertical_crs",
    "compound_crs",
    "conversion_table",
    "helmert_transformation_table",
    "grid_transformation",
    "other_transformation",
    "concatenated_operation",
];
