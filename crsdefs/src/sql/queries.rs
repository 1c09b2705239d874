/// One row per (crs, usage) pair. A CRS with several usages comes back once per usage,
/// so callers that want one entry per CRS must deduplicate. The area is named by the
/// extent description, as libproj's own catalog does.
pub const QUERY_CRS_INFO: &str = "SELECT
        CAST(c.auth_name AS TEXT),
        CAST(c.code AS TEXT),
        c.name,
        c.type,
        conv.method_name,
        e.description,
        e.west_lon,
        e.south_lat,
        e.east_lon,
        e.north_lat
    FROM crs_view c
    LEFT JOIN usage u
        ON u.object_table_name = c.table_name
        AND u.object_auth_name = c.auth_name
        AND u.object_code = c.code
    LEFT JOIN extent e
        ON e.auth_name = u.extent_auth_name
        AND e.code = u.extent_code
    LEFT JOIN projected_crs p
        ON c.table_name = 'projected_crs'
        AND p.auth_name = c.auth_name
        AND p.code = c.code
    LEFT JOIN conversion_table conv
        ON conv.auth_name = p.conversion_auth_name
        AND conv.code = p.conversion_code
    WHERE c.deprecated = 0
    ORDER BY c.table_name, c.auth_name, c.code, u.auth_name, u.code";

pub const QUERY_SCHEMA_OBJECTS: &str =
    "SELECT name FROM sqlite_master WHERE type IN ('table', 'view')";
