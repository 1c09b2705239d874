//! Resolution of a catalog entry into a CRS object built by libproj from the same registry.
use crate::context::{string_from_proj, PjHandle, ProjContext};
use crate::result::CrsError;
use crate::ProjDb;
use proj_sys::{
    proj_as_proj_string, proj_create_from_database, proj_crs_get_coordinate_system,
    proj_crs_get_sub_crs, proj_cs_get_axis_info, proj_get_ellipsoid, proj_get_name, proj_get_type,
    PJ_CATEGORY_PJ_CATEGORY_CRS, PJ_PROJ_STRING_TYPE_PJ_PROJ_4, PJ_TYPE_PJ_TYPE_COMPOUND_CRS,
};
use std::ffi::CString;
use std::fmt;
use std::os::raw::c_char;
use std::ptr;

/// A coordinate reference system, as libproj builds it from one registry entry
pub struct Crs<'a> {
    handle: PjHandle<'a>,
    auth_name: String,
    code: String,
}

/// The parts of a CRS the generated documentation mentions
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrsDetails {
    pub unit_name: Option<String>,
    pub ellipsoid_name: Option<String>,
}

impl ProjContext {
    /// Build the CRS the registry holds under `auth_name:code`.
    ///
    /// # Errors
    /// [`CrsError::Unresolvable`] with libproj's reason when the entry isn't a valid,
    /// constructible CRS.
    pub fn crs_from_database(&self, auth_name: &str, code: &str) -> Result<Crs<'_>, CrsError> {
        let unresolvable = |reason: String| CrsError::Unresolvable {
            auth_name: auth_name.to_owned(),
            code: code.to_owned(),
            reason,
        };
        let (c_auth_name, c_code) = match (CString::new(auth_name), CString::new(code)) {
            (Ok(a), Ok(c)) => (a, c),
            _ => return Err(unresolvable("contains a nul byte".to_owned())),
        };
        self.clear_error();
        let ptr = unsafe {
            proj_create_from_database(
                self.as_ptr(),
                c_auth_name.as_ptr(),
                c_code.as_ptr(),
                PJ_CATEGORY_PJ_CATEGORY_CRS,
                0,
                ptr::null(),
            )
        };
        let handle = PjHandle::new(self, ptr).ok_or_else(|| unresolvable(self.last_error()))?;
        Ok(Crs {
            handle,
            auth_name: auth_name.to_owned(),
            code: code.to_owned(),
        })
    }
}

impl ProjDb {
    /// Resolve a catalog entry, see [`ProjContext::crs_from_database`]
    pub fn crs_from_authority(&self, auth_name: &str, code: &str) -> Result<Crs<'_>, CrsError> {
        self.proj.crs_from_database(auth_name, code)
    }
}

impl<'a> Crs<'a> {
    pub fn auth_name(&self) -> &str {
        &self.auth_name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> Option<String> {
        string_from_proj(unsafe { proj_get_name(self.handle.as_ptr()) })
    }

    pub(crate) fn handle(&self) -> &PjHandle<'a> {
        &self.handle
    }

    /// The PROJ.4 string of this CRS, `+type=crs` included.
    ///
    /// # Errors
    /// [`CrsError::ProjString`] for CRSs PROJ strings can't express, such as engineering ones.
    pub fn to_proj4(&self) -> Result<String, CrsError> {
        let context = self.handle.context();
        context.clear_error();
        let exported = unsafe {
            proj_as_proj_string(
                context.as_ptr(),
                self.handle.as_ptr(),
                PJ_PROJ_STRING_TYPE_PJ_PROJ_4,
                ptr::null(),
            )
        };
        string_from_proj(exported).ok_or_else(|| CrsError::ProjString {
            auth_name: self.auth_name.clone(),
            code: self.code.clone(),
            reason: context.last_error(),
        })
    }

    fn is_compound(&self) -> bool {
        unsafe { proj_get_type(self.handle.as_ptr()) == PJ_TYPE_PJ_TYPE_COMPOUND_CRS }
    }

    /// Unit of the first axis. A compound CRS answers for its horizontal part.
    pub fn first_axis_unit_name(&self) -> Option<String> {
        let horizontal;
        let single = if self.is_compound() {
            horizontal = self
                .handle
                .related(|ctx, crs| unsafe { proj_crs_get_sub_crs(ctx, crs, 0) })?;
            &horizontal
        } else {
            &self.handle
        };
        let cs = single.related(|ctx, crs| unsafe { proj_crs_get_coordinate_system(ctx, crs) })?;
        let mut unit_name: *const c_char = ptr::null();
        let found = unsafe {
            proj_cs_get_axis_info(
                cs.context().as_ptr(),
                cs.as_ptr(),
                0,
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
                ptr::null_mut(),
                &mut unit_name,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        };
        if found == 0 {
            return None;
        }
        string_from_proj(unit_name).filter(|name| !name.is_empty())
    }

    /// Name of the ellipsoid, for CRSs that have a geodetic part
    pub fn ellipsoid_name(&self) -> Option<String> {
        let ellipsoid = self
            .handle
            .related(|ctx, crs| unsafe { proj_get_ellipsoid(ctx, crs) })?;
        string_from_proj(unsafe { proj_get_name(ellipsoid.as_ptr()) })
    }

    pub fn details(&self) -> CrsDetails {
        CrsDetails {
            unit_name: self.first_axis_unit_name(),
            ellipsoid_name: self.ellipsoid_name(),
        }
    }
}

impl fmt::Display for Crs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.auth_name, self.code)
    }
}

impl fmt::Debug for Crs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crs")
            .field("auth_name", &self.auth_name)
            .field("code", &self.code)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::fixtures;

    use super::*;

    #[test]
    fn geographic() {
        let db = fixtures::registry();
        let crs = db.crs_from_authority("EPSG", "4326").unwrap();
        assert_eq!(crs.to_string(), "EPSG:4326");
        assert_eq!(crs.name().as_deref(), Some("WGS 84"));
        assert_eq!(
            crs.to_proj4().unwrap(),
            "+proj=longlat +datum=WGS84 +no_defs +type=crs"
        );
        assert_eq!(
            crs.details(),
            CrsDetails {
                unit_name: Some("degree".to_owned()),
                ellipsoid_name: Some("WGS 84".to_owned()),
            }
        );
    }

    #[test]
    fn degree_is_not_the_supplier_defined_unit_name() {
        // EPSG:9122, stored as "degree (supplier to define representation)"
        let db = fixtures::registry();
        let ed50 = db.crs_from_authority("EPSG", "4230").unwrap();
        assert_eq!(ed50.first_axis_unit_name().as_deref(), Some("degree"));
        assert_eq!(ed50.ellipsoid_name().as_deref(), Some("International 1924"));
    }

    #[test]
    fn projected() {
        let db = fixtures::registry();
        let utm = db.crs_from_authority("EPSG", "32631").unwrap();
        assert_eq!(
            utm.to_proj4().unwrap(),
            "+proj=utm +zone=31 +datum=WGS84 +units=m +no_defs +type=crs"
        );
        assert_eq!(utm.first_axis_unit_name().as_deref(), Some("metre"));
        assert_eq!(utm.ellipsoid_name().as_deref(), Some("WGS 84"));
    }

    #[test]
    fn any_method_libproj_knows_is_exported() {
        // Lambert Cylindrical Equal Area (Spherical)
        let db = fixtures::registry();
        let ease = db.crs_from_authority("EPSG", "6933").unwrap();
        assert!(ease.to_proj4().unwrap().starts_with("+proj=cea "));
    }

    #[test]
    fn vertical_has_no_ellipsoid() {
        let db = fixtures::registry();
        let egm96 = db.crs_from_authority("EPSG", "5773").unwrap();
        assert_eq!(egm96.ellipsoid_name(), None);
        assert_eq!(egm96.first_axis_unit_name().as_deref(), Some("metre"));
    }

    #[test]
    fn compound_answers_for_its_horizontal_part() {
        // WGS 84 + EGM96 height
        let db = fixtures::registry();
        let compound = db.crs_from_authority("EPSG", "9707").unwrap();
        assert_eq!(compound.first_axis_unit_name().as_deref(), Some("degree"));
        assert_eq!(compound.ellipsoid_name().as_deref(), Some("WGS 84"));
    }

    #[test]
    fn unknown_code_is_unresolvable() {
        let db = fixtures::registry();
        match db.crs_from_authority("EPSG", "1") {
            Err(CrsError::Unresolvable {
                auth_name, code, ..
            }) => assert_eq!((auth_name.as_str(), code.as_str()), ("EPSG", "1")),
            other => panic!("expected an unresolvable CRS, got {:?}", other),
        }
        assert!(matches!(
            db.crs_from_authority("EPSG", "43\u{0}26"),
            Err(CrsError::Unresolvable { .. })
        ));
    }
}
