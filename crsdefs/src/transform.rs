//! The coordinate operation libproj picks between two CRSs, and the accuracy it is registered
//! with.
use crate::context::{string_from_proj, PjHandle};
use crate::crs::Crs;
use crate::result::TransformError;
use proj_sys::{
    proj_as_proj_string, proj_create_crs_to_crs_from_pj, proj_pj_info,
    PJ_PROJ_STRING_TYPE_PJ_PROJ_5,
};
use std::fmt;
use std::ptr;

/// Positional error of an operation, in metres
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Accuracy {
    Metres(f64),
    Unknown,
}

impl Accuracy {
    /// Normalise a raw accuracy, where `-1` (or anything else negative) means unknown
    pub fn from_raw(raw: f64) -> Accuracy {
        if raw.is_finite() && raw >= 0.0 {
            Accuracy::Metres(raw)
        } else {
            Accuracy::Unknown
        }
    }

    pub fn metres(&self) -> Option<f64> {
        match self {
            Accuracy::Metres(m) => Some(*m),
            Accuracy::Unknown => None,
        }
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accuracy::Metres(m) => write!(f, "{} m", m),
            Accuracy::Unknown => f.write_str("unknown"),
        }
    }
}

/// The operation from one CRS to another, in the source's own axis order
#[derive(Debug, Clone, PartialEq)]
pub struct Transformer {
    description: Option<String>,
    accuracy: Accuracy,
    proj_string: String,
}

impl Transformer {
    /// Let libproj choose the operation from `source` to `target`, both resolved from the
    /// same registry.
    ///
    /// # Errors
    /// [`TransformError::NoOperation`] when libproj finds none, and
    /// [`TransformError::ProjString`] when what it found has no single PROJ string, as
    /// happens when several operations apply to different areas.
    pub fn from_crs(source: &Crs<'_>, target: &Crs<'_>) -> Result<Transformer, TransformError> {
        let context = source.handle().context();
        context.clear_error();
        let ptr = unsafe {
            proj_create_crs_to_crs_from_pj(
                context.as_ptr(),
                source.handle().as_ptr(),
                target.handle().as_ptr(),
                ptr::null_mut(),
                ptr::null(),
            )
        };
        let operation = PjHandle::new(context, ptr).ok_or_else(|| TransformError::NoOperation {
            source_crs: source.to_string(),
            target_crs: target.to_string(),
            reason: context.last_error(),
        })?;

        let info = unsafe { proj_pj_info(operation.as_ptr()) };
        let description = string_from_proj(info.description);
        let accuracy = Accuracy::from_raw(info.accuracy);

        context.clear_error();
        let exported = unsafe {
            proj_as_proj_string(
                context.as_ptr(),
                operation.as_ptr(),
                PJ_PROJ_STRING_TYPE_PJ_PROJ_5,
                ptr::null(),
            )
        };
        let proj_string = string_from_proj(exported).ok_or_else(|| TransformError::ProjString {
            source_crs: source.to_string(),
            target_crs: target.to_string(),
            reason: context.last_error(),
        })?;
        tracing::trace!(
            "{} to {}: {}",
            source,
            target,
            description.as_deref().unwrap_or("unnamed operation")
        );
        Ok(Transformer {
            description,
            accuracy,
            proj_string,
        })
    }

    pub fn accuracy(&self) -> Accuracy {
        self.accuracy
    }

    /// Name of the operation, e.g. `Inverse of UTM zone 31N`
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// The operation as a PROJ string, usually a `+proj=pipeline`
    pub fn to_proj4(&self) -> &str {
        &self.proj_string
    }
}
