//! Direct HDF5 calls that the NetCDF API does not expose.

use std::ffi::CString;
use std::path::Path;
use std::sync::Once;

use hdf5_metno_sys::h5::herr_t;
use hdf5_metno_sys::h5a::{H5Adelete, H5Aexists};
use hdf5_metno_sys::h5e::{H5Eset_auto2, H5E_DEFAULT};
use hdf5_metno_sys::h5f::{H5Fclose, H5Fopen, H5F_ACC_RDWR};
use hdf5_metno_sys::h5p::H5P_DEFAULT;
use tracing::{debug, info};

use crate::error::{WriteError, WriteResult};

/// Root attribute added by netCDF-C 4.4.1+ that AWIPS' Java NetCDF cannot read.
pub const NC_PROPERTIES: &str = "_NCProperties";

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics even for conditions the caller
/// handles itself, such as probing an attribute that does not exist. Safe to
/// call any number of times; only the first call does anything.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 with a null handler disables printing, which
        // is a documented use.
        unsafe {
            H5Eset_auto2(H5E_DEFAULT, None, std::ptr::null_mut());
        }
    });
}

/// Remove the `_NCProperties` root attribute from a closed NetCDF4 file.
///
/// Returns whether the attribute was present.
pub fn strip_nc_properties(path: &Path) -> WriteResult<bool> {
    silence_hdf5_errors();

    let c_path = path
        .to_str()
        .and_then(|p| CString::new(p).ok())
        .ok_or_else(|| WriteError::Hdf5(format!("unsupported path: {}", path.display())))?;
    let c_name = CString::new(NC_PROPERTIES)
        .map_err(|e| WriteError::Hdf5(format!("invalid attribute name: {}", e)))?;

    // SAFETY: both strings are NUL-terminated and outlive the calls; the
    // file handle is closed on every path below.
    unsafe {
        let file = H5Fopen(c_path.as_ptr(), H5F_ACC_RDWR, H5P_DEFAULT);
        if file < 0 {
            return Err(WriteError::Hdf5(format!(
                "failed to open {} for update",
                path.display()
            )));
        }

        let exists = H5Aexists(file, c_name.as_ptr());
        let result = if exists < 0 {
            Err(WriteError::Hdf5(format!(
                "failed to query {} in {}",
                NC_PROPERTIES,
                path.display()
            )))
        } else if exists == 0 {
            debug!(path = %path.display(), "No _NCProperties attribute to remove");
            Ok(false)
        } else if H5Adelete(file, c_name.as_ptr()) < 0 {
            Err(WriteError::Hdf5(format!(
                "failed to delete {} from {}",
                NC_PROPERTIES,
                path.display()
            )))
        } else {
            info!(path = %path.display(), "Modified SCMI NetCDF file to work with AWIPS");
            Ok(true)
        };

        let closed: herr_t = H5Fclose(file);
        if closed < 0 && result.is_ok() {
            return Err(WriteError::Hdf5(format!("failed to close {}", path.display())));
        }
        result
    }
}
