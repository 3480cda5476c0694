//!
//! This module probes the optional X extensions once at startup. A missing extension degrades the dependent operations, it never fails initialization.

use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::composite::ConnectionExt as _;
use x11rb::protocol::xinerama::ConnectionExt as _;
use x11rb::protocol::xtest::ConnectionExt as _;

/// The capability-probe result, computed once and queried thereafter.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Extensions {
    /// Composite at version 0.2 or newer (needed to name window pixmaps).
    pub composite: bool,
    /// XTest input synthesis.
    pub xtest: bool,
    /// Xinerama multi-monitor layout queries.
    pub xinerama: bool,
}

impl Extensions {
    #[must_use]
    pub fn probe<C: Connection>(conn: &C) -> Self {
        let composite = match conn
            .composite_query_version(0, 2)
            .map_err(ReplyError::from)
            .and_then(|cookie| cookie.reply())
        {
            Ok(version) if version.major_version > 0 || version.minor_version >= 2 => true,
            Ok(version) => {
                log::warn!(
                    "XComposite extension too old ({}.{})",
                    version.major_version,
                    version.minor_version
                );
                false
            }
            Err(e) => {
                log::warn!("XComposite extension not available: {e}");
                false
            }
        };

        let xtest = match conn
            .xtest_get_version(2, 2)
            .map_err(ReplyError::from)
            .and_then(|cookie| cookie.reply())
        {
            Ok(_) => true,
            Err(e) => {
                log::warn!("XTest extension not available: {e}");
                false
            }
        };

        let xinerama = match conn
            .xinerama_query_version(1, 1)
            .map_err(ReplyError::from)
            .and_then(|cookie| cookie.reply())
        {
            Ok(_) => true,
            Err(e) => {
                log::warn!("Xinerama extension not supported: {e}");
                false
            }
        };

        log::debug!("extensions: composite {composite} xtest {xtest} xinerama {xinerama}");
        Self {
            composite,
            xtest,
            xinerama,
        }
    }
}
