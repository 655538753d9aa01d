//! Installed-Package Queries
//!
//! The classifier's removal false-positive guard needs to know whether a
//! package name extracted from interleaved output is actually installed.
//! The trait keeps that lookup mockable; the real implementation shells
//! out to `xbps-query`.

use std::process::Command;

/// Lookup seam for installed-package checks
pub trait PackageQuery: Send + Sync {
    /// Whether `package` is currently installed
    fn is_installed(&self, package: &str) -> bool;
}

/// Queries the local package database through `xbps-query`
#[derive(Debug, Default, Clone)]
pub struct XbpsQuery;

impl XbpsQuery {
    pub fn new() -> Self {
        Self
    }
}

impl PackageQuery for XbpsQuery {
    fn is_installed(&self, package: &str) -> bool {
        Command::new("xbps-query")
            .args(["-p", "pkgver", package])
            .output()
            .map(|output| output.status.success() && !output.stdout.is_empty())
            .unwrap_or(false)
    }
}
