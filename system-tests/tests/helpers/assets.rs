// system-tests/tests/helpers/assets.rs
// ============================================================================
// Module: Test Assets
// Description: Paths of the files uploaded by attachment tests.
// Purpose: Resolve assets independently of the working directory.
// Dependencies: none
// ============================================================================

use std::path::PathBuf;

/// Image uploaded into image columns.
pub const LOGO_SVG: &str = "seatable-logo.svg";

/// Plain-text file uploaded into file columns.
pub const TEXT_FILE: &str = "test.txt";

/// Returns the path of an asset shipped with the crate.
pub fn asset_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets").join(name)
}
