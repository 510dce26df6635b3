/// Writer wrapper used by the PNML export
pub mod xml_utils;

#[cfg(test)]
pub mod test_utils {
    use std::path::PathBuf;

    /// Directory containing the logs used in tests
    pub fn get_test_data_path() -> PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data")
    }
}
