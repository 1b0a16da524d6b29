use serde::de::DeserializeOwned;
use std::fs;

use crate::error::{Error, Result};

/// Parses a JSON file into a given type `T`.
///
/// Errors are converted into `crate::error::Error` variants:
/// - `Error::IoError` if the file cannot be read.
/// - `Error::DeserializationError` if the JSON is malformed or does not match `T`.
pub fn parse_json_file<T: DeserializeOwned>(file_path: &str) -> Result<T> {
    let data = fs::read_to_string(file_path).map_err(Error::IoError)?;
    log::debug!("Read {} bytes from '{}'.", data.len(), file_path);

    let parsed_data: T = serde_json::from_str(&data).map_err(Error::DeserializationError)?;

    Ok(parsed_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::pipeline_dto::PipelineDto;

    #[test]
    fn test_missing_file_is_an_io_error() {
        let result = parse_json_file::<PipelineDto>("does/not/exist.json");

        assert!(matches!(result, Err(Error::IoError(_))));
    }
}
