//! Error types for hexdot operations.

use std::io;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hexdot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error (file operations, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// PNG encoding error.
    #[error("PNG encoding error: {0}")]
    PngEncoding(#[from] png::EncodingError),

    /// Malformed base grid dataset.
    #[error("Dataset error: {0}")]
    Dataset(#[from] serde_json::Error),

    /// Malformed YAML configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] serde_yaml_ng::Error),

    /// Grid parameters that would produce NaN or infinite cell coordinates.
    #[error("Invalid grid parameters: {0}")]
    InvalidGrid(String),

    /// Geographic coordinate outside `[-90, 90] x [-180, 180]`, or a coordinate the
    /// projection cannot represent (the poles).
    #[error("Coordinate out of domain: lat={lat}, lng={lng}")]
    OutOfDomain {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lng: f64,
    },

    /// Projected coordinate that cannot be placed on a grid.
    #[error("Non-finite projected coordinate: x={x}, y={y}")]
    NonFiniteProjection {
        /// Easting.
        x: f64,
        /// Northing.
        y: f64,
    },

    /// Pin rejected because it lies outside the map region.
    #[error("Coordinate outside map region: lat={lat}, lng={lng}")]
    OutsideRegion {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lng: f64,
    },

    /// Invalid dimensions for a framebuffer or drawing surface.
    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Color parsing error.
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    /// Configuration value outside its valid range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Land mask GeoJSON that is structurally unusable.
    #[error("GeoJSON error: {0}")]
    GeoJson(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidDimensions {
            width: 0,
            height: 100,
        };
        assert!(err.to_string().contains("Invalid dimensions"));
    }

    #[test]
    fn test_out_of_domain_display() {
        let err = Error::OutOfDomain {
            lat: 91.0,
            lng: 20.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("91"));
        assert!(msg.contains("20"));
    }

    #[test]
    fn test_dataset_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Dataset(_)));
    }
}
