#![allow(clippy::missing_errors_doc)]

use base64::{engine::general_purpose::STANDARD_NO_PAD, Engine as _};
use mapwright_world::{MapError, MapHeader, StaticMap};

const TRANSFER_DOMAIN: &str = "map";
const TRANSFER_VERSION: &str = "v1";

/// Identifier prefix emitted before the encoded map payload.
pub(crate) const TRANSFER_HEADER: &str = "map:v1";
/// Delimiter used to separate the prefix, grid dimensions and payload.
const FIELD_DELIMITER: char = ':';

/// Encodes terrain into a single-line string suitable for clipboard transfer.
pub(crate) fn encode(map: &StaticMap) -> Result<String, MapTransferError> {
    let json = serde_json::to_vec(&map.to_header()).map_err(MapTransferError::Serialize)?;
    let encoded = STANDARD_NO_PAD.encode(json);
    let dimension = map.dimension();
    Ok(format!(
        "{TRANSFER_HEADER}:{}x{}:{encoded}",
        dimension.width(),
        dimension.height()
    ))
}

/// Decodes and validates terrain from its transfer string.
pub(crate) fn decode(value: &str) -> Result<StaticMap, MapTransferError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(MapTransferError::EmptyPayload);
    }

    let mut parts = trimmed.split(FIELD_DELIMITER);
    let domain = parts.next().ok_or(MapTransferError::MissingPrefix)?;
    let version = parts.next().ok_or(MapTransferError::MissingVersion)?;
    let dimensions = parts.next().ok_or(MapTransferError::MissingDimensions)?;
    let payload = parts.next().ok_or(MapTransferError::MissingPayload)?;

    if domain != TRANSFER_DOMAIN {
        return Err(MapTransferError::InvalidPrefix(domain.to_owned()));
    }
    if version != TRANSFER_VERSION {
        return Err(MapTransferError::UnsupportedVersion(version.to_owned()));
    }

    let declared = parse_dimensions(dimensions)?;
    let bytes = STANDARD_NO_PAD
        .decode(payload.as_bytes())
        .map_err(MapTransferError::InvalidEncoding)?;
    let header: MapHeader =
        serde_json::from_slice(&bytes).map_err(MapTransferError::InvalidPayload)?;
    let map = StaticMap::from_header(header)?;

    let actual = (map.dimension().width(), map.dimension().height());
    if actual != declared {
        return Err(MapTransferError::DimensionMismatch { declared, actual });
    }
    Ok(map)
}

/// Errors that can occur while encoding or decoding map transfer strings.
#[derive(Debug, thiserror::Error)]
pub(crate) enum MapTransferError {
    /// The provided string was empty or contained only whitespace.
    #[error("map string was empty")]
    EmptyPayload,
    /// The prefix segment was missing.
    #[error("map string is missing the prefix")]
    MissingPrefix,
    /// The version segment was missing.
    #[error("map string is missing the version")]
    MissingVersion,
    /// The grid dimensions were missing.
    #[error("map string is missing the grid dimensions")]
    MissingDimensions,
    /// The payload segment was missing.
    #[error("map string is missing the payload")]
    MissingPayload,
    /// The string used an unexpected prefix segment.
    #[error("map prefix '{0}' is not supported")]
    InvalidPrefix(String),
    /// The string used an unsupported version identifier.
    #[error("map version '{0}' is not supported")]
    UnsupportedVersion(String),
    /// The grid dimensions could not be parsed.
    #[error("could not parse grid dimensions '{0}'")]
    InvalidDimensions(String),
    /// The declared dimensions disagree with the payload.
    #[error("map string declares {declared:?} but the payload is {actual:?}")]
    DimensionMismatch {
        /// Width and height from the string prefix.
        declared: (u32, u32),
        /// Width and height of the decoded map.
        actual: (u32, u32),
    },
    /// The base64 payload could not be decoded.
    #[error("could not decode map payload: {0}")]
    InvalidEncoding(#[source] base64::DecodeError),
    /// The decoded payload could not be deserialised.
    #[error("could not parse map payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),
    /// The map could not be serialised.
    #[error("could not serialise map: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The decoded map failed validation.
    #[error("decoded map is invalid: {0}")]
    InvalidMap(#[from] MapError),
}

fn parse_dimensions(dimensions: &str) -> Result<(u32, u32), MapTransferError> {
    let (width, height) = dimensions
        .split_once(['x', 'X'])
        .ok_or_else(|| MapTransferError::InvalidDimensions(dimensions.to_owned()))?;

    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|_| MapTransferError::InvalidDimensions(dimensions.to_owned()))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|_| MapTransferError::InvalidDimensions(dimensions.to_owned()))?;

    if width == 0 || height == 0 {
        return Err(MapTransferError::InvalidDimensions(dimensions.to_owned()));
    }

    Ok((width, height))
}
