use crate::types::{AzAccessToken, K8sExecCredentials};
use chrono::{FixedOffset, NaiveDateTime, TimeZone, Utc};

const AZ_EXPIRES_ON_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const AZ_EXPIRES_ON_MAX_FRACTION_DIGITS: usize = 6;
const EXPIRATION_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, thiserror::Error)]
#[error("invalid expiresOn {value:?}, expected `YYYY-MM-DD HH:MM:SS.ffffff`: {reason}")]
pub struct TimestampFormatError {
    pub value: String,
    pub reason: String,
}

impl TimestampFormatError {
    fn new(value: &str, reason: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

fn parse_expires_on(value: &str) -> Result<NaiveDateTime, TimestampFormatError> {
    let (whole, fraction) = value
        .rsplit_once('.')
        .ok_or_else(|| TimestampFormatError::new(value, "missing fractional seconds"))?;

    if fraction.is_empty()
        || fraction.len() > AZ_EXPIRES_ON_MAX_FRACTION_DIGITS
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(TimestampFormatError::new(
            value,
            format!("fractional seconds must be 1 to {AZ_EXPIRES_ON_MAX_FRACTION_DIGITS} digits"),
        ));
    }

    // The fraction is validated but dropped: the output has second precision.
    NaiveDateTime::parse_from_str(whole, AZ_EXPIRES_ON_FORMAT)
        .map_err(|err| TimestampFormatError::new(value, err.to_string()))
}

/// Interprets `expires_on` as local time at `local_offset` and renders it in UTC.
///
/// An empty value means the expiry is unknown and yields an empty string.
pub fn convert_expiration(
    expires_on: &str,
    local_offset: FixedOffset,
) -> Result<String, TimestampFormatError> {
    if expires_on.is_empty() {
        return Ok(String::new());
    }

    let naive = parse_expires_on(expires_on)?;
    let local = local_offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| TimestampFormatError::new(expires_on, "out of range"))?;

    Ok(local
        .with_timezone(&Utc)
        .format(EXPIRATION_TIMESTAMP_FORMAT)
        .to_string())
}

pub fn convert_to_exec_credentials(
    token: &AzAccessToken,
    local_offset: FixedOffset,
) -> Result<K8sExecCredentials, TimestampFormatError> {
    let access_token = token.access_token.clone().unwrap_or_default();
    if access_token.is_empty() {
        log::warn!("az returned an empty access token, passing it through");
    }

    let expiration_timestamp =
        convert_expiration(token.expires_on.as_deref().unwrap_or_default(), local_offset)?;

    Ok(K8sExecCredentials::new(access_token, expiration_timestamp))
}
