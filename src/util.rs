use std::time::Duration;

use serde::de::{Error, Unexpected};
use serde::Deserialize;
use serde::Deserializer;

/// Deserializes a whole number of seconds into a `Duration`.
///
/// For example,
/// ```text
/// TOML retry_interval = 30 ---> Duration::from_secs(30)
/// ```
pub(super) fn seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

/// Same as [`seconds`], but rejects zero. Used for timeouts, where zero would
/// make every request fail immediately.
pub(super) fn nonzero_seconds<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = u64::deserialize(deserializer)?;

    if secs == 0 {
        return Err(D::Error::invalid_value(
            Unexpected::Unsigned(0),
            &"a non-zero number of seconds",
        ));
    }

    Ok(Duration::from_secs(secs))
}
