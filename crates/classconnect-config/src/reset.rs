use std::env;
use std::time::Duration;

const DEFAULT_VALIDITY_MINUTES: u64 = 15;

/// Longest accepted reset token validity, one week.
pub const MAX_VALIDITY_MINUTES: u64 = 7 * 24 * 60;

/// Validity of a password reset token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResetTokenConfig {
    pub validity: Duration,
}

impl Default for ResetTokenConfig {
    fn default() -> Self {
        Self {
            validity: Duration::from_secs(15 * 60),
        }
    }
}

impl ResetTokenConfig {
    /// `RESET_TOKEN_EXP_DURATION` is a number of minutes (default 15).
    pub fn from_env() -> Self {
        Self::from_minutes(env::var("RESET_TOKEN_EXP_DURATION").ok().as_deref())
    }

    /// Zero, unparsable and out-of-range values fall back to 15 minutes.
    pub fn from_minutes(raw: Option<&str>) -> Self {
        let minutes = raw
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|m| (1..=MAX_VALIDITY_MINUTES).contains(m))
            .unwrap_or(DEFAULT_VALIDITY_MINUTES);

        Self {
            validity: Duration::from_secs(minutes * 60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_parsed() {
        assert_eq!(
            ResetTokenConfig::from_minutes(Some("30")).validity,
            Duration::from_secs(30 * 60)
        );
    }

    #[test]
    fn test_bad_minutes_use_default() {
        let default = ResetTokenConfig::default();
        assert_eq!(ResetTokenConfig::from_minutes(None), default);
        assert_eq!(ResetTokenConfig::from_minutes(Some("0")), default);
        assert_eq!(ResetTokenConfig::from_minutes(Some("soon")), default);
        assert_eq!(
            ResetTokenConfig::from_minutes(Some("18446744073709551615")),
            default
        );
    }
}
