use chrono::{DateTime, Duration, Utc};
use rand::Rng;

/// How long an issued passcode stays valid.
pub const CHALLENGE_TTL_SECS: i64 = 5 * 60;

/// A short-lived one-time passcode bound to a single order.
///
/// At most one challenge is live per order id: issuing a new one overwrites any
/// prior unconsumed challenge. Challenges live only in the ephemeral cache and
/// are lost on restart. Equality over all fields is what lets the cache delete
/// a challenge atomically "only if it is still the one I validated".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub order_id: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl Challenge {
    /// Issues a fresh challenge for `order_id`, valid for [`CHALLENGE_TTL_SECS`]
    /// from `now`.
    ///
    /// The code is drawn uniformly from `100000..=999999`, so it is always six
    /// decimal digits without padding.
    pub fn issue(order_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        let code = rand::thread_rng().gen_range(100_000..=999_999u32);
        Self {
            order_id: order_id.into(),
            code: code.to_string(),
            expires_at: now + Duration::seconds(CHALLENGE_TTL_SECS),
        }
    }

    /// Expiry is strict: a challenge is still valid at exactly `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn matches(&self, submitted: &str) -> bool {
        self.code == submitted
    }

    /// Display form revealing only the last two digits.
    pub fn masked(&self) -> String {
        let tail = self.code.len().saturating_sub(2);
        format!("****{}", &self.code[tail..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_issue_generates_six_digit_code() {
        for _ in 0..100 {
            let challenge = Challenge::issue("order-1", fixed_now());
            assert_eq!(challenge.code.len(), 6);
            let numeric: u32 = challenge.code.parse().unwrap();
            assert!((100_000..=999_999).contains(&numeric));
        }
    }

    #[test]
    fn test_expiry_is_strictly_after_ttl() {
        let now = fixed_now();
        let challenge = Challenge::issue("order-1", now);

        let just_before = challenge.expires_at - Duration::milliseconds(1);
        let just_after = challenge.expires_at + Duration::milliseconds(1);

        assert!(!challenge.is_expired(just_before));
        assert!(!challenge.is_expired(challenge.expires_at));
        assert!(challenge.is_expired(just_after));
        assert_eq!(
            challenge.expires_at - now,
            Duration::seconds(CHALLENGE_TTL_SECS)
        );
    }

    #[test]
    fn test_masked_reveals_last_two_digits() {
        let challenge = Challenge {
            order_id: "order-1".to_string(),
            code: "123456".to_string(),
            expires_at: fixed_now(),
        };
        assert_eq!(challenge.masked(), "****56");
        assert!(challenge.matches("123456"));
        assert!(!challenge.matches("123455"));
    }
}
