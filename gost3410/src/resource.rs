//! Key usage accounting: counter plus validity interval.

use crate::{Error, Result};
use time::{Duration, OffsetDateTime};

/// Default number of signatures a fresh key may produce.
const DEFAULT_SIGNATURE_COUNT: i64 = 65536;

/// What the counter of a [`Resource`] counts.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ResourceKind {
    /// Cipher resource: processed block count.
    BlockCounter,
    /// Key-use resource: remaining operations.
    KeyUsingCounter,
}

impl ResourceKind {
    /// Stable integer identifier used in serialized containers.
    pub const fn code(self) -> u32 {
        match self {
            ResourceKind::BlockCounter => 1,
            ResourceKind::KeyUsingCounter => 2,
        }
    }

    /// Reverse of [`ResourceKind::code`].
    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(ResourceKind::BlockCounter),
            2 => Ok(ResourceKind::KeyUsingCounter),
            _ => Err(Error::OidEngine),
        }
    }
}

/// Usage resource of a secret key: a signed counter and the validity
/// window within which the key may operate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Resource {
    /// Counter semantics.
    pub kind: ResourceKind,
    /// Remaining operations (or blocks).
    pub counter: i64,
    /// Start of the validity interval (UTC).
    pub not_before: OffsetDateTime,
    /// End of the validity interval (UTC).
    pub not_after: OffsetDateTime,
}

impl Resource {
    /// Default resource of a signature key: an operations counter valid
    /// for one year from `now`.
    pub fn signatures_from(now: OffsetDateTime) -> Self {
        Resource {
            kind: ResourceKind::KeyUsingCounter,
            counter: DEFAULT_SIGNATURE_COUNT,
            not_before: now,
            not_after: now + Duration::days(365),
        }
    }

    /// Check the key may operate at `now` and consume one use.
    pub fn spend(&mut self, now: OffsetDateTime) -> Result<()> {
        if now < self.not_before || now > self.not_after {
            return Err(Error::KeyValidity);
        }
        if self.counter <= 0 {
            return Err(Error::LowKeyResource);
        }
        self.counter -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn spend_decrements_until_exhausted() {
        let now = datetime!(2026-01-01 12:00:00 UTC);
        let mut resource = Resource {
            kind: ResourceKind::KeyUsingCounter,
            counter: 2,
            not_before: now,
            not_after: now + Duration::days(1),
        };
        assert!(resource.spend(now).is_ok());
        assert!(resource.spend(now).is_ok());
        assert_eq!(resource.spend(now), Err(Error::LowKeyResource));
    }

    #[test]
    fn window_is_enforced() {
        let now = datetime!(2026-01-01 12:00:00 UTC);
        let mut resource = Resource::signatures_from(now);
        assert_eq!(
            resource.spend(now - Duration::hours(1)),
            Err(Error::KeyValidity)
        );
        assert_eq!(
            resource.spend(now + Duration::days(400)),
            Err(Error::KeyValidity)
        );
        assert!(resource.spend(now + Duration::days(30)).is_ok());
    }
}
