use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// Prefix of every confirmation identifier.
pub const CONFIRMATION_PREFIX: &str = "BK";

const SUFFIX_MODULUS: u64 = 1_000_000;

/// Issues confirmation identifiers of the form `BK` + six digits, the digits
/// being the low six digits of the issue time in milliseconds.
///
/// Identifiers are unique per issuer for about 16 minutes of wall clock; two
/// requests in the same millisecond get consecutive suffixes. They are not
/// globally unique.
#[derive(Debug, Default)]
pub struct ConfirmationIssuer {
    last_millis: AtomicU64,
}

impl ConfirmationIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, now: DateTime<Utc>) -> String {
        let now_millis = now.timestamp_millis().max(0) as u64;
        let mut last = self.last_millis.load(Ordering::SeqCst);
        let millis = loop {
            let next = now_millis.max(last + 1);
            match self
                .last_millis
                .compare_exchange(last, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => break next,
                Err(current) => last = current,
            }
        };

        format!("{}{:06}", CONFIRMATION_PREFIX, millis % SUFFIX_MODULUS)
    }
}
