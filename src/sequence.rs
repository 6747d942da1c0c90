//! Monotonic tokens used to drop responses that were overtaken by a newer request.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: u64,
}

impl RequestSequence {
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    /// Makes every token issued so far stale.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_last_token_is_latest() {
        let mut sequence = RequestSequence::default();
        let first = sequence.issue();
        let second = sequence.issue();

        assert!(!sequence.is_latest(first));
        assert!(sequence.is_latest(second));
    }

    #[test]
    fn invalidate_stales_outstanding_tokens() {
        let mut sequence = RequestSequence::default();
        let token = sequence.issue();
        sequence.invalidate();

        assert!(!sequence.is_latest(token));

        let fresh = sequence.issue();
        assert!(sequence.is_latest(fresh));
    }
}
