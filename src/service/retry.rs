use std::time::Duration;

use retry::{retry_with_index, OperationResult};

use crate::{Error, Result};

/// Runs `op` up to `max_attempts` times with linearly growing delays.
///
/// The wait before attempt `n + 1` is `base_delay * n` (not exponential;
/// the growth matches the delays the remote host is known to tolerate).
/// `on_retry` observes every failure except the final one; the final error
/// is returned as-is.
pub fn with_backoff<T>(
    max_attempts: usize,
    base_delay: Duration,
    mut on_retry: impl FnMut(usize, &Error),
    mut op: impl FnMut() -> Result<T>,
) -> Result<T> {
    let delays = (1..max_attempts as u32).map(|attempt| base_delay * attempt);
    retry_with_index(delays, |attempt| match op() {
        Ok(val) => OperationResult::Ok(val),
        Err(err) => {
            if (attempt as usize) < max_attempts {
                on_retry(attempt as usize, &err);
            }
            OperationResult::Retry(err)
        }
    })
    .map_err(|err| match err {
        retry::Error::Operation { error, .. } => error,
        retry::Error::Internal(msg) => Error::msg(msg),
    })
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use anyhow::anyhow;

    use super::*;

    #[test]
    fn returns_first_success() -> Result<()> {
        let mut attempts = 0;
        let val = with_backoff(3, Duration::from_millis(0), |_, _| {}, || {
            attempts += 1;
            Ok(42)
        })?;
        assert_eq!(val, 42);
        assert_eq!(attempts, 1);
        Ok(())
    }

    #[test]
    fn retries_until_success() -> Result<()> {
        let mut attempts = 0;
        let mut observed = Vec::new();
        let val = with_backoff(
            3,
            Duration::from_millis(1),
            |attempt, err| observed.push((attempt, err.to_string())),
            || {
                attempts += 1;
                if attempts < 3 {
                    Err(anyhow!("try {} failed", attempts))
                } else {
                    Ok("ok")
                }
            },
        )?;
        assert_eq!(val, "ok");
        assert_eq!(attempts, 3);
        assert_eq!(
            observed,
            vec![
                (1, "try 1 failed".to_owned()),
                (2, "try 2 failed".to_owned())
            ]
        );
        Ok(())
    }

    #[test]
    fn exhaustion_returns_last_error() {
        let mut attempts = 0;
        let mut observed = Vec::new();
        let result: Result<()> = with_backoff(
            3,
            Duration::from_millis(0),
            |attempt, _| observed.push(attempt),
            || {
                attempts += 1;
                Err(anyhow!("failure {}", attempts))
            },
        );
        assert_eq!(attempts, 3);
        // the final failure is not observed, only returned
        assert_eq!(observed, vec![1, 2]);
        assert_eq!(result.unwrap_err().to_string(), "failure 3");
    }

    #[test]
    fn delays_grow_linearly() {
        let base = Duration::from_millis(20);
        let mut attempts = 0;
        let mut stamps = Vec::new();
        let result: Result<()> = with_backoff(3, base, |_, _| {}, || {
            attempts += 1;
            stamps.push(Instant::now());
            Err(anyhow!("never succeeds"))
        });
        assert!(result.is_err());
        assert_eq!(stamps.len(), 3);
        let first_wait = stamps[1] - stamps[0];
        let second_wait = stamps[2] - stamps[1];
        assert!(first_wait >= base);
        assert!(second_wait >= base * 2);
    }
}
