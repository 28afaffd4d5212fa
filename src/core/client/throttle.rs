//! Proactive throttling against the minutely rate-limit window.

use chrono::Utc;
use std::time::Duration;

impl super::ExactClient {
    /// Wait out the minutely window when the server reported it as exhausted.
    ///
    /// Waits only when the last snapshot says `remaining` is exactly zero and
    /// the reset time lies strictly in the future; an unknown remaining count
    /// or reset time skips throttling entirely. The optional observer is
    /// notified before the sleep. Server-side enforcement stays authoritative;
    /// this is a courtesy delay, not a guarantee.
    pub(crate) async fn throttle_if_exhausted(&self) {
        let minutely = self.rate_limits().await.minutely;
        let (Some(remaining), Some(reset)) = (minutely.remaining, minutely.reset) else {
            return;
        };
        if remaining != 0 {
            return;
        }

        let delay_ms = reset - Utc::now().timestamp_millis();
        if delay_ms <= 0 {
            return;
        }

        let delay = Duration::from_millis(delay_ms as u64);
        if let Some(observer) = self.throttle_observer() {
            observer.on_delay(delay).await;
        }
        tokio::time::sleep(delay).await;
    }
}
