//! Waiting for the player to link the bot.

use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::api::{PlayerStatus, PromoApi};

/// Default gap between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Bot deep link that sends `/start connect_<id>` when opened.
pub fn deep_link(bot_username: &str, player_id: &str) -> String {
    format!(
        "https://t.me/{}?start=connect_{}",
        bot_username.trim_start_matches('@'),
        player_id
    )
}

/// Polls the player's status every `interval` until the account is linked.
///
/// Transport and server errors are logged and the next tick retries. Once
/// linked, polling stops for good.
#[instrument(skip(api))]
pub async fn wait_until_linked(api: &PromoApi, player_id: &str, interval: Duration) -> PlayerStatus {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        match api.player_status(player_id).await {
            Ok(status) if status.is_connected => {
                info!("Account linked");
                return status;
            }
            Ok(_) => debug!("Not linked yet"),
            Err(e) => warn!(error = %e, "Status poll failed, retrying"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_link() {
        assert_eq!(
            deep_link("glamour_bot", "abc"),
            "https://t.me/glamour_bot?start=connect_abc"
        );
        assert_eq!(
            deep_link("@glamour_bot", "abc"),
            "https://t.me/glamour_bot?start=connect_abc"
        );
    }
}
