//! Bot message texts (Telegram Markdown).

use crate::types::PromoCode;

/// Congratulations sent when a code is issued for the first time.
pub fn first_win(code: &PromoCode) -> String {
    format!(
        "🎉 *Victory!* Congratulations!\n\nYour exclusive promo code: `{}`",
        code
    )
}

/// Reminder sent on every later win. Carries the code already issued.
pub fn repeat_win(code: &PromoCode) -> String {
    format!(
        "✨ *Another victory!* You are magnificent!\n\nA reminder: your exclusive code is still waiting for you: `{}`",
        code
    )
}

/// Consolation sent after a loss.
pub fn loss() -> String {
    "💔 *Defeat*\n\nDon't be upset! Try another game, luck will smile on you soon.".to_string()
}

/// Confirmation sent once the bot chat is linked.
pub fn linked(code: Option<&PromoCode>) -> String {
    let code_part = code
        .map(|code| format!("\n\n🎟 Your current promo code: `{}`", code))
        .unwrap_or_default();
    format!(
        "✨ *Account connected!* ✨\n\nYour game results and exclusive promo codes will now arrive here.{}\n\nGood luck! 💅",
        code_part
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code() -> PromoCode {
        PromoCode::parse("48213").expect("code")
    }

    #[test]
    fn test_win_messages_carry_code() {
        assert!(first_win(&code()).contains("`48213`"));
        assert!(repeat_win(&code()).contains("`48213`"));
        assert_ne!(first_win(&code()), repeat_win(&code()));
    }

    #[test]
    fn test_linked_mentions_code_only_when_present() {
        assert!(linked(Some(&code())).contains("`48213`"));
        assert!(!linked(None).contains("promo code:"));
    }
}
