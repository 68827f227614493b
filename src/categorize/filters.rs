//! Clickbait and promotional-channel filter.
//!
//! Content matching these patterns is dropped before categorization; it does
//! not represent someone's actual experience.

const CLICKBAIT_PATTERNS: &[&str] = &[
    // "one trick"
    "after learning this one",
    "this one rule",
    "this one trick",
    "this one secret",
    "this one simple",
    "one weird trick",
    "secret the banks",
    "banks don't want you to know",
    "they don't want you to know",
    "what they don't tell you",
    // guru sales pitches
    "financial freedom in",
    "get rich",
    "make money fast",
    "passive income secrets",
    "i made $",
    "how i made $",
    "quit my job and now",
    "fire movement success",
    // self-promotion
    "here's my channel",
    "subscribe for more",
    "link in bio",
    "check out my course",
    "join my program",
    "free webinar",
    "dm me for",
    // fix-it promises
    "i stopped living paycheck to paycheck after",
    "i fixed my finances in",
    "debt free in",
    "how i paid off",
    "i saved $",
    "budget hack that",
];

const PROMO_CHANNEL_PATTERNS: &[&str] = &[
    "wealth",
    "money coach",
    "financial advisor",
    "get rich",
    "millionaire",
    "stealth wealth",
];

pub fn is_clickbait(title: &str, description: &str) -> bool {
    let text = format!("{title} {description}").to_lowercase();
    CLICKBAIT_PATTERNS.iter().any(|p| text.contains(p))
}

pub fn is_promotional_channel(channel: &str) -> bool {
    let channel = channel.to_lowercase();
    PROMO_CHANNEL_PATTERNS.iter().any(|p| channel.contains(p))
}

/// `true` when the content should be kept.
pub fn filter_content(title: &str, description: &str, channel: &str) -> bool {
    if is_clickbait(title, description) {
        return false;
    }
    channel.is_empty() || !is_promotional_channel(channel)
}
