//! Alert rendering.
//!
//! Pure translation of an accepted pair plus its risk assessment into the
//! Telegram display text and the structured analytics record. Never
//! mutates its input and never fails; missing data renders as zeros or
//! placeholders.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::coerce::or_zero;
use crate::domain::pair::{Pair, Social, TxnStats};
use crate::domain::risk::RiskAssessment;

/// Structured record mirrored to the analytics backend for each alert.
#[derive(Debug, Clone, Serialize)]
pub struct AlertRecord {
    pub token_name: String,
    pub symbol: String,
    pub contract_address: String,
    pub pair_address: String,
    pub market_cap: f64,
    pub price_usd: f64,
    pub price_native: String,
    pub volume_5m: f64,
    pub volume_1h: f64,
    pub volume_24h: f64,
    pub price_change_5m: f64,
    pub price_change_1h: f64,
    pub price_change_24h: f64,
    pub liquidity_usd: f64,
    pub liquidity_base: f64,
    pub liquidity_quote: f64,
    pub age_minutes: Option<f64>,
    pub age_display: String,
    pub dex: String,
    pub chain: String,
    pub risk_level: String,
    pub risk_score: u32,
    pub risk_factors: Vec<String>,
    pub active_boosts: u64,
    pub website_url: Option<String>,
    pub quote_token: QuoteTokenRecord,
    pub timestamp: String,
    pub dexscreener_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteTokenRecord {
    pub name: String,
    pub symbol: String,
    pub address: String,
}

/// Render one accepted pair into (display text, analytics record).
pub fn format_alert(pair: &Pair, risk: &RiskAssessment, now: DateTime<Utc>) -> (String, AlertRecord) {
    let now_ms = now.timestamp_millis();

    let token_name = pair.display_name().to_string();
    let symbol = pair.display_symbol().to_string();
    let contract_address = pair.base_token.address.clone();
    let pair_address = if pair.pair_address.is_empty() {
        "N/A".to_string()
    } else {
        pair.pair_address.clone()
    };

    let market_cap = pair.market_cap_usd();
    let price_usd = or_zero(pair.price_usd);
    let price_native = pair.price_native.clone().unwrap_or_else(|| "N/A".to_string());

    let volume_5m = or_zero(pair.volume.m5);
    let volume_1h = or_zero(pair.volume.h1);
    let volume_24h = or_zero(pair.volume.h24);

    let liquidity = pair.liquidity.unwrap_or_default();
    let liquidity_usd = or_zero(liquidity.usd);
    let liquidity_base = or_zero(liquidity.base);
    let liquidity_quote = or_zero(liquidity.quote);

    let change_5m = or_zero(pair.price_change.m5);
    let change_1h = or_zero(pair.price_change.h1);
    let change_24h = or_zero(pair.price_change.h24);

    let age_minutes = pair.age_minutes(now_ms);
    let age_display = format_age(age_minutes);

    let dex_name = title_case(&pair.dex_id);
    let chain = if pair.chain_id.is_empty() {
        "solana".to_string()
    } else {
        pair.chain_id.clone()
    };

    let quote_symbol = if pair.quote_token.symbol.is_empty() {
        "UNK".to_string()
    } else {
        pair.quote_token.symbol.clone()
    };
    let quote_name = if pair.quote_token.name.is_empty() {
        "Unknown".to_string()
    } else {
        pair.quote_token.name.clone()
    };

    let website_url = pair
        .info
        .as_ref()
        .and_then(|info| info.websites.first())
        .map(|site| site.url.clone())
        .filter(|url| !url.is_empty());
    let social_block = pair
        .info
        .as_ref()
        .map(|info| format_social_links(&info.socials))
        .unwrap_or_default();

    let active_boosts = pair.active_boosts();

    let website_line = website_url
        .as_ref()
        .map(|url| format!("\n\u{2022} [Website]({url})"))
        .unwrap_or_default();
    let social_section = if social_block.is_empty() {
        String::new()
    } else {
        format!("\n\n{social_block}")
    };
    let boost_section = if active_boosts > 0 {
        format!("\n\n\u{1F680} *Active Boosts:* {active_boosts}")
    } else {
        String::new()
    };
    let factors_line = if risk.factors.is_empty() {
        "None identified".to_string()
    } else {
        risk.factors.join(", ")
    };

    let text = format!(
        "\u{1F680} *{chain_upper} NEW PAIR ALERT* \u{1F680}\n\
         \n\
         \u{1F48E} *{token_name}* (`${symbol}`)\n\
         \u{1F194} *CA:* `{contract_address}`\n\
         \n\
         \u{1F4CA} *MARKET DATA:*\n\
         \u{1F4B0} Market Cap: ${market_cap:.0}\n\
         \u{1F4B5} Price: ${price_usd:.10}\n\
         \u{1F504} Native Price: {price_native}\n\
         \u{1F4A7} Liquidity: ${liquidity_usd:.0}\n\
         {dex_emoji} *DEX:* {dex_name}\n\
         \u{23F0} *Age:* {age_display}\n\
         \u{26A0} *Risk:* {risk_emoji} {risk_level} (Score: {risk_score})\n\
         \n\
         \u{1F4C8} *PRICE CHANGES:*\n\
         {emoji_5m} 5m: {change_5m:+.2}%\n\
         {emoji_1h} 1h: {change_1h:+.2}%\n\
         {emoji_24h} 24h: {change_24h:+.2}%\n\
         \n\
         \u{1F4B9} *VOLUME:*\n\
         \u{2022} 5m: ${volume_5m:.0}\n\
         \u{2022} 1h: ${volume_1h:.0}\n\
         \u{2022} 24h: ${volume_24h:.0}\n\
         \n\
         \u{1F504} *TRANSACTIONS:*\n\
         {txn_details}\n\
         \n\
         \u{1F4A7} *LIQUIDITY BREAKDOWN:*\n\
         \u{2022} USD: ${liquidity_usd:.0}\n\
         \u{2022} Base: {liquidity_base:.2} {symbol}\n\
         \u{2022} Quote: {liquidity_quote:.2} {quote_symbol}\n\
         \n\
         \u{1F517} *QUICK LINKS:*\n\
         \u{2022} [DexScreener](https://dexscreener.com/{chain}/{contract_address})\n\
         \u{2022} [Solscan](https://solscan.io/token/{contract_address})\n\
         \u{2022} [Jupiter Swap](https://jup.ag/swap/SOL-{contract_address})\n\
         \u{2022} [Raydium](https://raydium.io/swap/?inputCurrency=sol&outputCurrency={contract_address}){website_line}{social_section}{boost_section}\n\
         \n\
         \u{26A1} *COPY CA:* `{contract_address}`\n\
         \n\
         \u{26A0} *RISK FACTORS:* {factors_line}\n\
         \n\
         \u{1F4CB} *PAIR INFO:*\n\
         \u{2022} Pair Address: `{pair_address}`\n\
         \u{2022} Quote Token: {quote_name} ({quote_symbol})",
        chain_upper = chain.to_uppercase(),
        dex_emoji = dex_emoji(&pair.dex_id),
        risk_emoji = risk.level.emoji(),
        risk_level = risk.level,
        risk_score = risk.score,
        emoji_5m = change_emoji(change_5m),
        emoji_1h = change_emoji(change_1h),
        emoji_24h = change_emoji(change_24h),
        txn_details = format_txn_details(&pair.txns),
    );

    let record = AlertRecord {
        token_name,
        symbol,
        contract_address,
        pair_address,
        market_cap,
        price_usd,
        price_native,
        volume_5m,
        volume_1h,
        volume_24h,
        price_change_5m: change_5m,
        price_change_1h: change_1h,
        price_change_24h: change_24h,
        liquidity_usd,
        liquidity_base,
        liquidity_quote,
        age_minutes,
        age_display,
        dex: dex_name,
        chain,
        risk_level: risk.level.to_string(),
        risk_score: risk.score,
        risk_factors: risk.factors.clone(),
        active_boosts,
        website_url,
        quote_token: QuoteTokenRecord {
            name: quote_name,
            symbol: quote_symbol,
            address: pair.quote_token.address.clone(),
        },
        timestamp: now.to_rfc3339(),
        dexscreener_url: pair.url.clone(),
    };

    (text, record)
}

/// "14m", "2h 05m", or "Unknown".
fn format_age(age_minutes: Option<f64>) -> String {
    match age_minutes {
        Some(age) if age >= 60.0 => {
            let hours = (age / 60.0) as u64;
            let minutes = (age % 60.0) as u64;
            format!("{hours}h {minutes:02}m")
        }
        Some(age) => format!("{}m", age as i64),
        None => "Unknown".to_string(),
    }
}

/// Direction marker tiers for a price-change percentage.
fn change_emoji(change_percent: f64) -> &'static str {
    if change_percent > 100.0 {
        "\u{1F680}\u{1F680}\u{1F680}"
    } else if change_percent > 50.0 {
        "\u{1F680}\u{1F680}"
    } else if change_percent > 20.0 {
        "\u{1F680}"
    } else if change_percent > 10.0 {
        "\u{1F4C8}"
    } else if change_percent > 0.0 {
        "\u{2B06}"
    } else if change_percent == 0.0 {
        "\u{27A1}"
    } else if change_percent > -10.0 {
        "\u{2B07}"
    } else if change_percent > -20.0 {
        "\u{1F4C9}"
    } else if change_percent > -50.0 {
        "\u{1F4A5}"
    } else {
        "\u{1F480}"
    }
}

fn dex_emoji(dex_id: &str) -> &'static str {
    let dex_id = dex_id.to_lowercase();
    let table: &[(&str, &str)] = &[
        ("raydium", "\u{1F30A}"),
        ("orca", "\u{1F40B}"),
        ("jupiter", "\u{1FA90}"),
        ("pumpfun", "\u{1F48E}"),
        ("pump.fun", "\u{1F48E}"),
        ("moonshot", "\u{1F319}"),
        ("meteora", "\u{2604}"),
        ("serum", "\u{1F9EC}"),
        ("aldrin", "\u{26A1}"),
    ];
    for (name, emoji) in table {
        if dex_id.contains(name) {
            return emoji;
        }
    }
    "\u{1F3EA}"
}

/// Per-timeframe buy/sell breakdown with the buy percentage.
fn format_txn_details(txns: &TxnStats) -> String {
    let windows = [(txns.m5, "5m"), (txns.h1, "1h"), (txns.h24, "24h")];
    let mut lines = Vec::new();
    for (window, label) in windows {
        match window {
            Some(w) if w.total() > 0 => {
                let buy_pct = w.buys as f64 / w.total() as f64 * 100.0;
                lines.push(format!(
                    "\u{2022} {label}: {} txns (B:{} S:{} | {buy_pct:.1}% buys)",
                    w.total(),
                    w.buys,
                    w.sells
                ));
            }
            Some(_) => lines.push(format!("\u{2022} {label}: 0 txns")),
            None => lines.push(format!("\u{2022} {label}: No data")),
        }
    }
    lines.join("\n")
}

/// Up to three social links rendered as markdown.
fn format_social_links(socials: &[Social]) -> String {
    let mut links = Vec::new();
    for social in socials.iter().take(3) {
        let platform = social.platform.to_lowercase();
        if platform.is_empty() {
            continue;
        }
        let line = match (platform.as_str(), &social.url, &social.handle) {
            (_, Some(url), _) if !url.is_empty() => {
                format!("\u{1F517} [{}]({url})", title_case(&platform))
            }
            ("twitter", _, Some(handle)) if !handle.is_empty() => {
                format!("\u{1F426} [Twitter](https://twitter.com/{handle})")
            }
            ("telegram", _, Some(handle)) if !handle.is_empty() => {
                format!("\u{1F4F1} [Telegram](https://t.me/{handle})")
            }
            (_, _, Some(handle)) if !handle.is_empty() => {
                format!("\u{1F517} {}: {handle}", title_case(&platform))
            }
            _ => continue,
        };
        links.push(line);
    }
    links.join("\n")
}

/// Uppercase the first character, as in "raydium" -> "Raydium".
fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
