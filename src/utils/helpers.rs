use crate::utils::error::{AppError, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

pub fn currency_symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "INR" => Some("₹"),
        _ => None,
    }
}

/// Formats `amount` with a currency prefix, thousands separators and two decimals.
///
/// Unknown currency codes are used verbatim as the prefix (`format_currency(5.0, "JPY")`
/// gives `JPY5.00`).
pub fn format_currency(amount: f64, currency: &str) -> String {
    let symbol = currency_symbol(currency).unwrap_or(currency);
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // -0.00 不顯示負號
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, symbol, grouped, frac_part)
}

/// Deterministic short SKU: category prefix plus six hex digits of the name/category digest.
pub fn generate_sku(name: &str, category: &str) -> String {
    let seed = format!("{}-{}", name.to_uppercase(), category.to_uppercase());
    let digest = hex::encode(Sha256::digest(seed.as_bytes()));
    let prefix: String = category.chars().take(3).collect::<String>().to_uppercase();
    format!("{}-{}", prefix, digest[..6].to_uppercase())
}

/// Returns the requested page and the total page count.
///
/// Out-of-range pages are clamped; an empty list still has one (empty) page.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Result<(&[T], usize)> {
    if page_size == 0 {
        return Err(AppError::validation("page_size must be positive."));
    }

    let total_pages = if items.is_empty() {
        1
    } else {
        items.len().div_ceil(page_size)
    };
    let page = page.clamp(1, total_pages);
    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Ok((&items[start..end], total_pages))
}

pub fn chunk_list<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if size == 0 {
        return Vec::new();
    }
    items.chunks(size).map(<[T]>::to_vec).collect()
}

/// Recursively merges `override_value` into `base`; objects merge key by key, anything else
/// is replaced.
pub fn deep_merge(base: &Value, override_value: &Value) -> Value {
    match (base, override_value) {
        (Value::Object(base_map), Value::Object(override_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in override_map {
                let next = match merged.get(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        (_, other) => other.clone(),
    }
}

pub fn generate_id(prefix: &str) -> String {
    format!("{}{}", prefix, uuid::Uuid::new_v4().simple())
}
