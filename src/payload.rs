// 🔗 QR Payload - fallback chain of candidate texts
// First candidate that yields a non-empty string is encoded

use crate::pricing::PriceEstimate;

/// Text used when there is neither custom text nor a price
pub const FALLBACK_PAYLOAD: &str = "Mobile Price Wizard - Calculate device prices instantly!";

pub trait PayloadSource {
    /// Candidate payload, or `None` to defer to the next source
    fn candidate(&self) -> Option<String>;
}

/// Text the user typed into the encoder
pub struct CustomText<'a>(pub &'a str);

impl PayloadSource for CustomText<'_> {
    fn candidate(&self) -> Option<String> {
        if self.0.is_empty() {
            None
        } else {
            Some(self.0.to_string())
        }
    }
}

/// Caption built from the last estimate, e.g. `Mobile Price: $1,125`
pub struct PriceCaption(pub Option<PriceEstimate>);

impl PayloadSource for PriceCaption {
    fn candidate(&self) -> Option<String> {
        self.0.map(price_caption)
    }
}

pub struct StaticFallback;

impl PayloadSource for StaticFallback {
    fn candidate(&self) -> Option<String> {
        Some(FALLBACK_PAYLOAD.to_string())
    }
}

pub fn price_caption(price: PriceEstimate) -> String {
    format!("Mobile Price: {}", price.formatted())
}

/// Walk the chain and return the first non-empty candidate
pub fn first_non_empty(sources: &[&dyn PayloadSource]) -> Option<String> {
    sources
        .iter()
        .filter_map(|source| source.candidate())
        .find(|text| !text.is_empty())
}

/// Standard chain: custom text, then price caption, then the static fallback.
/// Never empty.
pub fn select_payload(custom_text: &str, price: Option<PriceEstimate>) -> String {
    let custom = CustomText(custom_text);
    let caption = PriceCaption(price);
    first_non_empty(&[&custom, &caption, &StaticFallback])
        .unwrap_or_else(|| FALLBACK_PAYLOAD.to_string())
}
