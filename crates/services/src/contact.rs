//! Contact deep links for reaching a seller over WhatsApp.

const WHATSAPP_BASE: &str = "https://wa.me/";

/// `https://wa.me/<digits>?text=<urlencoded>`; everything but ASCII digits is
/// stripped from the phone. `None` when no digits remain.
pub fn whatsapp_link(phone: &str, text: &str) -> Option<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    if text.is_empty() {
        return Some(format!("{WHATSAPP_BASE}{digits}"));
    }
    let query = serde_urlencoded::to_string([("text", text)]).unwrap_or_default();
    Some(format!("{WHATSAPP_BASE}{digits}?{query}"))
}

/// Message pre-filled when a buyer taps "contact seller" on a listing.
pub fn listing_inquiry(title: &str) -> String {
    format!("Hi! I'm interested in your listing: {title}")
}
