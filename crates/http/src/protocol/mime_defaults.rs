//! MIME defaults of the dispatch engine and essence comparison.

use mime::Mime;

/// Input mime of a registration that declares none, and of every `GET` registration.
pub fn default_in() -> Mime {
    mime::APPLICATION_WWW_FORM_URLENCODED
}

/// Output mime of a registration that declares none.
pub fn default_out() -> Mime {
    mime::TEXT_HTML
}

/// Compares `type/subtype` only, ignoring parameters such as `charset`.
pub fn same_essence(a: &Mime, b: &Mime) -> bool {
    a.essence_str().eq_ignore_ascii_case(b.essence_str())
}
