// src/cookie.rs
// Compact cookie encodings for the anonymous browser session.
// Cart entries are "id:sizeId:colorId:qty" joined by ';'; favorites and
// orders are plain comma-joined id lists.

/// One cart line as it exists inside the `cart` cookie. Size/color ids are
/// empty strings when the product was added without that option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartCookieEntry {
    pub id: String,
    pub size_id: String,
    pub color_id: String,
    pub quantity: i32,
}

pub fn encode_cart(entries: &[CartCookieEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{}:{}:{}:{}", e.id, e.size_id, e.color_id, e.quantity))
        .collect::<Vec<_>>()
        .join(";")
}

/// Lenient decode: empty segments are skipped, missing size/color default to
/// "", an unparseable quantity falls back to 1, entries without an id are
/// dropped. Ids are uuids by construction and never contain ':' or ';'.
pub fn decode_cart(raw: &str) -> Vec<CartCookieEntry> {
    raw.split(';')
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| {
            let mut parts = segment.split(':');
            let id = parts.next().unwrap_or("").to_string();
            if id.is_empty() {
                return None;
            }
            let size_id = parts.next().unwrap_or("").to_string();
            let color_id = parts.next().unwrap_or("").to_string();
            let quantity = parts.next().and_then(|q| q.parse::<i32>().ok()).unwrap_or(1);
            Some(CartCookieEntry { id, size_id, color_id, quantity })
        })
        .collect()
}

pub fn encode_id_list(ids: &[String]) -> String {
    ids.join(",")
}

pub fn decode_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|id| !id.is_empty())
        .map(|id| id.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, size: &str, color: &str, qty: i32) -> CartCookieEntry {
        CartCookieEntry {
            id: id.to_string(),
            size_id: size.to_string(),
            color_id: color.to_string(),
            quantity: qty,
        }
    }

    #[test]
    fn cart_round_trips_in_order() {
        let entries = vec![
            entry("p1", "s1", "c1", 2),
            entry("p2", "", "", 1),
            entry("p1", "s2", "", 4),
        ];
        assert_eq!(decode_cart(&encode_cart(&entries)), entries);
    }

    #[test]
    fn empty_cookie_decodes_to_empty_cart() {
        assert!(decode_cart("").is_empty());
        assert!(decode_cart(";;;").is_empty());
    }

    #[test]
    fn missing_options_default_to_empty_strings() {
        let decoded = decode_cart("p1");
        assert_eq!(decoded, vec![entry("p1", "", "", 1)]);

        let decoded = decode_cart("p1:s1");
        assert_eq!(decoded, vec![entry("p1", "s1", "", 1)]);
    }

    #[test]
    fn bad_quantity_falls_back_to_one() {
        let decoded = decode_cart("p1:s1:c1:many;p2:::");
        assert_eq!(
            decoded,
            vec![entry("p1", "s1", "c1", 1), entry("p2", "", "", 1)]
        );
    }

    #[test]
    fn entries_without_id_are_dropped() {
        let decoded = decode_cart(":s1:c1:3;p2:s2:c2:2");
        assert_eq!(decoded, vec![entry("p2", "s2", "c2", 2)]);
    }

    #[test]
    fn id_list_round_trips() {
        let ids = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(decode_id_list(&encode_id_list(&ids)), ids);
        assert!(decode_id_list("").is_empty());
        assert_eq!(decode_id_list(",a,,b,"), vec!["a", "b"]);
    }
}
