use serde::Serialize;

/// One entry of the fixed sign table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZodiacSign {
    pub name: &'static str,
    pub date_range: &'static str,
    /// ASCII form of the name, used in URLs and on the command line.
    pub slug: &'static str,
}

const fn sign(name: &'static str, date_range: &'static str, slug: &'static str) -> ZodiacSign {
    ZodiacSign {
        name,
        date_range,
        slug,
    }
}

pub static ZODIAC_SIGNS: [ZodiacSign; 12] = [
    sign("Koç", "21 Mart - 19 Nisan", "koc"),
    sign("Boğa", "20 Nisan - 20 Mayıs", "boga"),
    sign("İkizler", "21 Mayıs - 20 Haziran", "ikizler"),
    sign("Yengeç", "21 Haziran - 22 Temmuz", "yengec"),
    sign("Aslan", "23 Temmuz - 22 Ağustos", "aslan"),
    sign("Başak", "23 Ağustos - 22 Eylül", "basak"),
    sign("Terazi", "23 Eylül - 22 Ekim", "terazi"),
    sign("Akrep", "23 Ekim - 21 Kasım", "akrep"),
    sign("Yay", "22 Kasım - 21 Aralık", "yay"),
    sign("Oğlak", "22 Aralık - 19 Ocak", "oglak"),
    sign("Kova", "20 Ocak - 18 Şubat", "kova"),
    sign("Balık", "19 Şubat - 20 Mart", "balik"),
];

/// Looks a sign up by its display name or by its slug.
///
/// Slugs match ignoring ASCII case, display names must match exactly
/// (Turkish casing rules make a generic case fold unreliable for `İ`/`ı`).
pub fn find(name_or_slug: &str) -> Option<&'static ZodiacSign> {
    let needle = name_or_slug.trim();
    ZODIAC_SIGNS
        .iter()
        .find(|s| s.name == needle || s.slug.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_has_twelve_unique_signs() {
        let names: HashSet<_> = ZODIAC_SIGNS.iter().map(|s| s.name).collect();
        let slugs: HashSet<_> = ZODIAC_SIGNS.iter().map(|s| s.slug).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(slugs.len(), 12);
        assert!(slugs.iter().all(|s| s.is_ascii()));
    }

    #[test]
    fn test_table_order_starts_with_koc_and_ends_with_balik() {
        assert_eq!(ZODIAC_SIGNS[0].name, "Koç");
        assert_eq!(ZODIAC_SIGNS[0].date_range, "21 Mart - 19 Nisan");
        assert_eq!(ZODIAC_SIGNS[11].name, "Balık");
        assert_eq!(ZODIAC_SIGNS[11].date_range, "19 Şubat - 20 Mart");
    }

    #[test]
    fn test_find_by_name_and_slug() {
        assert_eq!(find("İkizler").map(|s| s.slug), Some("ikizler"));
        assert_eq!(find("ikizler").map(|s| s.name), Some("İkizler"));
        assert_eq!(find("BALIK").map(|s| s.name), Some("Balık"));
        assert_eq!(find(" koc ").map(|s| s.name), Some("Koç"));
    }

    #[test]
    fn test_find_unknown() {
        assert!(find("Ophiuchus").is_none());
        assert!(find("").is_none());
    }
}
