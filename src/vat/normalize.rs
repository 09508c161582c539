//! Description normalization for rule matching.

/// Normalize free text for rule matching.
///
/// Lowercases, folds Danish letters (æ → ae, ø → oe, å → aa), strips
/// diacritics from other Latin letters, turns punctuation into
/// whitespace and collapses runs of whitespace into single spaces.
pub fn normalize_description(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        let folded = fold(c);
        if folded.is_none() && !c.is_alphanumeric() {
            pending_space = !out.is_empty();
            continue;
        }
        if pending_space {
            out.push(' ');
            pending_space = false;
        }
        match folded {
            Some(s) => out.push_str(s),
            None => out.push(c),
        }
    }

    out
}

fn fold(c: char) -> Option<&'static str> {
    let s = match c {
        'æ' => "ae",
        'ø' => "oe",
        'å' => "aa",
        'ß' => "ss",
        'á' | 'à' | 'â' | 'ä' | 'ã' => "a",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => "o",
        'ú' | 'ù' | 'û' | 'ü' => "u",
        'ý' | 'ÿ' => "y",
        'ç' => "c",
        'ñ' => "n",
        _ => return None,
    };
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses() {
        assert_eq!(normalize_description("  Coca Cola + PANT A "), "coca cola pant a");
    }

    #[test]
    fn folds_danish_letters() {
        assert_eq!(normalize_description("Arla Sødmælk"), "arla soedmaelk");
        assert_eq!(normalize_description("Frimærke, Århus"), "frimaerke aarhus");
    }

    #[test]
    fn strips_diacritics() {
        assert_eq!(normalize_description("Café Crème"), "cafe creme");
    }

    #[test]
    fn punctuation_becomes_space() {
        assert_eq!(normalize_description("pant-a/b.c"), "pant a b c");
    }

    #[test]
    fn empty_and_symbols_only() {
        assert_eq!(normalize_description(""), "");
        assert_eq!(normalize_description("*** --- ***"), "");
    }

    #[test]
    fn keeps_digits() {
        assert_eq!(normalize_description("Pant 1,50 kr."), "pant 1 50 kr");
    }
}
