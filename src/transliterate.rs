//! Arabic → Latin transliteration, one character at a time.
//!
//! Letters map to a simple ASCII scheme; short vowels and tanwin are spelled
//! out; shadda, sukun and tatweel disappear. Anything without a mapping
//! (Latin text, spaces, newlines) is copied through.

/// Latin replacement for one Arabic-script character.
fn latin_for(c: char) -> Option<&'static str> {
    let s = match c {
        // Letters
        'ا' | 'أ' => "a",
        'إ' => "i",
        'آ' => "aa",
        'ب' => "b",
        'ت' => "t",
        'ث' => "th",
        'ج' => "j",
        'ح' => "h",
        'خ' => "kh",
        'د' => "d",
        'ذ' => "dh",
        'ر' => "r",
        'ز' => "z",
        'س' => "s",
        'ش' => "sh",
        'ص' => "s",
        'ض' => "d",
        'ط' => "t",
        'ظ' => "z",
        'ع' => "`",
        'غ' => "gh",
        'ف' => "f",
        'ق' => "q",
        'ك' => "k",
        'ل' => "l",
        'م' => "m",
        'ن' => "n",
        'ه' => "h",
        'و' => "w",
        'ي' => "y",
        'ة' => "h",
        'ى' => "a",
        // Hamza forms
        'ء' => "'",
        'ؤ' => "w",
        'ئ' => "y",
        // Harakat and tanwin
        '\u{064E}' => "a",  // fatha
        '\u{064F}' => "u",  // damma
        '\u{0650}' => "i",  // kasra
        '\u{064C}' => "un", // dammatan
        '\u{064D}' => "in", // kasratan
        '\u{064B}' => "an", // fathatan
        '\u{0651}' | '\u{0652}' | '\u{0640}' => "", // shadda, sukun, tatweel
        // Arabic-Indic digits
        '٠' => "0",
        '١' => "1",
        '٢' => "2",
        '٣' => "3",
        '٤' => "4",
        '٥' => "5",
        '٦' => "6",
        '٧' => "7",
        '٨' => "8",
        '٩' => "9",
        // Punctuation
        '،' => ",",
        '؛' => ";",
        '؟' => "?",
        _ => return None,
    };
    Some(s)
}

/// Transliterate `text` into Latin script.
pub fn transliterate(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match latin_for(c) {
            Some(latin) => out.push_str(latin),
            None => out.push(c),
        }
    }
    out
}
