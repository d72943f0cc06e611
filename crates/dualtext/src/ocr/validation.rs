use super::error::OcrError;
use std::collections::HashSet;

lazy_static::lazy_static! {
    /// Language packs published for Tesseract 4 and 5.
    pub static ref TESSERACT_LANGUAGE_CODES: HashSet<&'static str> = [
        "afr", "amh", "ara", "asm", "aze", "aze_cyrl", "bel", "ben", "bod", "bos", "bre", "bul",
        "cat", "ceb", "ces", "chi_sim", "chi_tra", "chr", "cos", "cym", "dan", "deu", "div", "dzo",
        "ell", "eng", "enm", "epo", "equ", "est", "eus", "fao", "fas", "fil", "fin", "fra", "frk",
        "frm", "fry", "gla", "gle", "glg", "grc", "guj", "hat", "heb", "hin", "hrv", "hun", "hye",
        "iku", "ind", "isl", "ita", "ita_old", "jav", "jpn", "kan", "kat", "kat_old", "kaz", "khm",
        "kir", "kmr", "kor", "lao", "lat", "lav", "lit", "ltz", "mal", "mar", "mkd", "mlt", "mon",
        "mri", "msa", "mya", "nep", "nld", "nor", "oci", "ori", "osd", "pan", "pol", "por", "pus",
        "que", "ron", "rus", "san", "sin", "slk", "slv", "snd", "spa", "spa_old", "sqi", "srp",
        "srp_latn", "sun", "swa", "swe", "syr", "tam", "tat", "tel", "tgk", "tha", "tir", "ton",
        "tur", "uig", "ukr", "urd", "uzb", "uzb_cyrl", "vie", "yid", "yor",
    ]
    .into_iter()
    .collect();
}

/// Validate a Tesseract language argument such as `eng` or `eng+deu`.
pub fn validate_language_code(lang_code: &str) -> Result<(), OcrError> {
    if lang_code.trim().is_empty() {
        return Err(OcrError::InvalidLanguageCode("language must not be empty".to_string()));
    }

    for code in lang_code.split('+') {
        if !TESSERACT_LANGUAGE_CODES.contains(code) {
            return Err(OcrError::InvalidLanguageCode(format!(
                "Language code '{}' is not supported by Tesseract",
                code
            )));
        }
    }
    Ok(())
}

/// Validate a page segmentation mode (`--psm`), which Tesseract accepts in `0..=13`.
pub fn validate_psm(psm: u8) -> Result<(), OcrError> {
    if psm > 13 {
        return Err(OcrError::InvalidConfiguration(format!(
            "Page segmentation mode {} is out of range (0-13)",
            psm
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_language() {
        assert!(validate_language_code("eng").is_ok());
    }

    #[test]
    fn test_combined_languages() {
        assert!(validate_language_code("eng+deu+fra").is_ok());
    }

    #[test]
    fn test_unknown_language() {
        let err = validate_language_code("eng+klingon").unwrap_err();
        assert!(err.to_string().contains("klingon"));
    }

    #[test]
    fn test_empty_language() {
        assert!(validate_language_code("").is_err());
        assert!(validate_language_code("eng+").is_err());
    }

    #[test]
    fn test_psm_range() {
        assert!(validate_psm(3).is_ok());
        assert!(validate_psm(13).is_ok());
        assert!(validate_psm(14).is_err());
    }
}
