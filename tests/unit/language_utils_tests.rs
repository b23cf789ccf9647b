/*!
 * Tests for language code utilities
 */

use subtrans::language_utils::{
    get_display_name, get_language_name, is_auto, language_codes_match, normalize_to_part1_or_part2t,
    normalize_to_part2t, validate_language_code, LanguageCodeType, SUPPORTED_LANGUAGE_CODES,
};

#[test]
fn test_validateLanguageCode_withWhitespaceAndCase_shouldNormalize() {
    assert_eq!(validate_language_code(" EN ").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code("Deu").unwrap(), LanguageCodeType::Part2T);
    assert!(validate_language_code("").is_err());
    assert!(validate_language_code("english").is_err());
}

#[test]
fn test_normalizeToPart2t_shouldMapEveryCodeType() {
    assert_eq!(normalize_to_part2t("fr").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fre").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("fra").unwrap(), "fra");
    assert_eq!(normalize_to_part2t("chi").unwrap(), "zho");
    assert!(normalize_to_part2t("qq").is_err());
}

#[test]
fn test_normalizeToPart1OrPart2t_withoutTwoLetterCode_shouldKeepThreeLetters() {
    // Hawaiian has no ISO 639-1 code
    assert_eq!(normalize_to_part1_or_part2t("haw").unwrap(), "haw");
    assert!(normalize_to_part1_or_part2t("xyz1").is_err());
}

#[test]
fn test_isAuto_shouldIgnoreCaseAndWhitespace() {
    assert!(is_auto("auto"));
    assert!(is_auto(" Auto "));
    assert!(!is_auto("en"));
}

#[test]
fn test_languageCodesMatch_withInvalidCode_shouldBeFalse() {
    assert!(language_codes_match("ar", "ara"));
    assert!(!language_codes_match("ar", "zz"));
    assert!(!language_codes_match("auto", "auto"));
}

#[test]
fn test_languageNames_shouldResolveFromAnyCodeType() {
    assert_eq!(get_language_name("en").unwrap(), "English");
    assert_eq!(get_language_name("ger").unwrap(), "German");
    assert!(get_display_name("fr").unwrap().starts_with("French"));
    assert!(get_language_name("zz").is_err());
}

#[test]
fn test_supportedLanguageCodes_shouldBeUniqueTwoLetterCodes() {
    let mut codes: Vec<_> = SUPPORTED_LANGUAGE_CODES.to_vec();
    codes.sort_unstable();
    codes.dedup();
    assert_eq!(codes.len(), SUPPORTED_LANGUAGE_CODES.len());
    assert!(SUPPORTED_LANGUAGE_CODES.iter().all(|code| code.len() == 2));
}
