use lazy_static::lazy_static;
use regex::Regex;

pub const RAW_TAG: &str = "[Raw]";
pub const BAKED_TAG: &str = "[Baked]";
pub const BEAST_TAG: &str = "[Beast]";
pub const TEMP_PREFIX: &str = "[Baked][Temp] ";

lazy_static! {
    static ref TAG_REGEX: Regex = Regex::new(r"\[.*?\]").unwrap();
    static ref INVALID_FILE_CHARS_REGEX: Regex = Regex::new(r"[^\w\-_.]").unwrap();
}

pub fn has_raw_tag(name: &str) -> bool {
    name.contains(RAW_TAG)
}

pub fn has_baked_tag(name: &str) -> bool {
    name.contains(BAKED_TAG)
}

pub fn replace_raw_with_baked(name: &str) -> String {
    name.replace(RAW_TAG, BAKED_TAG)
}

/// Strips every `[...]` tag, surrounding whitespace is kept
pub fn remove_tags(name: &str) -> String {
    TAG_REGEX.replace_all(name, "").into_owned()
}

/// Removes spaces and anything that isn't a word character, dash or dot
pub fn sanitize_filename(name: &str) -> String {
    let no_spaces = name.replace(' ', "");
    INVALID_FILE_CHARS_REGEX.replace_all(&no_spaces, "").into_owned()
}

#[cfg(test)]
mod tests {
    use rstest::*;
    use super::*;

    #[rstest]
    #[case("[Raw] Walk", true)]
    #[case("Walk [Raw]", true)]
    #[case("[Baked] Walk", false)]
    #[case("Raw Walk", false)]
    fn detects_raw_tag(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(has_raw_tag(name), expected);
    }

    #[rstest]
    fn raw_becomes_baked() {
        assert_eq!(replace_raw_with_baked("[Raw][Beast] Run"), "[Baked][Beast] Run");
    }

    #[rstest]
    #[case("[Baked][Temp] Walk", " Walk")]
    #[case("[Raw] Walk [v2]", " Walk ")]
    #[case("Idle", "Idle")]
    fn tags_are_removed(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(remove_tags(name), expected);
    }

    #[rstest]
    #[case(" My Fancy Anim", "MyFancyAnim")]
    #[case("Walk/Run: Left*", "WalkRunLeft")]
    #[case("attack_1-b.v2", "attack_1-b.v2")]
    fn filenames_are_sanitized(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(name), expected);
    }
}
