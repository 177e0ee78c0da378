//! Default resource files embedded in the binary.
//!
//! Every resource can be overridden by a file of the same name in the
//! configured resource directory.

pub static INTERNAL_DOMAINS: &str = include_str!("../../resources/internal_domains.txt");
pub static BLACKLIST: &str = include_str!("../../resources/blacklist.txt");
pub static INTERNAL_MARKERS: &str = include_str!("../../resources/internal_markers.txt");
pub static COMPANY_BLACKLIST: &str = include_str!("../../resources/company_blacklist.txt");
pub static ADDRESS_BLACKLIST: &str = include_str!("../../resources/address_blacklist.txt");
pub static STOP_WORDS_PERSON: &str = include_str!("../../resources/stop_words_person.txt");
pub static STOP_WORDS_ORG: &str = include_str!("../../resources/stop_words_org.txt");
pub static SIGNATURE_MARKERS: &str = include_str!("../../resources/signature_markers.txt");
pub static PHONE_PATTERNS: &str = include_str!("../../resources/phone_patterns.txt");
pub static POSITION_PATTERNS: &str = include_str!("../../resources/position_patterns.txt");
pub static POSITION_KEYWORDS: &str = include_str!("../../resources/position_keywords.txt");
pub static POSITION_MODIFIERS: &str = include_str!("../../resources/position_modifiers.txt");
pub static POSITION_CONTINUATIONS: &str =
    include_str!("../../resources/position_continuations.txt");
pub static MOBILE_CODES: &str = include_str!("../../resources/mobile_codes.txt");

/// A named embedded resource.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedResource {
    /// File name used for directory overrides.
    pub file: &'static str,
    /// Default contents.
    pub contents: &'static str,
}

/// All embedded resources, in load order.
pub const RESOURCES: &[EmbeddedResource] = &[
    EmbeddedResource { file: "internal_domains.txt", contents: INTERNAL_DOMAINS },
    EmbeddedResource { file: "blacklist.txt", contents: BLACKLIST },
    EmbeddedResource { file: "internal_markers.txt", contents: INTERNAL_MARKERS },
    EmbeddedResource { file: "company_blacklist.txt", contents: COMPANY_BLACKLIST },
    EmbeddedResource { file: "address_blacklist.txt", contents: ADDRESS_BLACKLIST },
    EmbeddedResource { file: "stop_words_person.txt", contents: STOP_WORDS_PERSON },
    EmbeddedResource { file: "stop_words_org.txt", contents: STOP_WORDS_ORG },
    EmbeddedResource { file: "signature_markers.txt", contents: SIGNATURE_MARKERS },
    EmbeddedResource { file: "phone_patterns.txt", contents: PHONE_PATTERNS },
    EmbeddedResource { file: "position_patterns.txt", contents: POSITION_PATTERNS },
    EmbeddedResource { file: "position_keywords.txt", contents: POSITION_KEYWORDS },
    EmbeddedResource { file: "position_modifiers.txt", contents: POSITION_MODIFIERS },
    EmbeddedResource { file: "position_continuations.txt", contents: POSITION_CONTINUATIONS },
    EmbeddedResource { file: "mobile_codes.txt", contents: MOBILE_CODES },
];

/// Look up the embedded default for a resource file name.
pub fn embedded(file: &str) -> Option<&'static str> {
    RESOURCES.iter().find(|r| r.file == file).map(|r| r.contents)
}
