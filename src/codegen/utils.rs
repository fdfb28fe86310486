//! Identifier and literal helpers for generated C#.

/// Reserved words that need an `@` prefix to be used as identifiers
const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Upper-case the first character, leaving the rest untouched
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Turn free text into a PascalCase word list (`"very high"` -> `"VeryHigh"`)
///
/// Existing capitals are kept so acronyms survive (`"SMS"` stays `"SMS"`).
pub fn words_to_pascal_case(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect()
}

/// Make a string a valid C# identifier
///
/// Drops invalid characters, prefixes a leading digit with `_` and a keyword
/// with `@`.
pub fn sanitize_identifier(name: &str) -> String {
    let mut identifier: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if identifier.is_empty() {
        return "_".to_string();
    }

    if identifier.starts_with(|c: char| c.is_ascii_digit()) {
        identifier.insert(0, '_');
    }

    if CSHARP_KEYWORDS.contains(&identifier.as_str()) {
        identifier.insert(0, '@');
    }

    identifier
}

/// Escape a string for use in a C# string literal
pub fn escape_csharp_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Flatten text into a single line safe for a `///` doc comment
pub fn doc_line(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("community"), "Community");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("PriorityCode"), "PriorityCode");
    }

    #[test]
    fn test_words_to_pascal_case() {
        assert_eq!(words_to_pascal_case("very high"), "VeryHigh");
        assert_eq!(words_to_pascal_case("SMS"), "SMS");
        assert_eq!(words_to_pascal_case("Twitter (X)"), "TwitterX");
        assert_eq!(words_to_pascal_case("?!"), "");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("SocialProfile"), "SocialProfile");
        assert_eq!(sanitize_identifier("2ndLine"), "_2ndLine");
        assert_eq!(sanitize_identifier("class"), "@class");
        assert_eq!(sanitize_identifier("new-field"), "newfield");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_escape_csharp_string() {
        assert_eq!(escape_csharp_string("say \"hi\""), "say \\\"hi\\\"");
        assert_eq!(escape_csharp_string("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_doc_line() {
        assert_eq!(doc_line("Social\n  profile <main>"), "Social profile &lt;main&gt;");
    }
}
