//! # Syntax definitions
//!
//! A compiled-in table of file-type definitions, matched against a filename. Adding a new
//! language means adding an entry to [`SYNTAX_DATABASE`]; there is no file-backed plugin
//! mechanism (the `/etc/kibi/syntax.d`-style config-directory lookup some editors in this
//! family use is a configuration-file feature, and configuration files are out of scope here).

/// Bit flags selecting which highlight rules a [`SyntaxConf`] turns on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HlFlags(u8);

impl HlFlags {
    pub const NONE: Self = Self(0);
    pub const NUMBERS: Self = Self(0b01);
    pub const STRINGS: Self = Self(0b10);

    pub const fn contains(self, other: Self) -> bool { self.0 & other.0 == other.0 }
}

impl std::ops::BitOr for HlFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self { Self(self.0 | rhs.0) }
}

/// A file-type's syntax highlighting rules.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxConf {
    /// The name shown in the status bar (e.g. `"c"`, or `"no ft"` when nothing matched).
    pub name: &'static str,
    /// Filename patterns. A pattern starting with `.` matches as a filename extension; any
    /// other pattern matches as a substring of the filename.
    pub patterns: &'static [&'static str],
    /// Keywords. A keyword ending with `|` is a "type" keyword (painted `Keyword2`); any other
    /// keyword is painted `Keyword1`. The trailing `|` is not part of the matched text.
    pub keywords: &'static [&'static str],
    pub singleline_comment_start: &'static str,
    pub multiline_comment_start: &'static str,
    pub multiline_comment_end: &'static str,
    pub flags: HlFlags,
}

impl Default for SyntaxConf {
    /// The "no file type matched" configuration: no keywords, no comments, no numbers/strings.
    fn default() -> Self {
        Self {
            name: "no ft",
            patterns: &[],
            keywords: &[],
            singleline_comment_start: "",
            multiline_comment_start: "",
            multiline_comment_end: "",
            flags: HlFlags::NONE,
        }
    }
}

impl SyntaxConf {
    /// If `keyword_text` starts at the beginning of `s` and is followed by a separator (or the
    /// end of `s`), return its length (excluding any trailing `|`) and whether it is a type
    /// keyword.
    fn match_keyword_at(s: &[u8], keyword: &str) -> Option<(usize, bool)> {
        let is_type = keyword.ends_with('|');
        let word = keyword.strip_suffix('|').unwrap_or(keyword).as_bytes();
        if !s.starts_with(word) {
            return None;
        }
        let next = s.get(word.len()).copied();
        match next {
            None => Some((word.len(), is_type)),
            Some(b) if crate::row::is_separator(b) => Some((word.len(), is_type)),
            Some(_) => None,
        }
    }

    /// Try each keyword against the start of `s`, in declaration order. Returns the matched
    /// length and whether it is a type keyword.
    pub fn match_keyword(&self, s: &[u8]) -> Option<(usize, bool)> {
        self.keywords.iter().find_map(|kw| Self::match_keyword_at(s, kw))
    }

    /// Select a syntax definition for `filename` by scanning [`SYNTAX_DATABASE`] in order.
    /// Falls back to [`SyntaxConf::default`] (the "no ft" configuration) if nothing matches.
    pub fn select(filename: &str) -> Self {
        for syntax in SYNTAX_DATABASE {
            for pattern in syntax.patterns {
                let matched = match pattern.strip_prefix('.') {
                    Some(ext) => filename.rsplit('.').next() == Some(ext),
                    None => filename.contains(pattern),
                };
                if matched {
                    return *syntax;
                }
            }
        }
        Self::default()
    }
}

const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "continue", "default", "do", "else", "enum", "extern", "for", "goto",
    "if", "register", "return", "sizeof", "static", "struct", "switch", "typedef", "union",
    "volatile", "while", "#include", "#define", "#ifdef", "#ifndef", "#endif", "#undef",
    "int|", "long|", "double|", "float|", "char|", "unsigned|", "signed|", "void|",
];

/// The compiled-in file-type table (§6). One entry: C and C-like headers.
pub static SYNTAX_DATABASE: &[SyntaxConf] = &[SyntaxConf {
    name: "c",
    patterns: &[".c", ".h", ".cpp"],
    keywords: C_KEYWORDS,
    singleline_comment_start: "//",
    multiline_comment_start: "/*",
    multiline_comment_end: "*/",
    flags: HlFlags(HlFlags::NUMBERS.0 | HlFlags::STRINGS.0),
}];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_c_by_extension() {
        assert_eq!(SyntaxConf::select("main.c").name, "c");
        assert_eq!(SyntaxConf::select("header.h").name, "c");
        assert_eq!(SyntaxConf::select("thing.cpp").name, "c");
    }

    #[test]
    fn falls_back_to_no_ft() {
        assert_eq!(SyntaxConf::select("README.md").name, "no ft");
        assert_eq!(SyntaxConf::select("noext").name, "no ft");
    }

    #[test]
    fn extension_match_is_exact_not_substring() {
        // "foo.bc" must not match the ".c" pattern.
        assert_eq!(SyntaxConf::select("foo.bc").name, "no ft");
    }

    #[test]
    fn type_keyword_detected() {
        let c = SyntaxConf::select("a.c");
        assert_eq!(c.match_keyword(b"int x;"), Some((3, true)));
        assert_eq!(c.match_keyword(b"return 0;"), Some((6, false)));
        assert_eq!(c.match_keyword(b"integer"), None); // not followed by a separator
    }
}
