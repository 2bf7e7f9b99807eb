//! Languages that get Compiler Explorer links.

/// Compiler Explorer settings for one declared language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    /// Tag as declared in the `language-*` class (e.g. `cpp`).
    pub tag: &'static str,
    /// Compiler Explorer language id (e.g. `c++`).
    pub language: &'static str,
    /// Compiler Explorer compiler id.
    pub compiler: &'static str,
    /// Default compiler flags.
    pub options: &'static str,
    /// Human-readable language name.
    pub display_name: &'static str,
}

/// All supported languages, keyed by declared tag.
///
/// Compiler ids follow the godbolt.org catalog: the C frontend of trunk clang
/// is `cclang_trunk`, not `clang_trunk`.
pub static LANGUAGE_PROFILES: [LanguageProfile; 2] = [
    LanguageProfile {
        tag: "cpp",
        language: "c++",
        compiler: "clang_trunk",
        options: "-std=c++20",
        display_name: "C++",
    },
    LanguageProfile {
        tag: "c",
        language: "c",
        compiler: "cclang_trunk",
        options: "",
        display_name: "C",
    },
];

impl LanguageProfile {
    /// Find the profile for a declared language tag.
    ///
    /// Matching is exact: `language-C` or `language-c++` are not supported tags.
    #[must_use]
    pub fn lookup(tag: &str) -> Option<&'static Self> {
        LANGUAGE_PROFILES.iter().find(|profile| profile.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_cpp() {
        let profile = LanguageProfile::lookup("cpp").unwrap();
        assert_eq!(profile.language, "c++");
        assert_eq!(profile.compiler, "clang_trunk");
        assert_eq!(profile.options, "-std=c++20");
        assert_eq!(profile.display_name, "C++");
    }

    #[test]
    fn test_lookup_c() {
        let profile = LanguageProfile::lookup("c").unwrap();
        assert_eq!(profile.language, "c");
        assert_eq!(profile.compiler, "cclang_trunk");
        assert_eq!(profile.options, "");
    }

    #[test]
    fn test_lookup_unsupported() {
        for tag in ["rust", "python", "c++", "CPP", "", "cpp "] {
            assert!(LanguageProfile::lookup(tag).is_none(), "{tag:?} should not match");
        }
    }

    #[test]
    fn test_lookup_returns_shared_entry() {
        let a = LanguageProfile::lookup("cpp").unwrap();
        let b = LanguageProfile::lookup("cpp").unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
