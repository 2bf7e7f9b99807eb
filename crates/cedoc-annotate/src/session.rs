//! Compiler Explorer client-state payload.
//!
//! Compiler Explorer restores an editor session from
//! `<instance>/clientstate/<payload>`, where the payload is standard base64 of
//! a JSON document. The field order below matches what the service writes
//! itself; `serde_json` keeps struct field order, so the encoding is stable.

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::SessionError;
use crate::profile::LanguageProfile;

/// Path segment that precedes the encoded payload.
const CLIENTSTATE_SEGMENT: &str = "/clientstate/";

/// Top-level client-state document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescriptor {
    /// Editor sessions (always exactly one here).
    pub sessions: Vec<Session>,
}

/// One editor with its compilers and executors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Editor id.
    pub id: u32,
    /// Compiler Explorer language id.
    pub language: String,
    /// Source text.
    pub source: String,
    /// Compiler panes.
    pub compilers: Vec<CompilerConfig>,
    /// Executor panes.
    pub executor: Vec<Executor>,
}

/// Compiler selection shared by compiler and executor panes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Compiler id from the instance's catalog.
    pub id: String,
    /// Libraries to link.
    pub libs: Vec<Library>,
    /// Command-line flags.
    pub options: String,
}

/// Library reference inside a compiler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    /// Library id.
    pub id: String,
    /// Library version.
    pub version: String,
}

/// Executor pane wrapping a compiler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Executor {
    /// Compiler used to build and run the program.
    pub compiler: CompilerConfig,
}

impl SessionDescriptor {
    /// Build the descriptor for a code block.
    ///
    /// The same compiler configuration is used for the compiler pane and the
    /// executor pane, so the link opens with both assembly and program output.
    #[must_use]
    pub fn for_source(source: &str, profile: &LanguageProfile) -> Self {
        let compiler = CompilerConfig {
            id: profile.compiler.to_owned(),
            libs: Vec::new(),
            options: profile.options.to_owned(),
        };
        Self {
            sessions: vec![Session {
                id: 1,
                language: profile.language.to_owned(),
                source: source.to_owned(),
                compilers: vec![compiler.clone()],
                executor: vec![Executor { compiler }],
            }],
        }
    }

    /// Canonical JSON text.
    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Base64 of the UTF-8 JSON bytes.
    pub fn encode(&self) -> Result<String, SessionError> {
        Ok(BASE64_STANDARD.encode(self.to_json()?))
    }

    /// Full link: `clientstate_base` followed by the encoded payload.
    ///
    /// `clientstate_base` is e.g. `https://godbolt.org/clientstate/`.
    pub fn to_url(&self, clientstate_base: &str) -> Result<String, SessionError> {
        Ok(format!("{clientstate_base}{}", self.encode()?))
    }

    /// Decode a base64 payload.
    pub fn decode(payload: &str) -> Result<Self, SessionError> {
        let bytes = BASE64_STANDARD.decode(payload.trim())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Decode a client-state URL, or a bare payload.
    pub fn from_url(url: &str) -> Result<Self, SessionError> {
        let url = url.trim();
        if let Some(position) = url.find(CLIENTSTATE_SEGMENT) {
            return Self::decode(&url[position + CLIENTSTATE_SEGMENT.len()..]);
        }
        if url.contains("://") {
            return Err(SessionError::NotClientState(url.to_owned()));
        }
        Self::decode(url)
    }

    /// Source text of the first session.
    pub fn source(&self) -> Option<&str> {
        self.sessions.first().map(|s| s.source.as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const GODBOLT: &str = "https://godbolt.org/clientstate/";

    fn cpp() -> &'static LanguageProfile {
        LanguageProfile::lookup("cpp").unwrap()
    }

    #[test]
    fn test_json_field_order() {
        let descriptor = SessionDescriptor::for_source("int main() {}", cpp());
        assert_eq!(
            descriptor.to_json().unwrap(),
            concat!(
                r#"{"sessions":[{"id":1,"language":"c++","source":"int main() {}","#,
                r#""compilers":[{"id":"clang_trunk","libs":[],"options":"-std=c++20"}],"#,
                r#""executor":[{"compiler":{"id":"clang_trunk","libs":[],"options":"-std=c++20"}}]}]}"#,
            )
        );
    }

    #[test]
    fn test_c_profile_uses_c_compiler() {
        let descriptor =
            SessionDescriptor::for_source("int x;", LanguageProfile::lookup("c").unwrap());
        let session = &descriptor.sessions[0];
        assert_eq!(session.language, "c");
        assert_eq!(session.compilers[0].id, "cclang_trunk");
        assert_eq!(session.compilers[0].options, "");
        assert_eq!(session.executor[0].compiler, session.compilers[0]);
    }

    #[test]
    fn test_encode_is_standard_base64_of_json() {
        let descriptor = SessionDescriptor::for_source("x", cpp());
        let encoded = descriptor.encode().unwrap();
        let decoded = BASE64_STANDARD.decode(&encoded).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            descriptor.to_json().unwrap()
        );
    }

    #[test]
    fn test_url_prefix() {
        let url = SessionDescriptor::for_source("x", cpp())
            .to_url(GODBOLT)
            .unwrap();
        assert!(url.starts_with("https://godbolt.org/clientstate/eyJzZXNzaW9ucyI6"));
    }

    #[test]
    fn test_roundtrip_preserves_source_bytes() {
        let source = "#include <cstdio>\n\tint main() { puts(\"h\u{e9}llo \u{1f980}\\n\"); }\r\n";
        let url = SessionDescriptor::for_source(source, cpp())
            .to_url(GODBOLT)
            .unwrap();

        let decoded = SessionDescriptor::from_url(&url).unwrap();
        assert_eq!(decoded.source(), Some(source));
        assert_eq!(decoded, SessionDescriptor::for_source(source, cpp()));
    }

    #[test]
    fn test_from_url_accepts_bare_payload() {
        let descriptor = SessionDescriptor::for_source("int a;", cpp());
        let payload = descriptor.encode().unwrap();
        assert_eq!(SessionDescriptor::from_url(&payload).unwrap(), descriptor);
    }

    #[test]
    fn test_from_url_rejects_other_urls() {
        let err = SessionDescriptor::from_url("https://godbolt.org/z/abc123").unwrap_err();
        assert!(matches!(err, SessionError::NotClientState(_)));
    }

    #[test]
    fn test_decode_invalid_base64() {
        let err = SessionDescriptor::decode("not base64!").unwrap_err();
        assert!(matches!(err, SessionError::Base64(_)));
    }

    #[test]
    fn test_decode_invalid_json() {
        let payload = BASE64_STANDARD.encode("{\"sessions\": 1}");
        let err = SessionDescriptor::decode(&payload).unwrap_err();
        assert!(matches!(err, SessionError::Json(_)));
    }
}
