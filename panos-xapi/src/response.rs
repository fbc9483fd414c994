//! Decoding of `<response status=".." code="..">` envelopes.

use thiserror::Error;
use xml_fragment_core::{parse, Element, ParseError};

use crate::outcome::{classify, lookup, Category, Outcome};
use crate::Error as ApiError;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("response is not well-formed XML: {0}")]
    Xml(#[from] ParseError),
    #[error("expected a <response> envelope, found <{0}>")]
    UnexpectedRoot(String),
    #[error("response has no status attribute")]
    MissingStatus,
    #[error("response is missing <{0}>")]
    MissingElement(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
}

/// A decoded response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    status: Status,
    code: Option<String>,
    message: String,
    root: Element,
}

impl ApiResponse {
    pub fn decode(body: &[u8]) -> Result<Self, ProtocolError> {
        let root = parse(body)?;
        if root.name != "response" {
            return Err(ProtocolError::UnexpectedRoot(root.name));
        }
        let status = match root.attribute("status") {
            Some("success") => Status::Success,
            Some(_) => Status::Error,
            None => return Err(ProtocolError::MissingStatus),
        };
        let code = root.attribute("code").map(str::to_string);
        let message = root
            .get_child("msg")
            .or_else(|| root.get_child("result").and_then(|r| r.get_child("msg")))
            .map(message_text)
            .unwrap_or_default();
        Ok(Self {
            status,
            code,
            message,
            root,
        })
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Device message, with multi-line messages joined by spaces.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn result(&self) -> Option<&Element> {
        self.root.get_child("result")
    }

    /// Text content of `<result>`, as returned by most op commands.
    pub fn result_text(&self) -> Option<&str> {
        self.result().and_then(|r| r.text.as_deref())
    }

    /// Classify the envelope.
    ///
    /// Responses without a code are judged by their status attribute: keygen
    /// and op commands often omit it.
    pub fn outcome(&self) -> Outcome {
        match (&self.code, self.status) {
            (Some(code), _) => classify(code, &self.message),
            (None, Status::Success) => Outcome::Success,
            (None, Status::Error) => Outcome::Fatal {
                category: Category::Unknown,
                message: self.message.clone(),
            },
        }
    }

    /// `Ok(self)` on success, otherwise the device's verdict as
    /// [`ApiError::Semantic`].
    pub fn into_result(self) -> Result<Self, ApiError> {
        let outcome = self.outcome();
        if outcome.is_success() {
            return Ok(self);
        }
        let description = self
            .code
            .as_deref()
            .and_then(lookup)
            .map(|entry| entry.description.to_string())
            .unwrap_or_else(|| outcome.message().unwrap_or_default().to_string());
        Err(ApiError::Semantic {
            category: outcome.category(),
            code: self.code,
            description,
            detail: self.message,
        })
    }

    /// `entry` children of the `container` element in the result.
    ///
    /// A `get` on a single entry returns the entry itself under `<result>`,
    /// so that shape is accepted too.
    pub fn entries_for(&self, container: &str) -> Vec<&Element> {
        let Some(result) = self.result() else {
            return Vec::new();
        };
        match result.get_child(container) {
            Some(list) => list.get_children("entry"),
            None => result.get_children("entry"),
        }
    }

    /// Required text at `path` below `<result>`.
    pub fn require_text(&self, path: &[&str]) -> Result<&str, ProtocolError> {
        self.result()
            .and_then(|r| r.get_text(path))
            .ok_or_else(|| ProtocolError::MissingElement(path.join("/")))
    }
}

fn message_text(msg: &Element) -> String {
    let lines = msg.get_children("line");
    if lines.is_empty() {
        return msg.text.as_deref().unwrap_or_default().trim().to_string();
    }
    lines
        .iter()
        .filter_map(|line| line.text.as_deref())
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_inline_msg() {
        let response =
            ApiResponse::decode(br#"<response status="success" code="20"><msg>command succeeded</msg></response>"#)
                .expect("decode");
        assert_eq!(response.status(), Status::Success);
        assert_eq!(response.code(), Some("20"));
        assert_eq!(response.message(), "command succeeded");
        assert!(response.outcome().is_success());
    }

    #[test]
    fn error_lines_are_joined() {
        let response = ApiResponse::decode(
            br#"<response status="error" code="12"><msg><line>a</line><line> b </line></msg></response>"#,
        )
        .expect("decode");
        assert_eq!(response.message(), "a b");
        let err = response.into_result().expect_err("invalid object");
        match err {
            ApiError::Semantic {
                category,
                code,
                detail,
                ..
            } => {
                assert_eq!(category, Category::Malformed);
                assert_eq!(code.as_deref(), Some("12"));
                assert_eq!(detail, "a b");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_code_uses_status() {
        let ok = ApiResponse::decode(br#"<response status="success"><result>x</result></response>"#)
            .expect("decode");
        assert_eq!(ok.outcome(), Outcome::Success);
        assert_eq!(ok.result_text(), Some("x"));

        let failed =
            ApiResponse::decode(br#"<response status="error"><msg>boom</msg></response>"#)
                .expect("decode");
        assert_eq!(failed.outcome().category(), Category::Unknown);
        assert_eq!(failed.outcome().message(), Some("boom"));
    }

    #[test]
    fn rejects_other_roots() {
        assert!(matches!(
            ApiResponse::decode(b"<html/>"),
            Err(ProtocolError::UnexpectedRoot(root)) if root == "html"
        ));
        assert!(matches!(
            ApiResponse::decode(b"<response/>"),
            Err(ProtocolError::MissingStatus)
        ));
        assert!(matches!(
            ApiResponse::decode(b"not xml"),
            Err(ProtocolError::Xml(_))
        ));
    }
}
