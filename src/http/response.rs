//! Response rendering.
//!
//! # Responsibilities
//! - Pick JSON or XML from the `Accept` header
//! - Render documents in the chosen representation
//! - Map service errors to status codes
//!
//! # Design Decisions
//! - No `Accept` (or an unreadable one) means JSON
//! - q-values are honoured; on a tie the first listed media range wins
//! - An `Accept` admitting neither representation is answered with 406
//! - Registry rejections are all 400; collaborator failures are 500

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::service::ServiceError;

/// Body representation negotiated from `Accept`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    Json,
    Xml,
}

impl Representation {
    pub fn content_type(self) -> &'static str {
        match self {
            Representation::Json => "application/json",
            Representation::Xml => "application/xml",
        }
    }

    /// Media types served for this representation.
    fn media_types(self) -> &'static [&'static str] {
        match self {
            Representation::Json => &["application/json"],
            Representation::Xml => &["application/xml", "text/xml"],
        }
    }

    /// Negotiate from request headers; `None` if nothing acceptable.
    ///
    /// Each representation takes the quality of the most specific range that
    /// matches one of its media types, so `application/json;q=0, */*` refuses
    /// JSON but still admits XML.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let accept = match headers.get(header::ACCEPT).map(|v| v.to_str()) {
            Some(Ok(value)) if !value.trim().is_empty() => value,
            _ => return Some(Representation::Json),
        };
        let ranges: Vec<MediaRange> = accept.split(',').filter_map(MediaRange::parse).collect();

        let mut best: Option<(Representation, f32, usize)> = None;
        for representation in [Representation::Json, Representation::Xml] {
            let Some((quality, position)) = representation
                .media_types()
                .iter()
                .filter_map(|media| MediaRange::preferred(&ranges, media))
                .max_by(|a, b| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1)))
            else {
                continue;
            };
            if quality <= 0.0 {
                continue;
            }
            let better = best.map_or(true, |(_, q, p)| {
                quality > q || (quality == q && position < p)
            });
            if better {
                best = Some((representation, quality, position));
            }
        }
        best.map(|(representation, _, _)| representation)
    }
}

/// One entry of an `Accept` header.
struct MediaRange {
    media: String,
    quality: f32,
}

impl MediaRange {
    fn parse(range: &str) -> Option<Self> {
        let mut params = range.split(';');
        let media = params.next()?.trim().to_ascii_lowercase();
        if media.is_empty() {
            return None;
        }
        let quality = params
            .filter_map(|p| p.trim().strip_prefix("q="))
            .find_map(|q| q.trim().parse::<f32>().ok())
            .unwrap_or(1.0);
        Some(Self { media, quality })
    }

    /// 2 for an exact match, 1 for `type/*`, 0 for `*/*`.
    fn specificity(&self, media: &str) -> Option<u8> {
        if self.media == media {
            return Some(2);
        }
        if self.media == "*/*" {
            return Some(0);
        }
        let (kind, _) = media.split_once('/')?;
        match self.media.strip_suffix("/*") {
            Some(k) if k == kind => Some(1),
            _ => None,
        }
    }

    /// Quality and position of the most specific range matching `media`.
    fn preferred(ranges: &[MediaRange], media: &str) -> Option<(f32, usize)> {
        let mut found: Option<(u8, f32, usize)> = None;
        for (position, range) in ranges.iter().enumerate() {
            if let Some(specificity) = range.specificity(media) {
                if found.map_or(true, |(s, _, _)| specificity > s) {
                    found = Some((specificity, range.quality, position));
                }
            }
        }
        found.map(|(_, quality, position)| (quality, position))
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Representation {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Representation::from_headers(&parts.headers).ok_or((
            StatusCode::NOT_ACCEPTABLE,
            "Supported representations: application/json, application/xml",
        ))
    }
}

/// A document that can be rendered as JSON or XML.
///
/// The XML form defaults to the serde shape with the type's serde name as the
/// root element; override `to_xml` when the JSON shape has no XML equivalent.
pub trait Document: Serialize {
    fn to_xml(&self) -> Result<String, String> {
        quick_xml::se::to_string(self).map_err(|e| e.to_string())
    }
}

/// A document paired with the representation it should be sent in.
pub struct Negotiated<T> {
    pub representation: Representation,
    pub document: T,
}

impl<T> Negotiated<T> {
    pub fn new(representation: Representation, document: T) -> Self {
        Self {
            representation,
            document,
        }
    }
}

impl<T: Document> IntoResponse for Negotiated<T> {
    fn into_response(self) -> Response {
        let rendered = match self.representation {
            Representation::Json => serde_json::to_string(&self.document).map_err(|e| e.to_string()),
            Representation::Xml => self.document.to_xml(),
        };

        match rendered {
            Ok(body) => (
                [(header::CONTENT_TYPE, self.representation.content_type())],
                body,
            )
                .into_response(),
            Err(e) => {
                tracing::error!(error = %e, representation = ?self.representation, "Failed to render response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Registry(e) => (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
            ServiceError::Store(_) | ServiceError::Reload(_) | ServiceError::Task(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn negotiate(accept: Option<&'static str>) -> Option<Representation> {
        let mut headers = HeaderMap::new();
        if let Some(value) = accept {
            headers.insert(header::ACCEPT, HeaderValue::from_static(value));
        }
        Representation::from_headers(&headers)
    }

    #[test]
    fn test_defaults_to_json() {
        assert_eq!(negotiate(None), Some(Representation::Json));
        assert_eq!(negotiate(Some("*/*")), Some(Representation::Json));
        assert_eq!(negotiate(Some("application/json")), Some(Representation::Json));
    }

    #[test]
    fn test_xml_media_types() {
        assert_eq!(negotiate(Some("application/xml")), Some(Representation::Xml));
        assert_eq!(negotiate(Some("text/xml")), Some(Representation::Xml));
        assert_eq!(
            negotiate(Some("application/xml, */*;q=0.1")),
            Some(Representation::Xml)
        );
    }

    #[test]
    fn test_quality_values() {
        assert_eq!(
            negotiate(Some("application/json;q=0.5, application/xml;q=0.9")),
            Some(Representation::Xml)
        );
        assert_eq!(
            negotiate(Some("application/xml;q=0, application/json")),
            Some(Representation::Json)
        );
        // Tie: first listed wins.
        assert_eq!(
            negotiate(Some("text/xml, application/json")),
            Some(Representation::Xml)
        );
    }

    #[test]
    fn test_wildcards_respect_explicit_refusals() {
        assert_eq!(
            negotiate(Some("application/json;q=0, */*")),
            Some(Representation::Xml)
        );
        assert_eq!(
            negotiate(Some("application/json;q=0, application/xml;q=0.1, */*")),
            Some(Representation::Xml)
        );
        assert_eq!(
            negotiate(Some("application/xml;q=0, text/xml;q=0, application/*")),
            Some(Representation::Json)
        );
        assert_eq!(negotiate(Some("text/*")), Some(Representation::Xml));
        assert_eq!(negotiate(Some("application/*")), Some(Representation::Json));
    }

    #[test]
    fn test_nothing_acceptable() {
        assert_eq!(
            negotiate(Some("application/json;q=0, application/xml;q=0, text/xml;q=0, */*")),
            None
        );
        assert_eq!(negotiate(Some("text/html")), None);
        assert_eq!(negotiate(Some("application/json;q=0")), None);
    }
}
