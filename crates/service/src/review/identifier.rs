use std::fmt;

use crate::catalog::domain::SubService;

/// A sub-service identifier as carried by carts, enquiry items and reviews.
///
/// Two shapes exist in stored data: the composite `{serviceId}-{index}` and
/// the persistent sub-service id. Parsing happens once; every later step
/// works on the typed value and keeps the raw string for exact matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubServiceRef {
    ByIndex { service_id: String, index: usize, raw: String },
    ById(String),
}

impl SubServiceRef {
    /// Parse a raw identifier.
    ///
    /// # Examples
    /// ```
    /// use service::review::SubServiceRef;
    /// let r = SubServiceRef::parse("svc1-2");
    /// assert!(matches!(r, SubServiceRef::ByIndex { index: 2, .. }));
    /// assert!(matches!(SubServiceRef::parse("abc"), SubServiceRef::ById(_)));
    /// ```
    pub fn parse(raw: &str) -> Self {
        if let Some((prefix, suffix)) = raw.rsplit_once('-') {
            // 只接受纯数字后缀，"+1" 之类不算
            if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) {
                if let Ok(index) = suffix.parse::<usize>() {
                    return SubServiceRef::ByIndex {
                        service_id: prefix.to_string(),
                        index,
                        raw: raw.to_string(),
                    };
                }
            }
        }
        SubServiceRef::ById(raw.to_string())
    }

    /// The identifier exactly as submitted.
    pub fn raw(&self) -> &str {
        match self {
            SubServiceRef::ByIndex { raw, .. } => raw,
            SubServiceRef::ById(raw) => raw,
        }
    }

    /// Position of the referenced entry in `subs`.
    ///
    /// An in-bounds index wins; otherwise the raw string is compared with
    /// each persistent id. The service-id prefix of a composite identifier
    /// is not checked against the owning service.
    pub fn resolve(&self, subs: &[SubService]) -> Option<usize> {
        if let SubServiceRef::ByIndex { index, .. } = self {
            if *index < subs.len() {
                return Some(*index);
            }
        }
        let raw = self.raw();
        subs.iter().position(|s| s.id.to_string() == raw)
    }
}

impl fmt::Display for SubServiceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.raw()) }
}
