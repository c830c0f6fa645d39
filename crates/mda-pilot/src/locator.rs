//! Element location capability.
//!
//! The page object never talks to a browser directly. It goes through
//! [`ElementLocator`] (page-level queries) and [`UiElement`] (queries and
//! actions scoped to one element), so the same code drives a live page or
//! the in-memory [`FakeGrid`](crate::FakeGrid).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::result::{PilotError, PilotResult};

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath(String),
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Element tag name (e.g., "button")
    TagName(String),
}

impl Selector {
    /// Create an XPath selector
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a tag-name selector
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self::TagName(name.into())
    }

    /// Selector as a CSS query, if it has one
    #[must_use]
    pub fn as_css(&self) -> Option<&str> {
        match self {
            Self::Css(s) | Self::TagName(s) => Some(s),
            Self::XPath(_) => None,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Css(s) => write!(f, "css={s}"),
            Self::TagName(s) => write!(f, "tag={s}"),
        }
    }
}

/// How a visible label is compared against a wanted name.
///
/// Both modes ignore case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Whole label equals the name
    Equals,
    /// Label contains the name
    Contains,
}

impl NameMatch {
    /// Check a label against a wanted name
    #[must_use]
    pub fn matches(self, label: &str, wanted: &str) -> bool {
        match self {
            Self::Equals => label.to_lowercase() == wanted.to_lowercase(),
            Self::Contains => contains_ignore_case(label, wanted),
        }
    }
}

/// Case-insensitive substring test
#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// A located element on the page
pub trait UiElement: Sized {
    /// Rendered text of the element
    fn text(&self) -> PilotResult<String>;

    /// Attribute value, `None` when the attribute is absent
    fn attribute(&self, name: &str) -> PilotResult<Option<String>>;

    /// Click the element
    fn click(&self) -> PilotResult<()>;

    /// All descendants matching the selector
    fn find_all(&self, selector: &Selector) -> PilotResult<Vec<Self>>;

    /// First descendant matching the selector
    fn find(&self, selector: &Selector) -> PilotResult<Self> {
        self.find_all(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| PilotError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

/// Page-level element queries
pub trait ElementLocator {
    /// Element handle type produced by this locator
    type Element: UiElement;

    /// All elements matching the selector
    fn find_all(&self, selector: &Selector) -> PilotResult<Vec<Self::Element>>;

    /// First element matching the selector
    fn find(&self, selector: &Selector) -> PilotResult<Self::Element> {
        self.find_all(selector)?
            .into_iter()
            .next()
            .ok_or_else(|| PilotError::ElementNotFound {
                selector: selector.to_string(),
            })
    }
}

/// First element whose text matches `wanted`.
///
/// Elements whose text cannot be read are skipped.
pub fn find_by_text<E: UiElement>(elements: Vec<E>, wanted: &str, mode: NameMatch) -> Option<E> {
    elements.into_iter().find(|e| {
        e.text()
            .map(|label| mode.matches(&label, wanted))
            .unwrap_or(false)
    })
}

/// Read an `aria-disabled` style flag.
///
/// Absent or unparsable values count as not disabled.
pub fn is_flag_set<E: UiElement>(element: &E, attribute: &str) -> PilotResult<bool> {
    Ok(element
        .attribute(attribute)?
        .map(|v| v.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false))
}
