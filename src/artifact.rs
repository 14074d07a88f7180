//! Status page rewriting.
//!
//! The published page is treated as opaque text with three anchor regions,
//! each located by the markup around it:
//!
//! ```text
//! <body class="status-on">                        status marker
//! <div class="date">Sunday, March 8, 2026</div>   target date
//! <strong>Last updated:</strong> March 4, 2026    footer
//! ```
//!
//! Every anchor must match exactly once. Anything outside the anchors is
//! passed through untouched, so applying the same update twice is a no-op.

use std::{fmt, sync::OnceLock};

use jiff::civil::Date;
use regex::{NoExpand, Regex};

use crate::schedule;

fn status_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<body class="status-(?:on|off)">"#).expect("regex for status marker")
    })
}

fn date_display() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"<div class="date">.*?</div>"#).expect("regex for date display")
    })
}

fn last_updated() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<strong>Last updated:</strong>\s+[A-Za-z]+\s+\d+,\s+\d+")
            .expect("regex for last-updated footer")
    })
}

/// One of the addressable regions of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    StatusMarker,
    DateDisplay,
    LastUpdated,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::StatusMarker => "status marker (<body class=\"status-on|off\">)",
            Self::DateDisplay => "date display (<div class=\"date\">)",
            Self::LastUpdated => "last-updated footer (<strong>Last updated:</strong>)",
        })
    }
}

/// The page no longer has the shape the rewriter expects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact is missing the {0}")]
    Missing(Anchor),

    #[error("artifact has {count} matches for the {anchor}, expected exactly one")]
    Ambiguous { anchor: Anchor, count: usize },
}

/// What to write into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactUpdate {
    pub status: bool,
    pub target_date: Date,
    pub updated_date: Date,
}

/// Rewrite the three anchor regions of `text` and return the new page.
///
/// `text` itself is never modified; on error the caller still holds the
/// original.
pub fn apply(text: &str, update: &ArtifactUpdate) -> Result<String, ArtifactError> {
    let status_class = if update.status { "status-on" } else { "status-off" };
    let marker = format!(r#"<body class="{status_class}">"#);
    let date = format!(
        r#"<div class="date">{}</div>"#,
        schedule::long_form(update.target_date)
    );
    let footer = format!(
        "<strong>Last updated:</strong> {}",
        schedule::medium_form(update.updated_date)
    );

    let text = replace_once(text, status_marker(), Anchor::StatusMarker, &marker)?;
    let text = replace_once(&text, date_display(), Anchor::DateDisplay, &date)?;
    replace_once(&text, last_updated(), Anchor::LastUpdated, &footer)
}

/// Replace the single match of `pattern`, refusing zero or several.
fn replace_once(
    text: &str,
    pattern: &Regex,
    anchor: Anchor,
    replacement: &str,
) -> Result<String, ArtifactError> {
    match pattern.find_iter(text).count() {
        0 => Err(ArtifactError::Missing(anchor)),
        1 => Ok(pattern.replace(text, NoExpand(replacement)).into_owned()),
        count => Err(ArtifactError::Ambiguous { anchor, count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Sunday Coffee</title></head>
<body class="status-off">
  <main>
    <h1>Coffee this Sunday?</h1>
    <div class="date">Sunday, February 22, 2026</div>
    <p class="hours">9:00 AM – 11:00 AM</p>
  </main>
  <footer><strong>Last updated:</strong> February 18, 2026</footer>
</body>
</html>
"#;

    fn update(status: bool) -> ArtifactUpdate {
        ArtifactUpdate {
            status,
            target_date: date(2026, 3, 8),
            updated_date: date(2026, 3, 4),
        }
    }

    #[test]
    fn rewrites_all_three_regions() {
        let out = apply(PAGE, &update(true)).unwrap();
        assert!(out.contains(r#"<body class="status-on">"#));
        assert!(!out.contains("status-off"));
        assert!(out.contains(r#"<div class="date">Sunday, March 8, 2026</div>"#));
        assert!(out.contains("<strong>Last updated:</strong> March 4, 2026</footer>"));
        assert!(out.contains(r#"<p class="hours">9:00 AM – 11:00 AM</p>"#));
    }

    #[test]
    fn second_application_is_a_fixed_point() {
        let once = apply(PAGE, &update(true)).unwrap();
        let twice = apply(&once, &update(true)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn toggling_status_only_touches_the_marker() {
        let on = apply(PAGE, &update(true)).unwrap();
        let off = apply(&on, &update(false)).unwrap();

        assert_eq!(
            on.replace(r#"<body class="status-on">"#, ""),
            off.replace(r#"<body class="status-off">"#, "")
        );
    }

    #[test]
    fn missing_status_marker_is_reported() {
        let page = PAGE.replace(r#"<body class="status-off">"#, "<body>");
        let before = page.clone();

        let err = apply(&page, &update(true)).unwrap_err();
        assert_eq!(err, ArtifactError::Missing(Anchor::StatusMarker));
        assert_eq!(page, before);
    }

    #[test]
    fn missing_footer_is_reported() {
        let page = PAGE.replace("Last updated:", "Updated:");
        let err = apply(&page, &update(false)).unwrap_err();
        assert_eq!(err, ArtifactError::Missing(Anchor::LastUpdated));
    }

    #[test]
    fn duplicate_date_display_is_ambiguous() {
        let page = PAGE.replace(
            "<p class=\"hours\">",
            "<div class=\"date\">again</div><p class=\"hours\">",
        );
        let err = apply(&page, &update(true)).unwrap_err();
        assert_eq!(
            err,
            ArtifactError::Ambiguous {
                anchor: Anchor::DateDisplay,
                count: 2
            }
        );
    }
}
