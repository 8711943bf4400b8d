//! Structural checks for a project's DIFFLENS.md.
//!
//! The capture prompt leans on specific sections being present; missing
//! ones either block the run (errors) or degrade it (warnings).

/// A required or recommended section and the message shown when absent.
/// Any one of the markers satisfies the check, so both the plain and the
/// bold spellings of a field label count.
struct DocCheck {
    markers: &'static [&'static str],
    message: &'static str,
}

const REQUIRED: &[DocCheck] = &[
    DocCheck {
        markers: &["## Development Server"],
        message: "missing '## Development Server' section",
    },
    DocCheck {
        markers: &["Command:", "**Command**:"],
        message: "missing 'Command:' line (how to start the dev server)",
    },
    DocCheck {
        markers: &["URL:", "**URL**:"],
        message: "missing 'URL:' line (where the app is served)",
    },
];

const RECOMMENDED: &[DocCheck] = &[
    DocCheck {
        markers: &["## Screenshot Settings"],
        message: "no '## Screenshot Settings' section; defaults will be used",
    },
    DocCheck {
        markers: &["### Viewports"],
        message: "no '### Viewports' subsection; only the default viewport is captured",
    },
    DocCheck {
        markers: &["### Themes"],
        message: "no '### Themes' subsection; only the default theme is captured",
    },
];

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn validate_config_doc(doc: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    for check in REQUIRED {
        if !check.markers.iter().any(|m| doc.contains(m)) {
            report.errors.push(check.message.to_string());
        }
    }
    for check in RECOMMENDED {
        if !check.markers.iter().any(|m| doc.contains(m)) {
            report.warnings.push(check.message.to_string());
        }
    }
    if !doc.contains("localhost") && !doc.contains("127.0.0.1") {
        report
            .warnings
            .push("dev server URL does not look local; captures may hit a deployed site".to_string());
    }
    report
}
