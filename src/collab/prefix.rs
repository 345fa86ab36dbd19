// src/collab/prefix.rs

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Adds vendor-prefixed copies of declarations browsers still need.
pub trait Prefixer: Send + Sync + fmt::Debug {
    fn prefix(&self, css: &str) -> String;
}

/// Properties that still need vendor prefixes, and which ones.
const PREFIX_TABLE: &[(&str, &[&str])] = &[
    ("appearance", &["-webkit-", "-moz-"]),
    ("backdrop-filter", &["-webkit-"]),
    ("box-decoration-break", &["-webkit-"]),
    ("hyphens", &["-webkit-", "-ms-"]),
    ("mask-image", &["-webkit-"]),
    ("tab-size", &["-moz-"]),
    ("text-size-adjust", &["-webkit-", "-moz-", "-ms-"]),
    ("user-select", &["-webkit-", "-moz-", "-ms-"]),
];

static DECLARATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?P<prop>[a-z][a-z-]*)[ \t]*:[ \t]*(?P<value>[^;{}]+);[ \t]*$")
        .expect("Error compiling declaration pattern")
});

/// Table-driven prefixer for expanded CSS (one declaration per line, as the
/// stylesheet compiler emits it).
///
/// Prefixed copies go right before the standard declaration. A prefix that
/// is already declared earlier in the same block is not added again, so
/// running the prefixer twice changes nothing.
#[derive(Debug, Clone, Default)]
pub struct VendorPrefixer;

impl VendorPrefixer {
    pub fn new() -> Self {
        Self
    }

    fn prefixes_for(prop: &str) -> Option<&'static [&'static str]> {
        PREFIX_TABLE
            .iter()
            .find(|(name, _)| *name == prop)
            .map(|(_, prefixes)| *prefixes)
    }
}

impl Prefixer for VendorPrefixer {
    fn prefix(&self, css: &str) -> String {
        let mut out: Vec<String> = Vec::new();
        let mut block_start = 0;

        for line in css.lines() {
            if let Some(caps) = DECLARATION.captures(line) {
                let prop = &caps["prop"];
                if let Some(prefixes) = Self::prefixes_for(prop) {
                    for prefix in prefixes {
                        let prefixed = format!("{prefix}{prop}");
                        if !out[block_start..].iter().any(|l| declares(l, &prefixed)) {
                            out.push(format!(
                                "{}{}: {};",
                                &caps["indent"],
                                prefixed,
                                caps["value"].trim()
                            ));
                        }
                    }
                }
                out.push(line.to_string());
            } else {
                out.push(line.to_string());
                if line.contains('{') || line.contains('}') {
                    block_start = out.len();
                }
            }
        }

        let mut result = out.join("\n");
        if css.ends_with('\n') {
            result.push('\n');
        }
        result
    }
}

fn declares(line: &str, prop: &str) -> bool {
    line.trim_start()
        .strip_prefix(prop)
        .is_some_and(|rest| rest.trim_start().starts_with(':'))
}
