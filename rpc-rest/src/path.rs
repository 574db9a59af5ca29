//! Compiles path templates like `/say-hello/{first}/{last}` into matchers
//! that extract named segment values from an incoming URL path.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;

/// A compiled path template.
pub struct PathMatcher {
    template: String,
    regex: Regex,
    param_names: Vec<String>,
    structure_key: String,
}

/// A path template failed to compile (duplicate placeholder name, missing
/// leading slash, or an unparseable regex).
#[derive(Debug)]
pub struct PathTemplateError(String);

impl fmt::Display for PathTemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid path template: {}", self.0)
    }
}
impl std::error::Error for PathTemplateError {}

impl PathMatcher {
    /// Compile a path template. `path` must begin with `/`; `{name}`
    /// segments become captures matching any non-empty run of non-`/`
    /// characters, and literal segments are matched case-insensitively.
    pub fn compile(path: &str) -> Result<PathMatcher, PathTemplateError> {
        if !path.starts_with('/') {
            return Err(PathTemplateError(format!(
                "path template {:?} must start with '/'",
                path
            )));
        }

        let mut pattern = String::from("^");
        let mut param_names: Vec<String> = Vec::new();
        let mut structure = String::new();

        for (i, segment) in path.split('/').enumerate() {
            if i > 0 {
                pattern.push('/');
                structure.push('/');
            }
            if is_placeholder(segment) {
                let name = &segment[1..segment.len() - 1];
                if name.is_empty() {
                    return Err(PathTemplateError(format!(
                        "empty placeholder name in template {:?}",
                        path
                    )));
                }
                if param_names.iter().any(|n| n == name) {
                    return Err(PathTemplateError(format!(
                        "duplicate path parameter {:?} in template {:?}",
                        name, path
                    )));
                }
                param_names.push(name.to_owned());
                pattern.push_str("([^/]+)");
                structure.push('*');
            } else {
                pattern.push_str(&regex::escape(segment));
                structure.push_str(&segment.to_lowercase());
            }
        }
        pattern.push('$');

        let regex = Regex::new(&format!("(?i){}", pattern))
            .map_err(|e| PathTemplateError(e.to_string()))?;

        Ok(PathMatcher {
            template: path.to_owned(),
            regex,
            param_names,
            structure_key: structure,
        })
    }

    /// The original template string, as declared.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The ordered placeholder names extracted at compile time.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// The case-insensitive "shape" of this template: segment count plus
    /// lowercased literal segments, with `*` standing in for each
    /// placeholder. Used as (half of) the route table's lookup key so that
    /// overlap detection and lookup don't depend on placeholder names
    ///.
    pub fn structure_key(&self) -> &str {
        &self.structure_key
    }

    /// Attempt to match `path` (e.g. `/say-hello/Lily/Rose`), returning the
    /// decoded placeholder values keyed by name, or `None` if the literal
    /// segments don't line up or a placeholder segment fails to URL-decode
    ///.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let caps = self.regex.captures(path)?;
        let mut out = HashMap::with_capacity(self.param_names.len());
        for (name, i) in self.param_names.iter().zip(1..) {
            let raw = caps.get(i)?.as_str();
            let decoded = percent_decode_segment(raw)?;
            out.insert(name.clone(), decoded);
        }
        Some(out)
    }
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

fn percent_decode_segment(segment: &str) -> Option<String> {
    percent_encoding::percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(|cow| cow.into_owned())
}
