// src/rule.rs

//! Rendering of dependency rules as GNU make text

use crate::report::DependencyRule;
use serde::{Deserialize, Serialize};

/// Line layout of an emitted rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RuleLayout {
    /// `target: a b c`
    #[default]
    SingleLine,
    /// One prerequisite per line, joined with backslash continuations
    Continued,
}

/// Escape a path for use as a make target or prerequisite
///
/// Wildcard characters are escaped too, so make never globs a packaged path.
/// A `]` is only special after a `[` and is left alone.
pub fn escape_make_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        match c {
            ' ' => escaped.push_str("\\ "),
            ':' => escaped.push_str("\\:"),
            '#' => escaped.push_str("\\#"),
            '$' => escaped.push_str("$$"),
            '*' | '?' | '[' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Renders [`DependencyRule`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEmitter {
    pub layout: RuleLayout,
    /// Also emit an empty rule per prerequisite, so deleting a source file
    /// does not break the build
    pub empty_recipes: bool,
}

impl RuleEmitter {
    pub fn new(layout: RuleLayout, empty_recipes: bool) -> Self {
        Self {
            layout,
            empty_recipes,
        }
    }

    pub fn emit(&self, rule: &DependencyRule) -> String {
        let target = escape_make_path(&rule.target);
        let prerequisites: Vec<String> = rule
            .prerequisites
            .iter()
            .map(|p| escape_make_path(p))
            .collect();

        let mut out = format!("{}:", target);
        match self.layout {
            RuleLayout::SingleLine => {
                for p in &prerequisites {
                    out.push(' ');
                    out.push_str(p);
                }
            }
            RuleLayout::Continued => {
                for p in &prerequisites {
                    out.push_str(" \\\n\t");
                    out.push_str(p);
                }
            }
        }
        out.push('\n');

        if self.empty_recipes && !prerequisites.is_empty() {
            out.push('\n');
            for p in &prerequisites {
                out.push_str(p);
                out.push_str(":\n");
            }
        }

        out
    }
}
