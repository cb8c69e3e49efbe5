// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topic naming for hierarchical change notifications.

/// Topic name for `path` within `scope`: `"<scope>:<path>"`.
pub fn topic_name(scope: &str, path: &str) -> String {
    format!("{scope}:{path}")
}

/// Every topic a change at `path` is announced on.
///
/// The exact path first, then each ancestor directory with a `/*`
/// wildcard suffix, nearest first:
///
/// ```text
/// change_topics("S", "/a/b/c") == ["S:/a/b/c", "S:/a/b/*", "S:/a/*", "S:/*"]
/// ```
///
/// Paths are normalized: a missing leading slash is added, empty
/// segments and trailing slashes are dropped. The root path `/` has no
/// ancestors.
pub fn change_topics(scope: &str, path: &str) -> Vec<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut topics = Vec::with_capacity(segments.len() + 1);
    topics.push(topic_name(scope, &format!("/{}", segments.join("/"))));
    for depth in (0..segments.len()).rev() {
        let ancestor = segments[..depth].join("/");
        let wildcard = if ancestor.is_empty() {
            "/*".to_string()
        } else {
            format!("/{ancestor}/*")
        };
        topics.push(topic_name(scope, &wildcard));
    }
    topics
}

#[cfg(test)]
#[path = "topic_tests.rs"]
mod tests;
