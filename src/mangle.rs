// src/mangle.rs
// =============================================================================
// This module turns a file name into the names its backup copies usually have.
//
// Editors and admins leave these lying around on web servers:
// - .index.php.swp   (vim swap file)
// - index.php~       (emacs / gedit backup)
// - index.php.bak    (manual backup)
// - index.php.orig   (patch / merge leftovers)
//
// Fetching one of these often returns the raw source of a script that the
// server would normally execute.
//
// Rust concepts:
// - const arrays: A fixed rule table known at compile time
// - Iterators + map + collect: Build a Vec from the rule table
// =============================================================================

// One entry per backup style: a (prefix, suffix) pair wrapped around the base name.
const MANGLE_RULES: [(&str, &str); 4] = [
    (".", ".swp"), // vim swap file
    ("", "~"),     // backup file
    ("", ".bak"),  // backup file
    ("", ".orig"), // backup file
];

// Mangles a base name into every candidate backup name
//
// Parameters:
//   basename: the last path segment of a URL (may be empty)
//
// Returns: one candidate per rule, always in rule order
//
// Example:
//   mangle("config") -> [".config.swp", "config~", "config.bak", "config.orig"]
pub fn mangle(basename: &str) -> Vec<String> {
    MANGLE_RULES
        .iter()
        .map(|(prefix, suffix)| format!("{}{}{}", prefix, basename, suffix))
        .collect()
}
