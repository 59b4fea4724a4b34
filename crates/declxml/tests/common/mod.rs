//! Shared helpers for declxml integration tests.

#![allow(dead_code)]

/// Collapse an indented XML literal to the compact form the serializer emits.
pub fn strip_xml(xml: &str) -> String {
    xml.lines().map(str::trim).collect::<Vec<_>>().concat()
}
