//! trybuild coverage for the diagnostics of the dynamic property macros.
//!
//! Each case misuses `#[dynamic_property_sources]` or
//! `#[dynamic_property_source]` and checks the reported compile error.

#[test]
fn macro_misuse_fails_to_compile() {
    let t = trybuild::TestCases::new();
    t.compile_fail("tests/ui/standalone_marker.rs");
    t.compile_fail("tests/ui/duplicate_extends.rs");
    t.compile_fail("tests/ui/unknown_argument.rs");
    t.compile_fail("tests/ui/trait_impl.rs");
    t.compile_fail("tests/ui/generic_impl.rs");
    t.compile_fail("tests/ui/async_source.rs");
}
