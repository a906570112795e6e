//! Validation, installation and equality of the dynamic properties customizer.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use anyhow::{Context, Result, ensure};
use dynamic_props::{
    ArgumentError, ConfigurableContext, ContextCustomizer, DYNAMIC_PROPERTIES_SOURCE_NAME,
    DynamicPropertiesContextCustomizer, DynamicPropertyError, DynamicPropertyRegistry,
    MapPropertySource, MethodDescriptor, ParamType, PropertyResult, Receiver, TestClass,
    TestContext, dynamic_property_sources,
};
use figment::value::{Tag, Value};
use rstest::rstest;

struct DynamicPropertySourceTestCase;

#[dynamic_property_sources]
impl DynamicPropertySourceTestCase {
    #[expect(dead_code, reason = "rejected by validation before it could be called")]
    fn non_static(&self, _values: &mut dyn DynamicPropertyRegistry) {}

    #[expect(dead_code, reason = "rejected by validation before it could be called")]
    fn bad_args(_bad: String) {}

    fn blank_name(values: &mut dyn DynamicPropertyRegistry) -> PropertyResult<()> {
        values.add("   ", || "A")
    }

    fn empty_name(values: &mut dyn DynamicPropertyRegistry) {
        let _ignored = values.add("", || "A");
    }

    fn null_value_supplier(values: &mut dyn DynamicPropertyRegistry) -> PropertyResult<()> {
        values.add_supplier("name", None)
    }

    fn failing(values: &mut dyn DynamicPropertyRegistry) -> Result<(), std::io::Error> {
        let _recorded = values.add("before.failure", || "kept?");
        Err(std::io::Error::other("registry unavailable"))
    }

    fn valid1(values: &mut dyn DynamicPropertyRegistry) -> PropertyResult<()> {
        values.add("p1a", || "v1a")?;
        values.add("p1b", || "v1b")
    }

    fn valid2(values: &mut dyn DynamicPropertyRegistry) -> PropertyResult<()> {
        values.add("p2a", || "v2a")?;
        values.add("p2b", || "v2b")
    }
}

fn find_methods(names: &[&str]) -> Vec<MethodDescriptor> {
    DynamicPropertySourceTestCase::descriptor()
        .methods()
        .iter()
        .filter(|method| names.contains(&method.name()))
        .cloned()
        .collect()
}

fn customizer_for(names: &[&str]) -> PropertyResult<DynamicPropertiesContextCustomizer> {
    DynamicPropertiesContextCustomizer::new(find_methods(names))
}

fn hash_of(customizer: &DynamicPropertiesContextCustomizer) -> u64 {
    let mut hasher = DefaultHasher::new();
    customizer.hash(&mut hasher);
    hasher.finish()
}

#[rstest]
fn non_static_method_is_rejected() {
    let err = customizer_for(&["non_static"]).err();
    assert_eq!(
        err.map(|e| e.to_string()).as_deref(),
        Some("dynamic property source method 'non_static' must be static")
    );
}

#[rstest]
fn bad_signature_is_rejected() {
    let err = customizer_for(&["bad_args"]).err();
    assert_eq!(
        err.map(|e| e.to_string()).as_deref(),
        Some(
            "dynamic property source method 'bad_args' must accept a single \
             DynamicPropertyRegistry argument"
        )
    );
}

#[rstest]
fn registry_method_without_invoker_is_rejected() {
    let descriptor = MethodDescriptor::declared(
        "async_source",
        Receiver::Static,
        vec![ParamType::PropertyRegistry],
    )
    .marked();
    let err = DynamicPropertiesContextCustomizer::new([descriptor]).err();
    assert!(
        matches!(&err, Some(DynamicPropertyError::UninvocableMethod { method }) if method == "async_source"),
        "unexpected outcome: {err:?}"
    );
    assert_eq!(
        err.map(|e| e.to_string()).as_deref(),
        Some(
            "dynamic property source method 'async_source' must be a plain function, not async, \
             unsafe or generic"
        )
    );
}

#[rstest]
#[case::blank("blank_name", ArgumentError::BlankName)]
#[case::empty_and_ignored("empty_name", ArgumentError::BlankName)]
#[case::missing_supplier("null_value_supplier", ArgumentError::MissingSupplier)]
fn invalid_arguments_abort_customization(
    #[case] method: &str,
    #[case] expected: ArgumentError,
) -> Result<()> {
    let customizer = customizer_for(&["valid1", method])?;
    let mut context = TestContext::new();
    let err = customizer.customize_context(&mut context).err();
    ensure!(
        matches!(err, Some(DynamicPropertyError::InvalidArgument(found)) if found == expected),
        "unexpected outcome: {err:?}"
    );
    ensure!(context.environment().property_sources().is_empty());
    Ok(())
}

#[rstest]
fn method_failures_propagate_unchanged() -> Result<()> {
    let customizer = customizer_for(&["failing"])?;
    let mut context = TestContext::new();
    let err = customizer
        .customize_context(&mut context)
        .err()
        .context("customization should fail")?;
    ensure!(err.to_string() == "registry unavailable", "unexpected error: {err}");
    let source = err
        .as_user()
        .and_then(|user| user.downcast_ref::<std::io::Error>());
    ensure!(source.is_some_and(|io| io.kind() == std::io::ErrorKind::Other));
    ensure!(!context.environment().contains_property("before.failure"));
    Ok(())
}

#[rstest]
fn customize_context_adds_property_source() -> Result<()> {
    let customizer = customizer_for(&["valid1", "valid2"])?;
    let mut context = TestContext::new();
    customizer.customize_context(&mut context)?;

    let environment = context.environment();
    for (key, expected) in [("p1a", "v1a"), ("p1b", "v1b"), ("p2a", "v2a"), ("p2b", "v2b")] {
        let value = environment.required_property(key)?;
        ensure!(value.as_str() == Some(expected), "unexpected value for {key}");
    }
    let source = environment
        .property_sources()
        .get(DYNAMIC_PROPERTIES_SOURCE_NAME)
        .context("dynamic source missing")?;
    let names = source.property_names();
    ensure!(names == ["p1a", "p1b", "p2a", "p2b"], "unexpected names {names:?}");
    Ok(())
}

#[rstest]
fn dynamic_layer_takes_precedence_over_existing_layers() -> Result<()> {
    let mut context = TestContext::new();
    context
        .environment_mut()
        .property_sources_mut()
        .add_first(Box::new(MapPropertySource::new(
            "application",
            [
                ("p1a", Value::String(Tag::Default, String::from("static"))),
                ("only.static", Value::Bool(Tag::Default, true)),
            ],
        )));

    customizer_for(&["valid1"])?.customize_context(&mut context)?;
    customizer_for(&["valid1"])?.customize_context(&mut context)?;

    let environment = context.environment();
    let names = environment.property_sources().names();
    ensure!(
        names == [DYNAMIC_PROPERTIES_SOURCE_NAME, "application"],
        "unexpected layer order {names:?}"
    );
    ensure!(environment.required_property("p1a")?.as_str() == Some("v1a"));
    ensure!(environment.property_as::<bool>("only.static")? == Some(true));
    ensure!(environment.property("unregistered")?.is_none());
    Ok(())
}

#[rstest]
fn equality_and_hash_follow_the_method_set() -> Result<()> {
    let c1 = customizer_for(&["valid1", "valid2"])?;
    let mut reversed = find_methods(&["valid1", "valid2"]);
    reversed.reverse();
    let c2 = DynamicPropertiesContextCustomizer::new(reversed)?;
    let c3 = customizer_for(&["valid1"])?;

    ensure!(c1 == c1.clone());
    ensure!(c1 == c2, "method order should not matter");
    ensure!(hash_of(&c1) == hash_of(&c2));
    ensure!(c1 != c3);
    Ok(())
}
