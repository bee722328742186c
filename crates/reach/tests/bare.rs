// tests/bare.rs
//! Bare lambda types: their single method is reached with the type.

mod common;

#[test]
fn bare_lambda_method_is_reached_with_its_type() {
    let graph = common::bare_callback().run();

    let callback = graph.type_id("Callback").unwrap();
    let bare = graph.ty(callback).bare_method.unwrap();
    let method = graph.method(bare);
    assert_eq!(method.owner, callback);
    assert_eq!(method.name, "apply_val");
    assert_eq!(method.mangled_name, "Callback_apply_val");
    assert!(method.is_resolved());
    assert_eq!(method.vtable_index, None);
    assert_eq!(method.params.len(), 1);
    assert_eq!(method.result, graph.type_id("U8"));
}

#[test]
fn primitives_with_several_bare_methods_have_none_selected() {
    let graph = common::bare_callback().run();

    let ffi = graph.type_id("Ffi").unwrap();
    assert_eq!(graph.ty(ffi).bare_method, None);
    assert!(graph.method_name(ffi, "open").is_none());
}

#[test]
fn dump_names_the_bare_method() {
    let dump = common::bare_callback().run().dump();
    assert!(dump.contains("  bare: Callback_apply_val"));
}
