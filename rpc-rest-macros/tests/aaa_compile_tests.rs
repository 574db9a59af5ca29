#[test]
fn compile_tests() {
    let t = trybuild::TestCases::new();

    t.compile_fail("tests/procedure_error_compile_tests/01_missing_attrs.rs");
    t.pass("tests/procedure_error_compile_tests/02_basic.rs");
    t.pass("tests/procedure_error_compile_tests/03_defaults_status.rs");
    t.pass("tests/procedure_error_compile_tests/04_delegate_to_inner.rs");
    t.compile_fail("tests/procedure_error_compile_tests/05_inner_with_code_not_allowed.rs");

    t.pass("tests/procedure_error_compile_tests/06_enum_toplevel_attrs.rs");
    t.pass("tests/procedure_error_compile_tests/07_enum_variant_override.rs");
    t.compile_fail("tests/procedure_error_compile_tests/08_enum_empty.rs");
    t.compile_fail("tests/procedure_error_compile_tests/09_inner_bad_shape_named.rs");
    t.compile_fail("tests/procedure_error_compile_tests/10_inner_bad_shape_two_fields.rs");
    t.compile_fail("tests/procedure_error_compile_tests/11_generics_unsupported.rs");
    t.pass("tests/procedure_error_compile_tests/12_enum_variant_delegates_to_inner.rs");
    t.compile_fail("tests/procedure_error_compile_tests/13_top_level_inner_not_allowed_on_enum.rs");
}
