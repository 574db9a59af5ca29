use rpc_rest::error::ProcedureFailure;
use rpc_rest_macros::ProcedureError;

#[derive(ProcedureError)]
#[procedure_error(code = "DIVIDE_BY_ZERO", status = 400)]
struct DivideByZero {
    reason: String,
}
impl std::fmt::Display for DivideByZero {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

#[test]
fn struct_with_code_and_status() {
    let err = DivideByZero { reason: "nope".to_owned() };
    let failure: ProcedureFailure = err.into();
    assert_eq!(failure.code, "DIVIDE_BY_ZERO");
    assert_eq!(failure.status, 400);
    assert_eq!(failure.message, "nope");
}

#[derive(ProcedureError)]
#[procedure_error(code = "INTERNAL")]
struct DefaultsTo500 {
    reason: String,
}
impl std::fmt::Display for DefaultsTo500 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

#[test]
fn status_defaults_to_500_when_omitted() {
    let err = DefaultsTo500 { reason: "boom".to_owned() };
    let failure: ProcedureFailure = err.into();
    assert_eq!(failure.code, "INTERNAL");
    assert_eq!(failure.status, 500);
}

#[derive(ProcedureError)]
#[procedure_error(code = "WRAPPED", status = 418)]
struct Inner {
    reason: String,
}
impl std::fmt::Display for Inner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

#[derive(ProcedureError)]
#[procedure_error(inner)]
struct Outer(Inner);

#[test]
fn inner_delegates_to_the_wrapped_error() {
    let err = Outer(Inner { reason: "teapot".to_owned() });
    let failure: ProcedureFailure = err.into();
    assert_eq!(failure.code, "WRAPPED");
    assert_eq!(failure.status, 418);
    assert_eq!(failure.message, "teapot");
}

#[derive(ProcedureError)]
#[procedure_error(code = "MATHS_ERROR", status = 400)]
enum MathsError {
    DivideByZero,
    #[procedure_error(code = "OVERFLOW", status = 413)]
    Overflow { by: u64 },
    #[procedure_error(inner)]
    Wrapped(Inner),
}
impl std::fmt::Display for MathsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathsError::DivideByZero => write!(f, "division by zero"),
            MathsError::Overflow { by } => write!(f, "overflowed by {}", by),
            MathsError::Wrapped(..) => write!(f, "wrapped"),
        }
    }
}

#[test]
fn enum_variant_inherits_top_level_attrs() {
    let failure: ProcedureFailure = MathsError::DivideByZero.into();
    assert_eq!(failure.code, "MATHS_ERROR");
    assert_eq!(failure.status, 400);
    assert_eq!(failure.message, "division by zero");
}

#[test]
fn enum_variant_overrides_top_level_attrs() {
    let failure: ProcedureFailure = MathsError::Overflow { by: 7 }.into();
    assert_eq!(failure.code, "OVERFLOW");
    assert_eq!(failure.status, 413);
    assert_eq!(failure.message, "overflowed by 7");
}

#[test]
fn enum_variant_can_delegate_to_an_inner_error() {
    let failure: ProcedureFailure = MathsError::Wrapped(Inner { reason: "nested".to_owned() }).into();
    assert_eq!(failure.code, "WRAPPED");
    assert_eq!(failure.status, 418);
    assert_eq!(failure.message, "nested");
}
