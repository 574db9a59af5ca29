use rpc_rest_macros::ProcedureError;

#[derive(ProcedureError)]
#[procedure_error(inner, code = "NOT_ALLOWED")]
struct Outer(String);

fn main() {}
