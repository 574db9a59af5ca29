use rpc_rest_macros::ProcedureError;

#[derive(ProcedureError)]
#[procedure_error(inner)]
struct Outer(String, u32);

fn main() {}
