use rpc_rest_macros::ProcedureError;

#[derive(ProcedureError)]
#[procedure_error(inner)]
struct Outer {
    reason: String,
}

fn main() {}
