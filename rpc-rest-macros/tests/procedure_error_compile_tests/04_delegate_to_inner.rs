// PASS

use rpc_rest_macros::ProcedureError;

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

fn main() {}
