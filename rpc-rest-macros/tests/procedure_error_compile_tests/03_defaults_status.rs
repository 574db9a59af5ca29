// PASS

use rpc_rest_macros::ProcedureError;

#[derive(ProcedureError)]
#[procedure_error(code = "INTERNAL")]
struct Foo {
    reason: String,
}

impl std::fmt::Display for Foo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

fn main() {}
