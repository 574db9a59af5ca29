// PASS

use rpc_rest_macros::ProcedureError;

#[derive(ProcedureError)]
#[procedure_error(code = "MATHS_ERROR", status = 400)]
enum Foo {
    DivideByZero,
    #[procedure_error(code = "OVERFLOW", status = 413)]
    Overflow { by: u64 },
}

impl std::fmt::Display for Foo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "err")
    }
}

fn main() {}
