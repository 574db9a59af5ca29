use rpc_rest_macros::ProcedureError;

#[derive(ProcedureError)]
#[procedure_error(code = "GENERIC", status = 500)]
struct Foo<T> {
    reason: T,
}

impl<T: std::fmt::Display> std::fmt::Display for Foo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason)
    }
}

fn main() {}
