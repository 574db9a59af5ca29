use rpc_rest_macros::ProcedureError;

#[derive(ProcedureError)]
#[procedure_error(inner)]
enum Foo {
    Bar(String),
}

fn main() {}
