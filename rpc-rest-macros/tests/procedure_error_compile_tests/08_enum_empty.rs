use rpc_rest_macros::ProcedureError;

#[derive(ProcedureError)]
#[procedure_error(code = "EMPTY", status = 500)]
enum Foo {}

fn main() {}
