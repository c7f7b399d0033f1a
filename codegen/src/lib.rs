use proc_macro::TokenStream;

mod node_schema;
mod util;

#[proc_macro_derive(NodeSchema, attributes(nodec))]
pub fn node_schema(input: TokenStream) -> TokenStream {
    node_schema::derive(input.into()).unwrap_or_else(|err| err.to_compile_error()).into()
}
