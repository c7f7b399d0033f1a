use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, Result};

use crate::util;

const INPUT_TYPE_ERROR: &str = "NodeSchema can only be derived from structs";

pub(crate) fn derive(input: TokenStream) -> Result<TokenStream> {
    let input: syn::DeriveInput = syn::parse2(input)?;

    let generics = util::parse_generics(&input);

    let mut crate_name = None;
    let mut schema_name = None;

    for attr in &input.attrs {
        if attr.path().is_ident("nodec") {
            let attr: Attr<ItemOpt> = attr.parse_args()?;
            for opt in attr.options {
                match opt {
                    ItemOpt::NodecAs(name, _) if crate_name.is_some() => {
                        return Err(Error::new_spanned(
                            name,
                            "`nodec_as` can only be specified once",
                        ));
                    }
                    ItemOpt::NodecAs(_, path) => crate_name = Some(path),
                    ItemOpt::Name(name, ..) if schema_name.is_some() => {
                        return Err(Error::new_spanned(name, "`name` can only be specified once"));
                    }
                    ItemOpt::Name(_, lit) => schema_name = Some(lit.value()),
                }
            }
        }
    }

    let crate_name = crate_name.unwrap_or_else(|| quote!(::nodec));
    let schema_name = schema_name.unwrap_or_else(|| input.ident.to_string());

    let fields = match &input.data {
        syn::Data::Struct(item) => &item.fields,
        syn::Data::Enum(item) => {
            return Err(Error::new_spanned(item.enum_token, INPUT_TYPE_ERROR))
        }
        syn::Data::Union(item) => {
            return Err(Error::new_spanned(item.union_token, INPUT_TYPE_ERROR))
        }
    };

    let mut inserts = Vec::new();
    let mut field_names = HashSet::new();
    for (ord, field) in fields.iter().enumerate() {
        let mut rename = None;
        for attr in &field.attrs {
            if attr.path().is_ident("nodec") {
                let attr: Attr<FieldOpt> = attr.parse_args()?;
                for opt in attr.options {
                    match opt {
                        FieldOpt::Rename(name, ..) if rename.is_some() => {
                            return Err(Error::new_spanned(
                                name,
                                "`rename` can only be specified once",
                            ));
                        }
                        FieldOpt::Rename(_, lit) => rename = Some(lit.value()),
                    }
                }
            }
        }

        let (accessor, default_name) = match &field.ident {
            Some(ident) => (quote!(#ident), ident.to_string()),
            None => {
                let index = syn::Index::from(ord);
                (quote!(#index), ord.to_string())
            }
        };
        let field_name = rename.unwrap_or(default_name);
        if !field_names.insert(field_name.clone()) {
            return Err(Error::new_spanned(
                field,
                format!("Duplicate node schema field name `{}`", field_name),
            ));
        }

        inserts.push(quote! {
            schema.insert(
                #field_name,
                ::std::clone::Clone::clone(#crate_name::comp::ComponentType::id(&self.#accessor)),
            );
        });
    }

    let body = quote! {
        const NAME: &'static str = #schema_name;

        fn node_schema(&self) -> #crate_name::node::NodeSchema {
            let mut schema = #crate_name::node::NodeSchema::default();
            #(#inserts)*
            schema
        }
    };

    let output = generics.impl_trait(quote!(#crate_name::node::Schema), body);

    Ok(quote! {
        #[automatically_derived]
        #output
    })
}

struct Attr<T> {
    options: Punctuated<T, syn::Token![,]>,
}

impl<T: Parse> Parse for Attr<T> {
    fn parse(input: ParseStream) -> Result<Self> {
        Ok(Attr { options: Punctuated::parse_separated_nonempty(input)? })
    }
}

enum ItemOpt {
    NodecAs(syn::Ident, TokenStream),
    Name(syn::Ident, syn::LitStr),
}

impl Parse for ItemOpt {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse::<syn::Ident>()?;

        let opt = match name.to_string().as_str() {
            "nodec_as" => {
                let inner;
                syn::parenthesized!(inner in input);
                let path = inner.parse()?;
                ItemOpt::NodecAs(name, path)
            }
            "name" => {
                let _: syn::Token![=] = input.parse()?;
                ItemOpt::Name(name, input.parse()?)
            }
            _ => return Err(Error::new_spanned(&name, format!("Unknown argument `{}`", name))),
        };

        Ok(opt)
    }
}

enum FieldOpt {
    Rename(syn::Ident, syn::LitStr),
}

impl Parse for FieldOpt {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse::<syn::Ident>()?;

        let opt = match name.to_string().as_str() {
            "rename" => {
                let _: syn::Token![=] = input.parse()?;
                FieldOpt::Rename(name, input.parse()?)
            }
            _ => return Err(Error::new_spanned(&name, format!("Unknown argument `{}`", name))),
        };

        Ok(opt)
    }
}
