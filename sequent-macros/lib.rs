//! Internal macros for sequent

extern crate proc_macro;
extern crate proc_macro2;

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Index};

/// Default implementation of [HeapSpace](../sequent_common/memory/trait.HeapSpace.html).
/// Use by adding `#[derive(HeapSpace)]` to your struct.
///
/// The result is the sum of the heap space of all fields.
#[proc_macro_derive(HeapSpace)]
pub fn heap_space(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let ast: DeriveInput = match syn::parse(input) {
        Ok(ast) => ast,
        Err(err) => return err.to_compile_error().into(),
    };
    let type_name = &ast.ident;
    let (impl_generics, type_generics, where_clause) = ast.generics.split_for_impl();
    let block = match ast.data {
        Data::Struct(ref data_struct) => struct_fields_sum(&data_struct.fields),
        Data::Enum(_) | Data::Union(_) => {
            return syn::Error::new_spanned(type_name, "HeapSpace can only be derived for structs")
                .to_compile_error()
                .into()
        }
    };
    let implementation = quote!(
        impl #impl_generics
        HeapSpace for #type_name #type_generics #where_clause {
            fn heap_space(&self) -> usize {
                #block
            }
        }
    );
    implementation.into()
}

/// Sum up `heap_space()` for each field of a struct.
fn struct_fields_sum(fields: &Fields) -> TokenStream {
    let accessors: Vec<TokenStream> = match fields {
        Fields::Named(named) => named
            .named
            .iter()
            .map(|field| {
                let field_name = &field.ident;
                quote!(self.#field_name)
            })
            .collect(),
        Fields::Unnamed(unnamed) => (0..unnamed.unnamed.len())
            .map(|i| {
                let index = Index::from(i);
                quote!(self.#index)
            })
            .collect(),
        Fields::Unit => Vec::new(),
    };
    quote!(0 #(+ #accessors.heap_space())*)
}
