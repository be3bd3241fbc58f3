//! Implementation of #[derive(Injectable)] proc-macro.

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, parse_quote, Data, DeriveInput, Field, Fields, GenericArgument, Generics,
    PathArguments, Type,
};

/// How a single field gets its value.
enum FieldSource {
    /// `Arc<T>` resolved from the container; holds `T`.
    Dependency(Type),
    /// `#[inject(default)]`: filled with `Default::default()`.
    Default,
}

pub fn derive_injectable_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let generics = with_container_bounds(&input.generics);
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Injectable can only be derived for structs",
            ));
        }
    };

    let mut params = Vec::new();
    let mut inits = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let binding = field
            .ident
            .clone()
            .unwrap_or_else(|| format_ident!("__arg{}", index));

        match field_source(field)? {
            FieldSource::Dependency(ty) => {
                params.push(quote! { #binding: ::std::sync::Arc<#ty> });
                inits.push(quote! { #binding });
            }
            FieldSource::Default => {
                inits.push(quote! { ::std::default::Default::default() });
            }
        }
    }

    let construct = build_self(fields, &inits);

    Ok(quote! {
        impl #impl_generics ::provision::Injectable for #name #ty_generics #where_clause {
            fn constructors() -> ::std::vec::Vec<::provision::Constructor<Self>> {
                ::std::vec![::provision::Constructor::new(|#(#params),*| #construct)]
            }
        }
    })
}

/// Every type parameter must be shareable across threads for the container
/// to hold `Arc`s of it.
fn with_container_bounds(generics: &Generics) -> Generics {
    let mut generics = generics.clone();
    let params: Vec<_> = generics.type_params().map(|param| param.ident.clone()).collect();
    let where_clause = generics.make_where_clause();
    for ident in params {
        where_clause.predicates.push(parse_quote! {
            #ident: ::std::marker::Send + ::std::marker::Sync + 'static
        });
    }
    generics
}

fn build_self(fields: &Fields, inits: &[proc_macro2::TokenStream]) -> proc_macro2::TokenStream {
    match fields {
        Fields::Named(named) => {
            let names = named.named.iter().map(|field| field.ident.as_ref());
            quote! { Self { #(#names: #inits),* } }
        }
        Fields::Unnamed(_) => quote! { Self(#(#inits),*) },
        Fields::Unit => quote! { Self },
    }
}

fn field_source(field: &Field) -> syn::Result<FieldSource> {
    if has_inject_default(field)? {
        return Ok(FieldSource::Default);
    }
    arc_inner(&field.ty)
        .cloned()
        .map(FieldSource::Dependency)
        .ok_or_else(|| {
            syn::Error::new_spanned(
                &field.ty,
                "Injectable fields must be `Arc<T>`; mark other fields with #[inject(default)]",
            )
        })
}

/// Parses `#[inject(default)]` on a field.
fn has_inject_default(field: &Field) -> syn::Result<bool> {
    let mut default = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("inject") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                default = true;
                Ok(())
            } else {
                Err(meta.error("unsupported inject option, expected `default`"))
            }
        })?;
    }
    Ok(default)
}

/// Returns `T` for `Arc<T>`, `std::sync::Arc<T>` and similar paths.
fn arc_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    if path.qself.is_some() {
        return None;
    }
    let segment = path.path.segments.last()?;
    if segment.ident != "Arc" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    if args.args.len() != 1 {
        return None;
    }
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
