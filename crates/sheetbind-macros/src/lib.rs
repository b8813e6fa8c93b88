use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/* ──────────────────────── #[derive(SheetRecord)] ───────────────────── */
/// Generate `SheetRecord::fields` for a struct with named fields.
///
/// Every field becomes a descriptor named after the field, typed by its
/// `CellField` implementation. Field attributes:
///
/// * `#[sheet(skip)]`  - not bound to any column.
/// * `#[sheet(embed)]` - a nested `SheetRecord`; its descriptors follow this
///   struct's own fields, so an own field shadows an embedded one of the same
///   name.
#[proc_macro_derive(SheetRecord, attributes(sheet))]
pub fn derive_sheet_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    /* -------- 1 · named fields only -------- */
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "SheetRecord requires a struct with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "SheetRecord can only be derived for structs",
            ));
        }
    };

    /* -------- 2 · examine #[sheet(...)] -------- */
    let mut own = Vec::new();
    let mut embedded = Vec::new();
    for field in fields {
        let mut skip = false;
        let mut embed = false;
        for attr in field.attrs.iter().filter(|a| a.path().is_ident("sheet")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("embed") {
                    embed = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `skip` or `embed`"))
                }
            })?;
        }
        if skip && embed {
            return Err(syn::Error::new_spanned(
                field,
                "`skip` and `embed` are mutually exclusive",
            ));
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        if skip {
            continue;
        }
        if embed {
            embedded.push((ident, &field.ty));
        } else {
            own.push((ident, ident.unraw().to_string(), &field.ty));
        }
    }

    /* -------- 3 · descriptor expressions -------- */
    let own_tokens = own.iter().map(|(ident, name, ty)| {
        quote! {
            fields.push(::sheetbind::FieldDescriptor::of::<#ty>(
                #name,
                |r: &Self| &r.#ident,
                |r: &mut Self| &mut r.#ident,
            ));
        }
    });
    let embedded_tokens = embedded.iter().map(|(ident, ty)| {
        quote! {
            fields.extend(
                <#ty as ::sheetbind::SheetRecord>::fields()
                    .into_iter()
                    .map(|f| f.project(|r: &Self| &r.#ident, |r: &mut Self| &mut r.#ident)),
            );
        }
    });

    /* -------- 4 · assemble impl -------- */
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    Ok(quote! {
        impl #impl_generics ::sheetbind::SheetRecord for #name #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::sheetbind::FieldDescriptor<Self>> {
                let mut fields = ::std::vec::Vec::new();
                #(#own_tokens)*
                #(#embedded_tokens)*
                fields
            }
        }
    })
}
