//! #[derive(CursorItem)] implementation.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Ident, parse_macro_input};

const CREATED_AT: &str = "created_at";
const ID: &str = "id";

/// Which half of the cursor a field supplies.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Role {
    CreatedAt,
    Id,
}

impl Role {
    const fn key(self) -> &'static str {
        match self {
            Self::CreatedAt => CREATED_AT,
            Self::Id => ID,
        }
    }
}

pub(crate) fn derive_cursor_item_impl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let fields = named_fields(input)?;
    let created_at = select_field(input, &fields, Role::CreatedAt)?;
    let id = select_field(input, &fields, Role::Id)?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::cursorpage::CursorItem for #name #ty_generics #where_clause {
            fn cursor_created_at(&self) -> ::std::string::String {
                ::cursorpage::CursorTimestamp::to_cursor_timestamp(&self.#created_at)
            }

            fn cursor_id(&self) -> ::std::string::String {
                ::std::string::ToString::to_string(&self.#id)
            }
        }
    })
}

fn named_fields(input: &DeriveInput) -> syn::Result<Vec<&Field>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields.named.iter().collect()),
            _ => Err(syn::Error::new_spanned(
                input,
                "CursorItem derive only supports structs with named fields. \
                 Example: `struct Order { id: String, created_at: String }`",
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            "CursorItem derive only supports structs. \
             Hint: Use `#[derive(CursorItem)]` on the row type being paginated.",
        )),
    }
}

/// Roles a field is marked with through `#[cursor(...)]`.
fn marked_roles(field: &Field) -> syn::Result<Vec<Role>> {
    let mut roles = Vec::new();
    for attr in &field.attrs {
        if !attr.path().is_ident("cursor") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident(CREATED_AT) {
                roles.push(Role::CreatedAt);
                Ok(())
            } else if meta.path.is_ident(ID) {
                roles.push(Role::Id);
                Ok(())
            } else {
                Err(meta.error("expected `created_at` or `id`"))
            }
        })?;
    }
    Ok(roles)
}

/// Pick the field for `role`: an explicit marker wins over the field name.
fn select_field(input: &DeriveInput, fields: &[&Field], role: Role) -> syn::Result<Ident> {
    let mut marked = None;
    for field in fields {
        if marked_roles(field)?.contains(&role) {
            if marked.is_some() {
                return Err(syn::Error::new_spanned(
                    field,
                    format!("more than one field is marked #[cursor({})]", role.key()),
                ));
            }
            marked = field.ident.clone();
        }
    }
    if let Some(ident) = marked {
        return Ok(ident);
    }

    fields
        .iter()
        .filter_map(|f| f.ident.as_ref())
        .find(|ident| *ident == role.key())
        .cloned()
        .ok_or_else(|| {
            syn::Error::new(
                Span::call_site(),
                format!(
                    "CursorItem derive on `{}` needs a `{}` field or a field marked #[cursor({})]",
                    input.ident,
                    role.key(),
                    role.key()
                ),
            )
        })
}
