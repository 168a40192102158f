//! Derive macros for slicekit
//!
//! This crate provides procedural macros that generate the glue between a
//! slice's types and the store.
//!
//! # Available Macros
//!
//! - `#[derive(Action)]` - Implements `ActionKind` and generates wrapped
//!   dispatch methods for an action enum
//! - `#[derive(StatePaths)]` - Generates typed, composable paths for every
//!   field of a state struct
//!
//! # Example
//!
//! ```ignore
//! use slicekit_macros::{Action, StatePaths};
//!
//! #[derive(Clone, Debug, Default, Serialize, StatePaths)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! #[derive(Action, Debug)]
//! enum CounterAction {
//!     Increment(i64),
//!     Reset,
//! }
//!
//! // Generated:
//! assert_eq!(CounterAction::Reset.kind(), "reset");
//! assert_eq!(CounterState::count.name(), "count");
//!
//! let counter = store.slice::<CounterSlice>("counter")?;
//! counter.increment(5)?; // from the generated `CounterActionDispatch` trait
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr};

/// Derive macro for action enums
///
/// Generates:
/// - an `ActionKind` impl; each variant's kind is its name in `snake_case`
///   (`SetAge` becomes `"set_age"`) unless overridden with
///   `#[action(kind = "...")]`
/// - a `<Enum>Dispatch` trait with one method per variant, implemented for
///   everything that implements `Dispatch<Enum>`
///
/// Method parameters mirror the variant: named fields keep their names,
/// tuple fields become `arg0`, `arg1`, ... and unit variants take none.
///
/// # Errors
///
/// Produces a compile error if:
/// - Applied to a non-enum type or a generic enum
/// - Two variants end up with the same kind
///
/// # Example
///
/// ```ignore
/// #[derive(Action, Debug)]
/// enum UserAction {
///     Rename { name: String },
///     SetAge(u32),
///     #[action(kind = "tag")]
///     AddTag(String),
/// }
///
/// let user = store.slice::<UserSlice>("user")?;
/// user.rename("Ada".to_string())?;
/// user.set_age(36)?;
/// user.add_tag("admin".to_string())?; // dispatched as "user/tag"
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_action(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_action(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;

    let Data::Enum(data_enum) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(Action)] can only be used on enums",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Action)] does not support generic enums",
        ));
    }

    let trait_name = format_ident!("{}Dispatch", name);

    let mut kinds: Vec<String> = Vec::new();
    let mut kind_arms = Vec::new();
    let mut methods = Vec::new();

    for variant in &data_enum.variants {
        let variant_name = &variant.ident;
        let snake = to_snake_case(&variant_name.unraw().to_string());
        let kind = action_kind_override(&variant.attrs)?.unwrap_or_else(|| snake.clone());

        if kinds.contains(&kind) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate action kind \"{kind}\""),
            ));
        }
        kinds.push(kind.clone());

        let method = method_ident(&snake, variant_name)?;
        let doc = format!(" Dispatch [`{name}::{variant_name}`].");

        match &variant.fields {
            Fields::Named(fields) => {
                let params: Vec<_> = fields
                    .named
                    .iter()
                    .filter_map(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)))
                    .collect();
                let idents = params.iter().map(|(ident, _)| ident);
                let args = params.iter().map(|(ident, ty)| quote! { #ident: #ty });

                kind_arms.push(quote! { Self::#variant_name { .. } => #kind, });
                methods.push(quote! {
                    #[doc = #doc]
                    fn #method(&self, #(#args),*) -> <Self as ::slicekit_core::action::Dispatch<#name>>::Output {
                        self.dispatch(#name::#variant_name { #(#idents),* })
                    }
                });
            },
            Fields::Unnamed(fields) => {
                let idents: Vec<_> = (0..fields.unnamed.len())
                    .map(|i| format_ident!("arg{}", i))
                    .collect();
                let args = idents
                    .iter()
                    .zip(fields.unnamed.iter())
                    .map(|(ident, f)| {
                        let ty = &f.ty;
                        quote! { #ident: #ty }
                    });

                kind_arms.push(quote! { Self::#variant_name(..) => #kind, });
                methods.push(quote! {
                    #[doc = #doc]
                    fn #method(&self, #(#args),*) -> <Self as ::slicekit_core::action::Dispatch<#name>>::Output {
                        self.dispatch(#name::#variant_name(#(#idents),*))
                    }
                });
            },
            Fields::Unit => {
                kind_arms.push(quote! { Self::#variant_name => #kind, });
                methods.push(quote! {
                    #[doc = #doc]
                    fn #method(&self) -> <Self as ::slicekit_core::action::Dispatch<#name>>::Output {
                        self.dispatch(#name::#variant_name)
                    }
                });
            },
        }
    }

    let kind_body = if kind_arms.is_empty() {
        quote! { match *self {} }
    } else {
        quote! { match self { #(#kind_arms)* } }
    };
    let trait_doc = format!(" Wrapped dispatch methods for [`{name}`], one per variant.");

    Ok(quote! {
        impl ::slicekit_core::action::ActionKind for #name {
            fn kind(&self) -> &'static str {
                #kind_body
            }

            fn kinds() -> &'static [&'static str] {
                &[#(#kinds),*]
            }
        }

        #[doc = #trait_doc]
        #vis trait #trait_name: ::slicekit_core::action::Dispatch<#name> {
            #(#methods)*
        }

        impl<D: ::slicekit_core::action::Dispatch<#name> + ?Sized> #trait_name for D {}
    })
}

/// Derive macro for state structs
///
/// Generates one associated constant per field, named after the field, of
/// type `Field<Self, FieldType>`. Fields compose with `then` into a
/// `KeyPath`, and the dot path of a typed path matches the serialised
/// shape, so `State::profile.then(Profile::age)` addresses `"profile.age"`.
///
/// `#[serde(rename = "...")]`, `#[serde(rename_all = "...")]` and
/// `#[serde(skip)]` are honoured. A field with
/// `#[serde(skip_serializing_if = "...")]` still gets a path, but that path
/// only resolves dynamically while the field is serialised.
///
/// # Errors
///
/// Produces a compile error if:
/// - Applied to anything but a non-generic struct with named fields
/// - A field is `#[serde(flatten)]`, since its members move up a level
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Serialize, StatePaths)]
/// struct UserState {
///     name: String,
///     profile: Profile,
/// }
///
/// #[derive(Clone, Serialize, StatePaths)]
/// struct Profile {
///     age: u32,
/// }
///
/// let age = UserState::profile.then(Profile::age);
/// assert_eq!(age.path().to_string(), "profile.age");
/// assert_eq!(*age.get(&state), 36);
/// ```
#[proc_macro_derive(StatePaths)]
pub fn derive_state_paths(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_state_paths(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_state_paths(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;

    let Data::Struct(data_struct) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(StatePaths)] can only be used on structs",
        ));
    };

    let Fields::Named(fields) = &data_struct.fields else {
        return Err(syn::Error::new_spanned(
            input,
            "#[derive(StatePaths)] requires named fields",
        ));
    };

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(StatePaths)] does not support generic structs",
        ));
    }

    let container = SerdeAttrs::parse(&input.attrs)?;

    let mut consts = Vec::new();
    for field in &fields.named {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let attrs = SerdeAttrs::parse(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        if attrs.flatten {
            return Err(syn::Error::new_spanned(
                field,
                "#[derive(StatePaths)] does not support #[serde(flatten)] fields",
            ));
        }

        let plain = ident.unraw().to_string();
        let segment = match (&attrs.rename, &container.rename_all) {
            (Some(rename), _) => rename.clone(),
            (None, Some(rule)) => apply_rename_rule(&plain, rule)
                .ok_or_else(|| syn::Error::new(Span::call_site(), format!("unsupported rename_all rule \"{rule}\"")))?,
            (None, None) => plain,
        };
        let ty = &field.ty;
        let doc = format!(" Typed path to `{name}.{ident}` (`\"{segment}\"`).", ident = ident.unraw());

        consts.push(quote! {
            #[doc = #doc]
            #vis const #ident: ::slicekit_core::path::Field<#name, #ty> = {
                fn get(root: &#name) -> &#ty {
                    &root.#ident
                }
                ::slicekit_core::path::Field::new(#segment, get)
            };
        });
    }

    Ok(quote! {
        #[allow(non_upper_case_globals)]
        impl #name {
            #(#consts)*
        }
    })
}

/// Read `#[action(kind = "...")]` from a variant.
fn action_kind_override(attrs: &[Attribute]) -> syn::Result<Option<String>> {
    let mut kind = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("action")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("kind") {
                let value: LitStr = meta.value()?.parse()?;
                kind = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `kind = \"...\"`"))
            }
        })?;
    }
    Ok(kind)
}

/// The subset of serde attributes that changes serialised field names or shape.
#[derive(Default)]
struct SerdeAttrs {
    rename: Option<String>,
    rename_all: Option<String>,
    skip: bool,
    flatten: bool,
}

impl SerdeAttrs {
    fn parse(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut parsed = Self::default();
        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    if meta.input.peek(syn::Token![=]) {
                        let value: LitStr = meta.value()?.parse()?;
                        parsed.rename = Some(value.value());
                    } else {
                        meta.parse_nested_meta(|inner| {
                            let value: LitStr = inner.value()?.parse()?;
                            if inner.path.is_ident("serialize") {
                                parsed.rename = Some(value.value());
                            }
                            Ok(())
                        })?;
                    }
                } else if meta.path.is_ident("rename_all") && meta.input.peek(syn::Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    parsed.rename_all = Some(value.value());
                } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                    parsed.skip = true;
                } else if meta.path.is_ident("flatten") {
                    parsed.flatten = true;
                } else {
                    skip_meta(&meta)?;
                }
                Ok(())
            })?;
        }
        Ok(parsed)
    }
}

/// Consume the value or nested list of a serde attribute we do not use.
fn skip_meta(meta: &syn::meta::ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(|inner| skip_meta(&inner))?;
    }
    Ok(())
}

/// Rename a `snake_case` field the way serde's `rename_all` does.
fn apply_rename_rule(field: &str, rule: &str) -> Option<String> {
    let words = field.split('_').filter(|w| !w.is_empty());
    let renamed = match rule {
        "lowercase" | "snake_case" => field.to_string(),
        "UPPERCASE" | "SCREAMING_SNAKE_CASE" => field.to_ascii_uppercase(),
        "kebab-case" => field.replace('_', "-"),
        "SCREAMING-KEBAB-CASE" => field.replace('_', "-").to_ascii_uppercase(),
        "PascalCase" => words.map(capitalize).collect(),
        "camelCase" => {
            let pascal: String = words.map(capitalize).collect();
            let mut chars = pascal.chars();
            chars
                .next()
                .map(|first| first.to_ascii_lowercase().to_string() + chars.as_str())
                .unwrap_or_default()
        },
        _ => return None,
    };
    Some(renamed)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}

/// `SetAge` -> `set_age`, `HTTPRequest` -> `http_request`.
fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_uppercase();
            if i > 0 && (prev_lower || (prev_upper && next_lower)) && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Method name for a variant; keywords become raw identifiers.
fn method_ident(snake: &str, variant: &Ident) -> syn::Result<Ident> {
    if matches!(snake, "self" | "super" | "crate") {
        return Err(syn::Error::new_spanned(
            variant,
            format!("variant name produces reserved method name `{snake}`"),
        ));
    }
    let span = variant.span();
    Ok(syn::parse_str::<Ident>(snake).map_or_else(
        |_| Ident::new_raw(snake, span),
        |_| Ident::new(snake, span),
    ))
}
