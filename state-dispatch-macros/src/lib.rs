//! Procedural macros for state-dispatch

use darling::{FromDeriveInput, FromMeta, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{parse_macro_input, DeriveInput};

/// Action types starting with this are reserved for the store itself
const RESERVED_PREFIX: &str = "@@";

/// Case conversion applied to variant names before the prefix is added
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum RenameRule {
    /// Keep the variant name as written (`AddItem`)
    #[default]
    None,
    /// `addItem`
    CamelCase,
    /// `add_item`
    SnakeCase,
    /// `ADD_ITEM`
    ScreamingSnakeCase,
    /// `add-item`
    KebabCase,
}

impl FromMeta for RenameRule {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value {
            "PascalCase" => Ok(Self::None),
            "camelCase" => Ok(Self::CamelCase),
            "snake_case" => Ok(Self::SnakeCase),
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnakeCase),
            "kebab-case" => Ok(Self::KebabCase),
            other => Err(darling::Error::unknown_value(other)),
        }
    }
}

impl RenameRule {
    fn apply(self, variant: &str) -> String {
        match self {
            Self::None => variant.to_string(),
            Self::CamelCase => to_camel_case(variant),
            Self::SnakeCase => split_pascal_case(variant)
                .iter()
                .map(|p| p.to_lowercase())
                .collect::<Vec<_>>()
                .join("_"),
            Self::ScreamingSnakeCase => split_pascal_case(variant)
                .iter()
                .map(|p| p.to_uppercase())
                .collect::<Vec<_>>()
                .join("_"),
            Self::KebabCase => split_pascal_case(variant)
                .iter()
                .map(|p| p.to_lowercase())
                .collect::<Vec<_>>()
                .join("-"),
        }
    }
}

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Namespace joined to every action type with a `/`
    #[darling(default)]
    prefix: Option<String>,

    /// Case conversion for variant names
    #[darling(default)]
    rename_all: RenameRule,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Full action type, bypassing `prefix` and `rename_all`
    #[darling(default)]
    rename: Option<String>,
}

impl ActionVariant {
    fn action_type(&self, opts: &ActionOpts) -> String {
        if let Some(ref explicit) = self.rename {
            return explicit.clone();
        }
        let local = opts.rename_all.apply(&self.ident.to_string());
        match opts.prefix {
            Some(ref prefix) => format!("{}/{}", prefix, local),
            None => local,
        }
    }
}

/// Resolves every variant's action type and rejects empty, reserved or
/// duplicate types.
fn action_types(opts: &ActionOpts, variants: &[ActionVariant]) -> syn::Result<Vec<String>> {
    if variants.is_empty() {
        return Err(syn::Error::new_spanned(
            &opts.ident,
            "Action requires at least one variant",
        ));
    }

    let mut seen: HashMap<String, &syn::Ident> = HashMap::new();
    let mut types = Vec::with_capacity(variants.len());
    for v in variants {
        let action_type = v.action_type(opts);

        if action_type.trim().is_empty() {
            return Err(syn::Error::new_spanned(
                &v.ident,
                "action type must not be empty",
            ));
        }
        if action_type.starts_with(RESERVED_PREFIX) {
            return Err(syn::Error::new_spanned(
                &v.ident,
                format!(
                    "action type `{}` uses the reserved `{}` namespace",
                    action_type, RESERVED_PREFIX
                ),
            ));
        }
        if let Some(previous) = seen.insert(action_type.clone(), &v.ident) {
            return Err(syn::Error::new_spanned(
                &v.ident,
                format!(
                    "action type `{}` is already used by variant `{}`",
                    action_type, previous
                ),
            ));
        }
        types.push(action_type);
    }
    Ok(types)
}

/// Split a PascalCase string into parts
fn split_pascal_case(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for ch in s.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            parts.push(current);
            current = String::new();
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Convert PascalCase to camelCase
fn to_camel_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Derive macro for the Action trait
///
/// Generates `action_type()`, the discriminator the store hands to logs and
/// validates on dispatch, plus an inherent `ACTION_TYPES` constant listing
/// every type the enum can produce.
///
/// Container attributes:
/// - `prefix = "cart"`: every type becomes `cart/<Variant>`
/// - `rename_all = "camelCase" | "snake_case" | "SCREAMING_SNAKE_CASE" | "kebab-case" | "PascalCase"`
///
/// Variant attributes:
/// - `rename = "app/setStatus"`: use this type verbatim
///
/// Two variants mapping to the same type, or a type in the reserved `@@`
/// namespace, is a compile error.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(prefix = "cart", rename_all = "camelCase")]
/// enum CartAction {
///     AddItem { product_id: u32, quantity: u32 },
///     RemoveItem { product_id: u32 },
///     #[action(rename = "app/reset")]
///     Reset,
/// }
///
/// assert_eq!(CartAction::Reset.action_type(), "app/reset");
/// assert_eq!(CartAction::RemoveItem { product_id: 6 }.action_type(), "cart/removeItem");
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let types = match action_types(&opts, variants) {
        Ok(types) => types,
        Err(e) => return e.to_compile_error().into(),
    };

    let type_arms = variants.iter().zip(types.iter()).map(|(v, action_type)| {
        let variant_name = &v.ident;

        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #action_type
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #action_type
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #action_type
            },
        }
    });

    let types_doc = format!("Every action type [`{}`] can produce, in declaration order.", name);

    let expanded = quote! {
        impl #impl_generics ::state_dispatch::Action for #name #ty_generics #where_clause {
            fn action_type(&self) -> &str {
                match self {
                    #(#type_arms),*
                }
            }
        }

        impl #impl_generics #name #ty_generics #where_clause {
            #[doc = #types_doc]
            pub const ACTION_TYPES: &'static [&'static str] = &[#(#types),*];
        }
    };

    TokenStream::from(expanded)
}
