use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr};

pub fn derive_document(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    // #[document(collection = "...")] on the struct
    let collection = extract_collection(&input);

    // Field marked #[document(id)], falling back to `id`
    let id_field = match extract_id_field(&input) {
        Some(field) => field,
        None => {
            return syn::Error::new_spanned(
                &input.ident,
                "Document derive: no field marked with #[document(id)] and no field named `id`",
            )
            .to_compile_error()
            .into();
        }
    };

    let expanded = quote! {
        impl highscore::Document for #name {
            const COLLECTION: &'static str = #collection;

            fn id(&self) -> &str {
                &self.#id_field
            }

            fn set_id(&mut self, id: String) {
                self.#id_field = id;
            }
        }
    };

    TokenStream::from(expanded)
}

fn extract_collection(input: &DeriveInput) -> String {
    for attr in &input.attrs {
        if !attr.path().is_ident("document") {
            continue;
        }

        let mut collection = None;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
            }
            Ok(())
        });

        if let Some(c) = collection {
            return c;
        }
    }

    // Default: snake_case struct name + "s"
    let name = input.ident.to_string();
    format!("{}s", to_snake_case(&name))
}

fn extract_id_field(input: &DeriveInput) -> Option<syn::Ident> {
    let Data::Struct(data_struct) = &input.data else {
        return None;
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return None;
    };

    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("document") {
                continue;
            }
            let mut is_id = false;
            let _ = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("id") {
                    is_id = true;
                }
                Ok(())
            });
            if is_id {
                return field.ident.clone();
            }
        }
    }

    fields
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .find(|ident| *ident == "id")
        .cloned()
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
