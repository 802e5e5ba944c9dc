mod document;

use proc_macro::TokenStream;

/// Derive macro implementing `highscore::Document` for a struct.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Document)]
/// #[document(collection = "high_scores")]
/// struct ScoreRecord {
///     #[document(id)]
///     pub id: String,
///     pub score: f64,
/// }
/// ```
///
/// - `#[document(collection = "...")]` names the collection. Defaults to the
///   snake_case struct name with an `s` suffix.
/// - `#[document(id)]` marks the identifier field. Defaults to a field named `id`.
///
/// The identifier field must be a `String`; the store writes the assigned id
/// back through it on insert.
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document(input)
}
