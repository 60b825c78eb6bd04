mod resource;

use proc_macro::TokenStream;

/// Derive `crud_cache::Resource` for a deserializable record struct.
///
/// # Usage
///
/// ```ignore
/// #[derive(Deserialize, Resource)]
/// #[resource(model = "users")]
/// struct User {
///     #[resource(id)]
///     user_id: u64,
///     name: String,
/// }
/// ```
///
/// - `#[resource(model = "...")]`: model name; defaults to the snake_case
///   struct name plus `s` (`BlogPost` -> `blog_posts`).
/// - `#[resource(id)]`: the id field; defaults to a field named `id`.
#[proc_macro_derive(Resource, attributes(resource))]
pub fn derive_resource(input: TokenStream) -> TokenStream {
    resource::derive_resource(input)
}
