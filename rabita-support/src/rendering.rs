//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format resolution chains and type names
//! in error output.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use rabita_support::rendering::render_chain;
///
/// let chain = vec!["app::Newsletter", "app::Mailer", "app::Newsletter"];
/// let rendered = render_chain(&chain);
/// assert_eq!(rendered, "app::Newsletter → app::Mailer → app::Newsletter");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Strips the module path from a type name for display.
///
/// Generic type names are returned unchanged — shortening the head of
/// `alloc::sync::Arc<app::Mailer>` alone would be misleading.
///
/// # Examples
/// ```
/// use rabita_support::rendering::short_type_name;
///
/// assert_eq!(short_type_name("app::services::Mailer"), "Mailer");
/// assert_eq!(short_type_name("Mailer"), "Mailer");
/// assert_eq!(
///     short_type_name("alloc::sync::Arc<app::Mailer>"),
///     "alloc::sync::Arc<app::Mailer>",
/// );
/// ```
pub fn short_type_name(full: &str) -> &str {
    if full.contains('<') {
        return full;
    }
    match full.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}
