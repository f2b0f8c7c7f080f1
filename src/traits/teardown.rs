//! Teardown hook trait for structured resource cleanup.

/// Structured teardown for container-managed instances.
///
/// Implement this for components that need cleanup when their scope ends:
/// unit-of-work instances are torn down by `end_unit_of_work`, singletons by
/// `Container::close`, always in reverse creation order. A failing hook does
/// not stop cleanup; the failure is collected and reported once the pass
/// finishes.
///
/// Hooks are registered either at binding time (the `*_with_teardown`
/// registration methods) or from inside a factory via
/// [`Resolver::manage`](crate::Resolver::manage).
///
/// # Examples
///
/// ```rust
/// use vessel_di::{BindingCollection, Resolver, Teardown};
///
/// struct Connection {
///     url: String,
/// }
///
/// impl Teardown for Connection {
///     fn teardown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
///         // Flush buffers, close handles...
///         Ok(())
///     }
/// }
///
/// let mut bindings = BindingCollection::new();
/// bindings
///     .add_singleton_factory_with_teardown::<Connection, _>(|_| {
///         Ok(Connection { url: "postgres://localhost".to_string() })
///     })
///     .unwrap();
///
/// let container = bindings.build().unwrap();
/// let conn = container.get::<Connection>().unwrap();
/// assert_eq!(conn.url, "postgres://localhost");
/// container.close().unwrap();
/// ```
pub trait Teardown: Send + Sync + 'static {
    /// Performs cleanup for this instance.
    fn teardown(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
