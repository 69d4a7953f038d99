/// Generates `new` for clients whose only state is the shared backend handle.
macro_rules! impl_client_new {
    ($($client_name:ident),* $(,)?) => {
        $(
            impl $client_name {
                pub fn new(backend: std::sync::Arc<dyn $crate::backend::Backend>) -> Self {
                    Self { backend }
                }
            }
        )*
    };
}
