// ============================================================================
// Customer Business Rule Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CustomerError {
    #[error("Customer name is required")]
    EmptyName,

    #[error("Customer phone is required")]
    EmptyPhone,
}
