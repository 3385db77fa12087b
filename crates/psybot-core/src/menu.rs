use crate::{
    admin::AdminCache,
    commands::{admin_commands, default_commands, CommandDescriptor},
    domain::UserId,
};

/// Commands visible to `sender`, derived from the current authorization state.
///
/// Not cached: admin state can change between any two events.
pub async fn menu_for(cache: &AdminCache, sender: UserId) -> &'static [CommandDescriptor] {
    if cache.is_admin(sender).await {
        admin_commands()
    } else {
        default_commands()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{domain::AdminRecord, test_support::{sender, MemAdminStore}};

    #[tokio::test]
    async fn follows_admin_state() {
        let cache = AdminCache::new(Arc::new(MemAdminStore::default()));

        assert_eq!(menu_for(&cache, UserId(1)).await, default_commands());
        cache
            .promote(AdminRecord::from_sender(&sender(1)))
            .await
            .unwrap();
        assert_eq!(menu_for(&cache, UserId(1)).await, admin_commands());
        cache.demote(UserId(1)).await.unwrap();
        assert_eq!(menu_for(&cache, UserId(1)).await, default_commands());
    }
}
