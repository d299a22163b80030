mod service_tests;

use std::sync::Arc;

use crate::repositories::InMemoryTokenStore;
use crate::services::permission::SubtypeRegistry;
use crate::services::token::{FixedClock, TokenService, TokenServiceConfig};

pub(crate) const TEST_KEY_BITS: usize = 1024;

pub(crate) fn create_test_service(
    registry: SubtypeRegistry,
) -> (TokenService<Arc<InMemoryTokenStore>>, Arc<InMemoryTokenStore>, Arc<FixedClock>) {
    let store = Arc::new(InMemoryTokenStore::new());
    let clock = Arc::new(FixedClock::new(chrono::Utc::now().timestamp()));
    let service = TokenService::new(
        store.clone(),
        Arc::new(registry),
        TokenServiceConfig::default().with_key_bits(TEST_KEY_BITS),
    )
    .unwrap()
    .with_clock(clock.clone());
    (service, store, clock)
}
