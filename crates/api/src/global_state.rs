use referral_runtime::{ReferralManager, ReferralStore};

use crate::middleware::AuthConfig;

#[derive(Clone)]
pub struct GlobalState<S> {
    pub manager: ReferralManager<S>,
    pub auth: AuthConfig,
}

impl<S: ReferralStore> GlobalState<S> {
    pub fn new(store: S, auth: AuthConfig) -> Self {
        Self {
            manager: ReferralManager::new(store),
            auth,
        }
    }
}
